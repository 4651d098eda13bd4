//! Lowering options.

use serde::Deserialize;

/// Knobs for [`crate::lower_source`]; deserializable from the `[lower]`
/// table of `stepwise.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LowerOptions {
    /// Appended to the PascalCase function name to form the class name.
    pub class_suffix: String,
    /// Generators to lower; empty means every generator in the file.
    pub functions: Vec<String>,
    /// Name of the single parameter of the emitted `nextStep` method.
    pub resume_param: String,
}

impl Default for LowerOptions {
    fn default() -> Self {
        LowerOptions {
            class_suffix: String::new(),
            functions: Vec::new(),
            resume_param: "value".to_string(),
        }
    }
}

impl LowerOptions {
    pub fn selects(&self, function_name: &str) -> bool {
        self.functions.is_empty() || self.functions.iter().any(|f| f == function_name)
    }

    /// `counter` -> `Counter{suffix}`
    pub fn class_name(&self, function_name: &str) -> String {
        let mut chars = function_name.chars();
        let mut name = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        };
        name.push_str(&self.class_suffix);
        name
    }
}
