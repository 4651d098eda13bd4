mod common;

use common::{Value, lower, outcome, start};
use proptest::prelude::*;
use serde_json::json;
use stepwise::default_value;
use stepwise_ast::print::expr_to_string;
use stepwise_parser::parse_type;

/// A generator with `k` top-level yields; each step adds its resumption
/// value to a running total and yields it.
fn counting_generator(k: usize, with_return: bool) -> String {
    let mut body = String::from("  let total: number = seed;\n");
    for _ in 0..k {
        body.push_str("  yield total;\n  total += value;\n");
    }
    if with_return {
        body.push_str("  return total;\n");
    }
    format!(
        "function* counting(seed: number): Generator<number, number, number> {{\n{}}}\n",
        body
    )
}

fn arb_type() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("number"),
        Just("string"),
        Just("boolean"),
        Just("any"),
        Just("unknown"),
        Just("number[]"),
        Just("Array<string>"),
        Just("string | null"),
        Just("Item"),
        Just("Map<string, Item>"),
        Just("(() => void)"),
        Just("[number]"),
        Just("never"),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// k yields make k + 1 steps: k results with `done: false`, then one with
    /// `done: true`, and the cursor ends at k.
    #[test]
    fn k_yields_make_k_plus_one_steps(
        k in 0usize..6,
        with_return in any::<bool>(),
        seed in -1000i32..1000,
        inputs in prop::collection::vec(-100i32..100, 6),
    ) {
        let src = counting_generator(k, with_return);
        let lowered = lower(&src);
        prop_assert_eq!(lowered.classes.len(), 1);
        prop_assert_eq!(lowered.classes[0].steps, k + 1);

        let machine = start(&src, &[json!(seed)]);
        let mut expected = i64::from(seed);
        for i in 0..=k {
            let input = inputs.get(i).copied().unwrap_or(0);
            let result = machine.next_step(json!(input)).unwrap();
            if i > 0 {
                expected += i64::from(input);
            }
            if i < k {
                prop_assert_eq!(result, outcome(json!(expected), false));
            } else if with_return {
                prop_assert_eq!(result, outcome(json!(expected), true));
            } else {
                prop_assert_eq!(result, outcome(json!(null), true));
            }
        }
        prop_assert_eq!(machine.cursor(), json!(k));
    }

    /// Restoring a snapshot at any step gives the same remaining run.
    #[test]
    fn restore_at_any_step_is_transparent(k in 1usize..5, at in 0usize..5, seed in 0i32..50) {
        let at = at.min(k);
        let src = counting_generator(k, true);
        let original = start(&src, &[json!(seed)]);
        for i in 0..at {
            original.next_step(json!(i)).unwrap();
        }
        let restored = start(&src, &[json!(0)]);
        restored.load_state(Value::from_json(&original.save_state().to_json()));
        for i in at..=k {
            prop_assert_eq!(restored.next_step(json!(i)), original.next_step(json!(i)));
        }
    }

    /// The synthesizer is a pure function of the type.
    #[test]
    fn defaults_are_deterministic(ty in arb_type()) {
        let parsed = parse_type(ty).unwrap();
        let first = default_value(&parsed).map(|e| expr_to_string(&e));
        let second = default_value(&parse_type(ty).unwrap()).map(|e| expr_to_string(&e));
        prop_assert_eq!(first, second);
    }
}
