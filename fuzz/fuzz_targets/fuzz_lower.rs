#![no_main]

use libfuzzer_sys::fuzz_target;
use stepwise::{ErrorKind, LowerOptions, lower_source};

fuzz_target!(|data: &[u8]| {
    let Ok(source) = std::str::from_utf8(data) else {
        return;
    };
    // Arbitrary input either lowers or fails with a spanned error; never panics.
    match lower_source(source, &LowerOptions::default()) {
        Ok(lowered) => {
            if lowered.classes.is_empty() {
                assert_eq!(lowered.output, source);
            }
        }
        Err(err) => {
            assert_ne!(err.kind(), ErrorKind::StateCorruption);
            assert!(err.span().start <= source.len());
        }
    }
});
