#![no_main]
use libfuzzer_sys::fuzz_target;
use std::path::Path;
use std::sync::Arc;
use texflat_core::fs::MemoryFs;
use texflat_core::strip::strip_blank_math_lines;
use texflat_core::{Inliner, InlinerConfig, is_in_math_mode};

fuzz_target!(|data: &[u8]| {
    // Panic freedom only. The input doubles as the main document and as a
    // file it may include, so cycles and math-mode inclusion get exercised.
    let s = String::from_utf8_lossy(data);

    for offset in [0, s.len() / 2, s.len()] {
        let _ = is_in_math_mode(&s, offset);
    }
    let _ = strip_blank_math_lines(&s);

    let fs = Arc::new(
        MemoryFs::new()
            .with_file("main.tex", data.to_vec())
            .with_file("a.tex", data.to_vec()),
    );
    let inliner = Inliner::with_fs(fs, InlinerConfig::default());
    let _ = inliner.flatten(Path::new("main.tex"));
});
