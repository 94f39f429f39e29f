#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(report) = serde_json::from_slice::<smtlab_types::RunReport>(data) {
        let text = smtlab_render::render_report(&report);
        assert!(text.ends_with('\n'));
    }
});
