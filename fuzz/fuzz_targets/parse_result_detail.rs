#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(detail) = serde_json::from_slice::<smtlab_types::ResultDetail>(data) {
        // Whatever decodes must encode back to the same record.
        let json = serde_json::to_vec(&detail).expect("encode detail");
        let again: smtlab_types::ResultDetail =
            serde_json::from_slice(&json).expect("decode re-encoded detail");
        assert_eq!(detail, again);
    }
    let _ = serde_json::from_slice::<smtlab_types::Run>(data);
});
