#![no_main]

use libfuzzer_sys::fuzz_target;

// Accepts arbitrary bytes, attempts to parse them as a router, feeds it to
// generate(). Goal: no panics, even on malformed descriptors.
fuzz_target!(|data: &[u8]| {
    if let Ok(router) = serde_json::from_slice::<rpc_openapi_core::Router>(data) {
        let _ = rpc_openapi_core::generate(&router, &Default::default());
    }
});
