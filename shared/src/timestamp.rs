cfg_if! {
    if #[cfg(all(target_arch = "wasm32", feature = "wbindgen"))] {
        pub struct Timestamp;

        impl Timestamp {
            /// Milliseconds since UNIX epoch, as reported by the JS host.
            pub fn now_millis() -> f64 {
                js_sys::Date::now()
            }
        }
    } else {
        use std::time::SystemTime;

        pub struct Timestamp;

        impl Timestamp {
            /// Milliseconds since UNIX epoch. A system clock set before the
            /// epoch reports `0.0`.
            pub fn now_millis() -> f64 {
                SystemTime::now()
                    .duration_since(SystemTime::UNIX_EPOCH)
                    .map(|d| d.as_secs_f64() * 1000.0)
                    .unwrap_or(0.0)
            }
        }
    }
}
