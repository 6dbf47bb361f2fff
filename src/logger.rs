use std::sync::Once;

static INIT: Once = Once::new();

#[macro_export]
macro_rules! app_log {
    ($($arg:tt)*) => {{
        $crate::logger::log_line(format!($($arg)*));
    }};
}

/// Install the stderr logger. Honors `RUST_LOG`, defaults to `info`.
pub fn init_logger() {
    INIT.call_once(|| {
        let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
            .format_timestamp_millis()
            .try_init();
    });
}

pub fn log_line(message: String) {
    log::info!("{message}");
}
