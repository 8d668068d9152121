use std::env;
use log::info;
use msgbox::IconType;
use dual_sensual::{init_logging, run};
use dual_sensual::error::{error_msgbox, AppRunError, ConfigError};

#[cfg(target_os = "windows")]
fn windows_init() {
    dual_sensual::os::windows::hide_console_window();
}

#[cfg(not(target_os = "windows"))]
fn windows_init() {}


fn main() -> Result<(), AppRunError> {
    init_logging();
    info!(concat!("Dual Sensual ", env!("CARGO_PKG_VERSION")));

    windows_init();

    let args = env::args();

    match run(args) {
        Err(AppRunError::ConfigError { source: ConfigError::CanNotLock { .. } }) => {
            msgbox::create(
                concat!("Dual Sensual ", env!("CARGO_PKG_VERSION")),
                "This application has already been started",
                IconType::Error,
            ).expect("Could not create msgbox");
            Ok(())
        },
        Err(err) => {
            error_msgbox("Unexpected error", &err);
            Err(err)
        }
        Ok(_) => Ok(())
    }
}
