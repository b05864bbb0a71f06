pub mod error;

pub use error::{catch_window_panic, exit_code, StartupError};
