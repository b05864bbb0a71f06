use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use thiserror::Error;

/// Failures that stop the program before a window exists.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Window creation failed: {0}")]
    Window(String),

    #[error("OpenGL context creation failed: {0}")]
    Context(String),

    #[error("Window surface creation failed: {0}")]
    Surface(String),
}

/// Runs windowing setup that can only report failure by panicking (such as a
/// config picker handed an empty iterator) and turns the panic into a
/// `StartupError::Window`.
pub fn catch_window_panic<T>(setup: impl FnOnce() -> T) -> Result<T, StartupError> {
    panic::catch_unwind(AssertUnwindSafe(setup))
        .map_err(|payload| StartupError::Window(panic_message(payload.as_ref())))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "window setup panicked".to_owned()
    }
}

/// Exit status for a failed run: -1 when windowing or context setup failed,
/// 1 for anything else.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    if err.downcast_ref::<StartupError>().is_some() {
        -1
    } else {
        1
    }
}
