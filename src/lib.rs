// Library surface for the binary and for headless/integration tests.
pub mod app;
pub mod app_dirs;
pub mod clock;
pub mod config;
pub mod delay;
pub mod error;
pub mod logging;
pub mod round_timer;
pub mod runtime;
pub mod scheduler;
pub mod session;
pub mod ui;
pub mod util;

pub use error::ReflexError;
