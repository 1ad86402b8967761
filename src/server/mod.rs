//! Connection acceptance and shutdown.

pub mod listener;
pub mod shutdown;

pub use listener::{run, serve};
pub use shutdown::Shutdown;
