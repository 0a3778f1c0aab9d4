//! Process lifecycle: graceful shutdown on signals

mod shutdown;

pub use shutdown::shutdown_signal;
