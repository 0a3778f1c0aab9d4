//! Background tasks: reminder pollers and the stopwatch

mod reminder;
mod stopwatch;
mod supervisor;

pub use reminder::{format_fire_time, parse_reminder_time};
pub use stopwatch::Stopwatch;
pub use supervisor::TaskSupervisor;
