pub mod ticks;
pub mod timer;

pub use ticks::{IntervalTicks, ManualTicks, TickSource, TickStats};
pub use timer::{Clock, SystemClock, VirtualClock};
