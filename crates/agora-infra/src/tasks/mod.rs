//! Background task helpers.

mod interval;

pub use interval::{IntervalTask, MIN_PERIOD};
