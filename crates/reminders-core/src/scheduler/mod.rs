mod cadence;
mod tick;

pub use cadence::Cadence;
pub use tick::{Scheduler, TickJob, TickScheduler, TokioScheduler};
