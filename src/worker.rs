//! Monitor worker split across focused submodules:
//! - `state`: loop-owned counters, last fingerprint and summary bookkeeping
//! - `event_loop`: the serialized check/summary/stop loop
//! - `lifecycle`: run-scoped cancellation and the loop's task handle
//! - `monitor`: the public `MonitorWorker` with its start/stop state machine
//! - `tests`: scheduling tests on a paused clock

mod event_loop;
mod lifecycle;
pub mod monitor;
pub mod state;


pub use event_loop::CHANGE_TITLE;
pub use monitor::{MonitorWorker, WorkerError, WorkerStatus};
pub use state::{CheckOutcome, CheckState, SummaryReport};
