//! Notification plumbing: the capability trait the worker talks to and the
//! Pushover implementation used by the binary.

pub mod notifier;
pub mod pushover;

pub use notifier::{Notifier, NotifyFuture};
pub use pushover::{NotifyError, PushoverNotifier, PUSHOVER_MESSAGES_URL, START_TITLE};
