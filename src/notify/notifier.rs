use futures::future::BoxFuture;

/// Future returned by [`Notifier`] operations.
pub type NotifyFuture<'a> = BoxFuture<'a, ()>;

/// Push-notification capability consumed by the monitor worker.
///
/// Every operation is fire-and-forget from the caller's side: implementations
/// log and swallow their own transport failures.
pub trait Notifier: Send + Sync + 'static {
    /// Announces that monitoring of `url` has begun.
    fn notify_start<'a>(&'a self, message: &'a str, url: &'a str) -> NotifyFuture<'a>;

    /// Reports a detected content change.
    fn notify_change<'a>(&'a self, title: &'a str, message: &'a str, url: &'a str)
        -> NotifyFuture<'a>;

    /// Delivers the periodic activity summary.
    fn send_summary<'a>(&'a self, title: &'a str, message: &'a str, url: &'a str)
        -> NotifyFuture<'a>;
}
