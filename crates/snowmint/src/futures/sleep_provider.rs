use core::{future::Future, time::Duration};

/// Abstracts over how to wait for a given [`Duration`] in async contexts.
///
/// This keeps the async generation loop independent of the runtime's timer.
pub trait SleepProvider {
    /// Required to be `Send` so the future can move across worker threads.
    type Sleep: Future<Output = ()> + Send;

    fn sleep_for(dur: Duration) -> Self::Sleep;
}
