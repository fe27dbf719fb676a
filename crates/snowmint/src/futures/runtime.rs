use core::{future::Future, pin::Pin, time::Duration};

use crate::futures::SleepProvider;

/// A [`SleepProvider`] backed by Tokio's timer.
///
/// This is the default provider for applications built on Tokio.
#[derive(Copy, Clone, Debug, Default)]
pub struct TokioSleep;

impl SleepProvider for TokioSleep {
    type Sleep = tokio::time::Sleep;

    fn sleep_for(dur: Duration) -> Self::Sleep {
        tokio::time::sleep(dur)
    }
}

/// A [`SleepProvider`] that yields to the Tokio scheduler instead of arming
/// a timer.
///
/// This improves responsiveness at low concurrency, at the cost of tighter
/// polling loops and more CPU under load. With many concurrent waiters,
/// [`TokioSleep`] is usually the better choice.
#[derive(Copy, Clone, Debug, Default)]
pub struct TokioYield;

impl SleepProvider for TokioYield {
    type Sleep = Pin<Box<dyn Future<Output = ()> + Send>>;

    fn sleep_for(_dur: Duration) -> Self::Sleep {
        Box::pin(tokio::task::yield_now())
    }
}
