use core::future::Future;

use crate::{
    Poll, Result, SnowflakeGenerator, SnowflakeId,
    futures::{SleepProvider, TokioSleep},
    policy::WaitBudget,
};

/// Extension trait for awaiting Snowflake IDs instead of blocking a thread.
///
/// While the generator reports [`Poll::Pending`] the future sleeps for the
/// suggested number of milliseconds through a [`SleepProvider`], freeing the
/// worker thread for other tasks. The generator's `max_wait` still applies.
///
/// Implemented for every `Sync` [`SnowflakeGenerator`], trait objects
/// included.
pub trait SnowflakeGeneratorAsyncExt {
    /// Resolves to the next ID, sleeping through `S` while pending.
    ///
    /// # Errors
    ///
    /// See [`SnowflakeGenerator::next_id`].
    fn try_next_id_async<S>(&self) -> impl Future<Output = Result<SnowflakeId>> + Send
    where
        S: SleepProvider;

    /// Resolves to the next ID, sleeping on Tokio's timer while pending.
    ///
    /// # Errors
    ///
    /// See [`SnowflakeGenerator::next_id`].
    ///
    /// # Example
    /// ```
    /// use snowmint::{GeneratorConfig, SnowflakeGeneratorAsyncExt};
    ///
    /// # tokio::runtime::Builder::new_multi_thread().enable_time().build().unwrap().block_on(async {
    /// let generator = GeneratorConfig::new(1).build_lock()?;
    /// let id = generator.next_id_async().await?;
    /// assert!(id.to_raw() > 0);
    /// # Ok::<(), snowmint::Error>(())
    /// # }).unwrap();
    /// ```
    fn next_id_async(&self) -> impl Future<Output = Result<SnowflakeId>> + Send {
        self.try_next_id_async::<TokioSleep>()
    }
}

impl<G> SnowflakeGeneratorAsyncExt for G
where
    G: SnowflakeGenerator + Sync + ?Sized,
{
    fn try_next_id_async<S>(&self) -> impl Future<Output = Result<SnowflakeId>> + Send
    where
        S: SleepProvider,
    {
        async move {
            let mut budget = WaitBudget::new(self.policy().max_wait);
            loop {
                let yield_for = match self.try_poll_id()? {
                    Poll::Ready { id } => return Ok(id),
                    Poll::Pending { yield_for } => yield_for,
                };
                let pause = budget.charge(yield_for)?;
                // A lost race is retried at once; arming a timer would cost
                // a full tick.
                if !pause.is_zero() {
                    S::sleep_for(pause).await;
                }
            }
        }
    }
}
