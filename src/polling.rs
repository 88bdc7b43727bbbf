//! Predicate-driven polling with linear backoff.

use crate::config::DEFAULT_TIMEOUT_MS;
use crate::error::{Error, Result};
use crate::options::Options;
use std::future::Future;
use std::time::Duration;
use tracing::{trace, warn};

/// Pause after the first unsuccessful attempt, in milliseconds.
pub const INITIAL_DELAY_MS: u64 = 500;
/// Growth of the pause after every unsuccessful attempt, in milliseconds.
pub const DELAY_INCREMENT_MS: u64 = 10;

pub async fn until<T, P, A, Fut>(
    predicate: P,
    mut action: A,
    options: &Options,
    timeout_ms: Option<u64>,
) -> Result<T>
where
    P: Fn(&T) -> bool,
    A: FnMut(Options) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    //! Run `action` until `predicate` accepts its result.
    //!
    //! The first accepted result is returned right away, without sleeping.
    //! Otherwise the loop sleeps 500 ms, then 510 ms, 520 ms and so on,
    //! and fails with [`Error::Timeout`] once the slept time reaches
    //! `timeout_ms` (60 s by default).
    //!
    //! Errors of `action` are returned as is: only "not done yet" outcomes
    //! are retried.
    let timeout_ms = timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS);
    let mut elapsed = 0;
    let mut delay = INITIAL_DELAY_MS;
    let mut attempt: u32 = 0;
    while elapsed < timeout_ms {
        attempt += 1;
        let result = action(options.clone()).await?;
        if predicate(&result) {
            trace!(attempt, elapsed, "until: done");
            return Ok(result);
        }
        trace!(attempt, elapsed, delay, "until: not done yet");
        tokio::time::sleep(Duration::from_millis(delay)).await;
        elapsed += delay;
        delay += DELAY_INCREMENT_MS;
    }
    warn!(attempts = attempt, timeout_ms, "until: giving up");
    Err(Error::Timeout { timeout_ms })
}
