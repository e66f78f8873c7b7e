//! Bounded retry poller

use std::convert::Infallible;
use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Evaluate `predicate` until it holds.
///
/// The first evaluation happens immediately; after each miss the poller
/// sleeps `interval` and retries, at most `max_attempts` times, so an always
/// false predicate is evaluated `max_attempts + 1` times. Cancelling `cancel`
/// stops the loop at the next suspension point and yields `false`.
pub async fn wait_for<F, Fut>(
    mut predicate: F,
    max_attempts: u32,
    interval: Duration,
    cancel: &CancellationToken,
) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let result = try_wait_for(
        || {
            let attempt = predicate();
            async move { Ok::<_, Infallible>(attempt.await) }
        },
        max_attempts,
        interval,
        cancel,
    )
    .await;
    match result {
        Ok(satisfied) => satisfied,
        Err(never) => match never {},
    }
}

/// [`wait_for`] for fallible predicates; the first error ends polling.
pub async fn try_wait_for<F, Fut, E>(
    mut predicate: F,
    max_attempts: u32,
    interval: Duration,
    cancel: &CancellationToken,
) -> Result<bool, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool, E>>,
{
    let mut remaining = max_attempts;
    loop {
        if cancel.is_cancelled() {
            debug!(remaining, "poller cancelled");
            return Ok(false);
        }
        if predicate().await? {
            return Ok(true);
        }
        if remaining == 0 {
            return Ok(false);
        }
        remaining -= 1;

        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(remaining, "poller cancelled while waiting");
                return Ok(false);
            }
            _ = sleep(interval) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_resolves_on_third_call() {
        let calls = AtomicU32::new(0);
        let token = CancellationToken::new();

        let satisfied = wait_for(
            || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move { n == 2 }
            },
            3,
            Duration::from_millis(10),
            &token,
        )
        .await;

        assert!(satisfied);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_evaluates_budget_plus_one() {
        let calls = AtomicU32::new(0);
        let token = CancellationToken::new();

        let satisfied = wait_for(
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { false }
            },
            3,
            Duration::from_millis(10),
            &token,
        )
        .await;

        assert!(!satisfied);
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_budget_evaluates_once() {
        let calls = AtomicU32::new(0);
        let token = CancellationToken::new();

        let satisfied = wait_for(
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { false }
            },
            0,
            Duration::from_millis(10),
            &token,
        )
        .await;

        assert!(!satisfied);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_pending_poll() {
        let calls = Arc::new(AtomicU32::new(0));
        let token = CancellationToken::new();

        let task = {
            let calls = calls.clone();
            let token = token.clone();
            tokio::spawn(async move {
                wait_for(
                    || {
                        calls.fetch_add(1, Ordering::SeqCst);
                        async { false }
                    },
                    1_000,
                    Duration::from_millis(100),
                    &token,
                )
                .await
            })
        };

        tokio::time::sleep(Duration::from_millis(250)).await;
        token.cancel();
        let satisfied = task.await.unwrap();

        assert!(!satisfied);
        let after_cancel = calls.load(Ordering::SeqCst);
        assert!(after_cancel <= 4, "polled {} times", after_cancel);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(calls.load(Ordering::SeqCst), after_cancel);
    }

    #[tokio::test]
    async fn test_error_ends_polling() {
        let token = CancellationToken::new();
        let result: Result<bool, &str> = try_wait_for(
            || async { Err("boom") },
            5,
            Duration::from_millis(1),
            &token,
        )
        .await;
        assert_eq!(result, Err("boom"));
    }
}
