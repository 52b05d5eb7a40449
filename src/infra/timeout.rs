//! Deadline racing for provider calls

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GuardError {
    #[error("timed out after {}ms", after.as_millis())]
    TimedOut { after: Duration },

    #[error("cancelled")]
    Cancelled,
}

/// Race `work` against `deadline` and an optional cancellation token.
///
/// Whichever settles first wins; the losing futures (including the timer)
/// are dropped before this returns.
pub async fn race<F, T>(
    work: F,
    deadline: Duration,
    cancel: Option<&CancellationToken>,
) -> Result<T, GuardError>
where
    F: Future<Output = T>,
{
    let cancelled = async {
        match cancel {
            Some(token) => token.cancelled().await,
            None => std::future::pending::<()>().await,
        }
    };

    tokio::select! {
        biased;
        _ = cancelled => Err(GuardError::Cancelled),
        out = work => Ok(out),
        _ = tokio::time::sleep(deadline) => Err(GuardError::TimedOut { after: deadline }),
    }
}

/// A deadline plus cancellation signal reusable across several calls
#[derive(Debug, Clone)]
pub struct TimeoutGuard {
    deadline: Duration,
    cancel: Option<CancellationToken>,
}

impl TimeoutGuard {
    pub fn new(deadline: Duration) -> Self {
        Self {
            deadline,
            cancel: None,
        }
    }

    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    pub async fn race<F, T>(&self, work: F) -> Result<T, GuardError>
    where
        F: Future<Output = T>,
    {
        race(work, self.deadline, self.cancel.as_ref()).await
    }

    /// Like [`race`](Self::race) but collapses timeout and cancellation
    /// into `T::default()`
    pub async fn race_or_default<F, T>(&self, work: F) -> T
    where
        F: Future<Output = T>,
        T: Default,
    {
        match self.race(work).await {
            Ok(out) => out,
            Err(e) => {
                tracing::debug!("Guarded call gave up: {}", e);
                T::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn test_work_wins() {
        let result = race(async { 42 }, Duration::from_secs(1), None).await;
        assert_eq!(result, Ok(42));
    }

    #[tokio::test]
    async fn test_deadline_wins_over_pending_work() {
        let start = Instant::now();
        let result = race(
            std::future::pending::<u32>(),
            Duration::from_millis(50),
            None,
        )
        .await;

        assert_eq!(
            result,
            Err(GuardError::TimedOut {
                after: Duration::from_millis(50)
            })
        );
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_cancel_wins() {
        let token = CancellationToken::new();
        let trigger = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let result = race(
            std::future::pending::<u32>(),
            Duration::from_secs(10),
            Some(&token),
        )
        .await;
        assert_eq!(result, Err(GuardError::Cancelled));
    }

    #[tokio::test]
    async fn test_already_cancelled_token() {
        let token = CancellationToken::new();
        token.cancel();
        let result = race(async { 1 }, Duration::from_secs(1), Some(&token)).await;
        assert_eq!(result, Err(GuardError::Cancelled));
    }

    #[tokio::test]
    async fn test_guard_race_or_default() {
        let guard = TimeoutGuard::new(Duration::from_millis(20));
        let slow = async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            vec![1, 2, 3]
        };
        let out: Vec<i32> = guard.race_or_default(slow).await;
        assert!(out.is_empty());

        let fast: Vec<i32> = guard.race_or_default(async { vec![7] }).await;
        assert_eq!(fast, vec![7]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_settles_at_deadline_with_paused_clock() {
        let guard = TimeoutGuard::new(Duration::from_secs(30));
        let start = tokio::time::Instant::now();
        let result = guard.race(std::future::pending::<()>()).await;
        assert!(result.is_err());
        assert_eq!(start.elapsed(), Duration::from_secs(30));
    }
}
