//! Hard deadlines for core operations.
//!
//! No core operation retries. Each public operation runs under
//! [`QUERY_TIMEOUT`] and fails with `Error::Timeout` instead of hanging on a
//! stalled connection.

use crate::errors::{Error, Result};
use std::{future::Future, time::Duration};
use tracing::warn;

/// Upper bound for a single core operation.
pub const QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Runs `operation` under [`QUERY_TIMEOUT`].
pub async fn bounded<T, F>(name: &'static str, operation: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    bounded_by(name, QUERY_TIMEOUT, operation).await
}

/// Runs `operation` under an explicit `limit`. Dropping the future on expiry
/// cancels whatever it was awaiting.
pub async fn bounded_by<T, F>(name: &'static str, limit: Duration, operation: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    if let Ok(result) = tokio::time::timeout(limit, operation).await {
        result
    } else {
        warn!(operation = name, ?limit, "operation timed out");
        Err(Error::Timeout {
            operation: name,
            limit,
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[tokio::test]
    async fn test_bounded_passes_through_result() -> Result<()> {
        let value = bounded("answer", async { Ok(42) }).await?;
        assert_eq!(value, 42);

        let err = bounded::<(), _>("failing", async {
            Err(Error::CategoryNotFound { id: 9 })
        })
        .await
        .unwrap_err();
        assert!(matches!(err, Error::CategoryNotFound { id: 9 }));
        Ok(())
    }

    #[tokio::test]
    async fn test_bounded_by_times_out() {
        let err = bounded_by("sleepy", Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        })
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            Error::Timeout {
                operation: "sleepy",
                ..
            }
        ));
    }
}
