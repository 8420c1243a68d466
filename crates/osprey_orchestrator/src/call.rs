use osprey_core::prelude::*;

use std::time::Duration;

/// Bounds a remote call by `limit`. Running out of time is a [`ServiceError::Timeout`].
pub(crate) async fn timed<T>(
    limit: Duration,
    call: impl Future<Output = Result<T, ServiceError>>,
) -> Result<T, ServiceError> {
    tokio::time::timeout(limit, call)
        .await
        .unwrap_or_else(|_| Err(ServiceError::Timeout(limit)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn slow_calls_time_out() {
        let result: Result<(), _> = timed(Duration::from_millis(5), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;

        assert_eq!(result, Err(ServiceError::Timeout(Duration::from_millis(5))));
    }

    #[tokio::test]
    async fn errors_pass_through() {
        let result: Result<(), _> = timed(Duration::from_secs(1), async {
            Err(ServiceError::Rejected("nope".into()))
        })
        .await;

        assert_eq!(result, Err(ServiceError::Rejected("nope".into())));
    }
}
