//! Retry policy for transient store failures.

use std::time::Duration;

use crate::kv::StoreError;

const RETRY_BACKOFF: Duration = Duration::from_millis(50);

/// Run a store operation, retrying once with a short backoff when the error
/// is retryable. Validation/conditional failures pass through untouched.
pub fn with_retry<T>(
    mut op: impl FnMut() -> Result<T, StoreError>,
) -> Result<T, StoreError> {
    match op() {
        Err(e) if e.is_retryable() => {
            tracing::warn!(error = %e, "store operation failed, retrying once");
            std::thread::sleep(RETRY_BACKOFF);
            op()
        }
        other => other,
    }
}
