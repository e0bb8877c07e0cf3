// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Timeout wrapper for collaborator calls.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::{AuthError, AuthResult, Component};

/// Runs a collaborator call under `timeout`.
///
/// Both a timeout and a collaborator error surface as
/// [`AuthError::InfrastructureUnavailable`] for `component`.
pub(crate) async fn within<T, E, F>(
    component: Component,
    timeout: Duration,
    fut: F,
) -> AuthResult<T>
where
    F: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => {
            warn!(component = %component, error = %e, "Collaborator call failed");
            Err(AuthError::unavailable(component, e.to_string()))
        }
        Err(_) => {
            warn!(component = %component, timeout = ?timeout, "Collaborator call timed out");
            Err(AuthError::timeout(component, timeout))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_within_timeout() {
        let result: AuthResult<()> = within(Component::Directory, Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(1)).await;
            Ok::<_, String>(())
        })
        .await;

        let err = result.unwrap_err();
        assert_eq!(err.component(), Some(Component::Directory));
    }

    #[tokio::test]
    async fn test_within_error() {
        let result: AuthResult<u8> = within(Component::SessionStore, Duration::from_secs(1), async {
            Err::<u8, _>("refused")
        })
        .await;

        assert!(matches!(
            result.unwrap_err(),
            AuthError::InfrastructureUnavailable {
                component: Component::SessionStore,
                ref message,
            } if message == "refused"
        ));
    }

    #[tokio::test]
    async fn test_within_ok() {
        let value = within(Component::Directory, Duration::from_secs(1), async {
            Ok::<_, String>(7)
        })
        .await
        .unwrap();
        assert_eq!(value, 7);
    }
}
