//! Per-call cancellation and deadlines
//!
//! Every transport operation takes a [`CallContext`]. The context carries an
//! optional [`CancellationToken`] and an optional deadline; each outbound
//! HTTP call (including reading its body) is raced against both, so a
//! cancelled or expired context surfaces as [`ToolboxError::Cancelled`] or
//! [`ToolboxError::DeadlineExceeded`] instead of hanging.
//!
//! Cancellation is strictly per call. Cancelling one caller's context never
//! alters state another caller already observed.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::ToolboxError;

/// Cancellation token and deadline for a single transport operation.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use tokio_util::sync::CancellationToken;
/// use toolbox_transport::context::CallContext;
///
/// # #[tokio::main]
/// # async fn main() {
/// let token = CancellationToken::new();
/// let ctx = CallContext::background()
///     .with_cancellation(token.clone())
///     .with_timeout(Duration::from_secs(10));
/// assert!(ctx.check().is_ok());
///
/// token.cancel();
/// assert!(ctx.check().is_err());
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    cancel: Option<CancellationToken>,
    deadline: Option<Instant>,
}

impl CallContext {
    /// A context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    /// Attach a cancellation token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Expire the context `timeout` from now.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Expire the context at `deadline`. An earlier existing deadline wins.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) if existing < deadline => existing,
            _ => deadline,
        });
        self
    }

    /// The deadline, if one is set.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Fail fast when the context is already cancelled or expired.
    ///
    /// # Errors
    ///
    /// Returns [`ToolboxError::Cancelled`] or
    /// [`ToolboxError::DeadlineExceeded`].
    pub fn check(&self) -> std::result::Result<(), ToolboxError> {
        if self.cancel.as_ref().is_some_and(|t| t.is_cancelled()) {
            return Err(ToolboxError::Cancelled);
        }
        if self.deadline.is_some_and(|d| d <= Instant::now()) {
            return Err(ToolboxError::DeadlineExceeded);
        }
        Ok(())
    }

    /// Drive `fut` to completion unless the context fires first.
    ///
    /// Cancellation takes priority over the deadline, which takes priority
    /// over a future that happens to complete in the same poll.
    ///
    /// # Errors
    ///
    /// Returns [`ToolboxError::Cancelled`] or
    /// [`ToolboxError::DeadlineExceeded`]; `fut` is dropped in both cases.
    pub async fn run<F>(&self, fut: F) -> std::result::Result<F::Output, ToolboxError>
    where
        F: Future,
    {
        self.check()?;

        let cancelled = async {
            match &self.cancel {
                Some(token) => token.cancelled().await,
                None => std::future::pending::<()>().await,
            }
        };
        let expired = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = cancelled => Err(ToolboxError::Cancelled),
            _ = expired => Err(ToolboxError::DeadlineExceeded),
            output = fut => Ok(output),
        }
    }
}
