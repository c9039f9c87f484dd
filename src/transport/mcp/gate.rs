//! Single-flight handshake gate
//!
//! A [`HandshakeGate`] guarantees that at most one handshake is in flight
//! per connection and that its outcome is committed exactly once:
//!
//! - concurrent callers arriving during an in-flight handshake wait for it;
//! - after success every call returns immediately with no I/O;
//! - after failure every call returns the same cached error, no retry.
//!
//! The one exception is cancellation. A handshake aborted by its caller's
//! [`crate::context::CallContext`] is not committed: the caller gets the
//! cancellation error and the next caller starts a fresh attempt.
//!
//! The value a successful handshake produces is stored in the gate itself,
//! so nothing from an aborted attempt is ever visible to later callers.
//!
//! State machine: `Unstarted -> Initializing -> Ready | Failed`.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::OnceCell;

use crate::error::ToolboxError;

/// Observable handshake state of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeState {
    /// No handshake has been attempted (or the last one was cancelled).
    Unstarted,
    /// A handshake is in flight.
    Initializing,
    /// The handshake succeeded.
    Ready,
    /// The handshake failed; the error is cached.
    Failed,
}

/// Run-once gate with a cached outcome of type `Result<T, ToolboxError>`.
///
/// # Examples
///
/// ```
/// use toolbox_transport::transport::mcp::gate::{HandshakeGate, HandshakeState};
///
/// # #[tokio::main]
/// # async fn main() {
/// let gate: HandshakeGate<u32> = HandshakeGate::new();
/// assert_eq!(gate.state(), HandshakeState::Unstarted);
///
/// assert_eq!(gate.ensure_ready(|| async { Ok(7) }).await.unwrap(), &7);
/// assert_eq!(gate.state(), HandshakeState::Ready);
///
/// // Already committed: the closure is never called again.
/// let value = gate.ensure_ready(|| async { unreachable!() }).await.unwrap();
/// assert_eq!(value, &7);
/// # }
/// ```
#[derive(Debug)]
pub struct HandshakeGate<T> {
    outcome: OnceCell<std::result::Result<T, ToolboxError>>,
    in_flight: AtomicBool,
}

impl<T> Default for HandshakeGate<T> {
    fn default() -> Self {
        Self {
            outcome: OnceCell::new(),
            in_flight: AtomicBool::new(false),
        }
    }
}

impl<T> HandshakeGate<T> {
    /// Create a gate in the `Unstarted` state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    pub fn state(&self) -> HandshakeState {
        match self.outcome.get() {
            Some(Ok(_)) => HandshakeState::Ready,
            Some(Err(_)) => HandshakeState::Failed,
            None if self.in_flight.load(Ordering::Acquire) => HandshakeState::Initializing,
            None => HandshakeState::Unstarted,
        }
    }

    /// The cached failure, if the handshake failed.
    pub fn error(&self) -> Option<&ToolboxError> {
        self.outcome.get().and_then(|outcome| outcome.as_ref().err())
    }

    /// The committed value, once the handshake has succeeded.
    pub fn value(&self) -> Option<&T> {
        self.outcome.get().and_then(|outcome| outcome.as_ref().ok())
    }

    /// Run `handshake` unless an outcome is already committed, then return
    /// the committed outcome.
    ///
    /// # Errors
    ///
    /// Returns the cached [`ToolboxError`] of a failed handshake, or the
    /// cancellation error of an aborted attempt.
    pub async fn ensure_ready<F, Fut>(&self, handshake: F) -> std::result::Result<&T, ToolboxError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<T, ToolboxError>>,
    {
        if let Some(outcome) = self.outcome.get() {
            return outcome.as_ref().map_err(Clone::clone);
        }

        let committed = self
            .outcome
            .get_or_try_init(|| async {
                self.in_flight.store(true, Ordering::Release);
                let _reset = InFlightReset(&self.in_flight);
                match handshake().await {
                    Err(err) if err.is_cancellation() => Err(err),
                    outcome => Ok(outcome),
                }
            })
            .await?;

        committed.as_ref().map_err(Clone::clone)
    }
}

/// Clears the in-flight flag when the attempt ends, including when the
/// attempt's future is dropped.
struct InFlightReset<'a>(&'a AtomicBool);

impl Drop for InFlightReset<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
