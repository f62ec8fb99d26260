//! Per-call cancellation and deadline

use std::future::Future;
use std::time::Duration;

use hubspot_sync_domain::{ConnectorError, Result};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Cancellation and deadline supplied by the caller of a sync operation.
///
/// Every remote call is raced against both. A cancelled call returns
/// [`ConnectorError::Cancelled`], an expired one
/// [`ConnectorError::DeadlineExceeded`].
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    cancellation: CancellationToken,
    deadline: Option<Instant>,
}

impl CallContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Share an existing cancellation token with other work.
    pub fn with_cancellation(cancellation: CancellationToken) -> Self {
        Self { cancellation, deadline: None }
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Set the deadline; an earlier existing deadline wins.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(self.deadline.map_or(deadline, |current| current.min(deadline)));
        self
    }

    /// A context cancelled with this one but cancellable on its own.
    pub fn child(&self) -> Self {
        Self { cancellation: self.cancellation.child_token(), deadline: self.deadline }
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Fail fast if the context is already cancelled or expired.
    ///
    /// # Errors
    /// `Cancelled` or `DeadlineExceeded`.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            return Err(ConnectorError::Cancelled);
        }
        if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            return Err(ConnectorError::DeadlineExceeded);
        }
        Ok(())
    }

    /// Drive `operation` to completion unless the context is cancelled or
    /// its deadline passes first.
    ///
    /// # Errors
    /// The operation's own error, `Cancelled`, or `DeadlineExceeded`.
    pub async fn run<F, T>(&self, operation: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        self.check()?;

        let guarded = async {
            tokio::select! {
                biased;
                () = self.cancellation.cancelled() => Err(ConnectorError::Cancelled),
                result = operation => result,
            }
        };

        match self.deadline {
            Some(deadline) => tokio::time::timeout_at(deadline, guarded)
                .await
                .unwrap_or(Err(ConnectorError::DeadlineExceeded)),
            None => guarded.await,
        }
    }
}
