//! Waiting for task runs to reach a terminal state.

use crate::client::Client;
use crate::error::{Error, Result};
use crate::types::TaskRunResult;
use std::future::pending;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{interval_at, sleep_until, Instant, MissedTickBehavior};
use tracing::debug;

/// Cancellation signal observed by [`Client::poll_until_complete`].
///
/// Fires when the paired [`CancelHandle`] is cancelled or when the optional
/// deadline passes, whichever comes first.
#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: Option<watch::Receiver<bool>>,
    deadline: Option<Instant>,
}

/// Sending half of a [`CancelToken`].
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// Cancel every token created from this handle.
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }

    /// Whether [`CancelHandle::cancel`] has been called.
    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }
}

/// Create a cancellation channel.
pub fn cancel_channel() -> (CancelHandle, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (
        CancelHandle { tx },
        CancelToken {
            rx: Some(rx),
            deadline: None,
        },
    )
}

impl CancelToken {
    /// A token that never fires.
    pub fn never() -> Self {
        Self {
            rx: None,
            deadline: None,
        }
    }

    /// A token that fires once `timeout` has elapsed.
    pub fn timeout(timeout: Duration) -> Self {
        Self::never().with_timeout(timeout)
    }

    /// Add a deadline `timeout` from now. An earlier existing deadline is kept.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        let deadline = Instant::now() + timeout;
        self.deadline = Some(match self.deadline {
            Some(existing) => existing.min(deadline),
            None => deadline,
        });
        self
    }

    /// Whether the token has already fired.
    pub fn is_cancelled(&self) -> bool {
        let explicit = self.rx.as_ref().is_some_and(|rx| *rx.borrow());
        let expired = self.deadline.is_some_and(|d| Instant::now() >= d);
        explicit || expired
    }

    /// Resolve once the token fires, yielding the matching error.
    ///
    /// A dropped [`CancelHandle`] that never cancelled does not fire the token.
    pub async fn cancelled(&mut self) -> Error {
        let deadline = self.deadline;

        let explicit = async {
            if let Some(rx) = self.rx.as_mut() {
                let fired = rx.wait_for(|cancelled| *cancelled).await.is_ok();
                if fired {
                    return;
                }
            }
            pending::<()>().await
        };

        let expired = async {
            match deadline {
                Some(d) => sleep_until(d).await,
                None => pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = explicit => Error::Cancelled,
            _ = expired => Error::DeadlineExceeded,
        }
    }
}

impl Client {
    /// Poll a task run every `interval` until it completes or fails.
    ///
    /// The first poll is issued one `interval` after the call. A run whose
    /// status is `completed` or `failed` is returned as `Ok`; inspect
    /// [`TaskRunResult::state`] to tell them apart. Any other status keeps
    /// the loop waiting, with no cap on the number of polls.
    ///
    /// A failed poll ends the call with that error. When `cancel` fires,
    /// including mid-request, the call returns [`Error::Cancelled`] or
    /// [`Error::DeadlineExceeded`] and nothing further is sent.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use parallel::{CancelToken, Client, TaskRunRequest};
    /// use std::time::Duration;
    ///
    /// # async fn example() -> Result<(), parallel::Error> {
    /// let client = Client::new("your-api-key")?;
    /// let run = client.run_task(TaskRunRequest {
    ///     input: "What were the key highlights of the latest Apple event?".into(),
    ///     processor: "base".into(),
    /// }).await?;
    ///
    /// let result = client
    ///     .poll_until_complete(
    ///         run.run_id(),
    ///         Duration::from_secs(5),
    ///         CancelToken::timeout(Duration::from_secs(600)),
    ///     )
    ///     .await?;
    /// println!("{}: {}", result.status, result.output);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn poll_until_complete(
        &self,
        run_id: &str,
        interval: Duration,
        mut cancel: CancelToken,
    ) -> Result<TaskRunResult> {
        if interval.is_zero() {
            return Err(Error::Config("poll interval must be greater than zero".into()));
        }

        let mut ticker = interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut attempt: u32 = 0;

        loop {
            tokio::select! {
                biased;
                err = cancel.cancelled() => return Err(err),
                _ = ticker.tick() => {}
            }

            attempt += 1;
            let task = tokio::select! {
                biased;
                err = cancel.cancelled() => return Err(err),
                task = self.get_task(run_id) => task?,
            };

            debug!(run_id, status = %task.status, attempt, "Polled task run");

            if task.state().is_terminal() {
                return Ok(task);
            }
        }
    }
}
