//! Termination handling.
//!
//! A process running the kernel stops on the first terminal cause, whether
//! it comes from an OS signal or from inside the process through a
//! [`TerminationHandle`].

use tokio::sync::mpsc;

/// Why the process is stopping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TerminationCause {
    /// Not a reason to stop.
    None,
    FatalError,
    UserInterrupted,
    SystemTerminated,
}

impl TerminationCause {
    pub fn is_terminal(self) -> bool {
        self != TerminationCause::None
    }

    /// Message logged when this cause stops the process.
    pub fn message(self) -> Option<&'static str> {
        match self {
            TerminationCause::None => None,
            TerminationCause::FatalError => Some("Fatal runtime error occurred"),
            TerminationCause::UserInterrupted => Some("Detected user interruption"),
            TerminationCause::SystemTerminated => Some("Detected system termination"),
        }
    }
}

/// Sender side of the termination channel.
#[derive(Debug, Clone)]
pub struct TerminationHandle {
    tx: mpsc::UnboundedSender<TerminationCause>,
}

impl TerminationHandle {
    /// Report a cause. Returns false if nobody is listening anymore.
    pub fn signal(&self, cause: TerminationCause) -> bool {
        self.tx.send(cause).is_ok()
    }
}

/// Receiver side of the termination channel.
#[derive(Debug)]
pub struct TerminationListener {
    rx: mpsc::UnboundedReceiver<TerminationCause>,
}

impl TerminationListener {
    /// Wait for the first terminal cause sent through a handle.
    ///
    /// Non-terminal causes are skipped. Resolves to `None` once every handle
    /// has been dropped.
    pub async fn wait(mut self) -> TerminationCause {
        while let Some(cause) = self.rx.recv().await {
            if cause.is_terminal() {
                return cause;
            }
        }
        TerminationCause::None
    }
}

/// Create a connected handle and listener.
pub fn termination_channel() -> (TerminationHandle, TerminationListener) {
    let (tx, rx) = mpsc::unbounded_channel();
    (TerminationHandle { tx }, TerminationListener { rx })
}

/// Wait until either an OS signal or the internal channel asks to stop.
///
/// Closing the channel without a terminal cause leaves only OS signals
/// watched. If signal handlers cannot be installed only the channel is
/// watched.
pub async fn wait_for_termination(listener: TerminationListener) -> TerminationCause {
    let internal = listener.wait();
    let signals = system_signal();
    tokio::pin!(internal, signals);
    let mut internal_open = true;

    let cause = loop {
        tokio::select! {
            cause = &mut internal, if internal_open => {
                if cause.is_terminal() {
                    break cause;
                }
                internal_open = false;
            }
            result = &mut signals => match result {
                Ok(cause) => break cause,
                Err(e) => {
                    tracing::warn!(error = %e, "could not listen for system signals");
                    if internal_open {
                        break (&mut internal).await;
                    }
                    break TerminationCause::None;
                }
            },
        }
    };

    if let Some(message) = cause.message() {
        tracing::error!(?cause, "{message}");
    }
    cause
}

#[cfg(unix)]
async fn system_signal() -> std::io::Result<TerminationCause> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangup = signal(SignalKind::hangup())?;
    let mut terminate = signal(SignalKind::terminate())?;
    let mut quit = signal(SignalKind::quit())?;

    let cause = tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result?;
            TerminationCause::UserInterrupted
        }
        _ = hangup.recv() => TerminationCause::SystemTerminated,
        _ = terminate.recv() => TerminationCause::SystemTerminated,
        _ = quit.recv() => TerminationCause::SystemTerminated,
    };
    Ok(cause)
}

#[cfg(not(unix))]
async fn system_signal() -> std::io::Result<TerminationCause> {
    tokio::signal::ctrl_c().await?;
    Ok(TerminationCause::UserInterrupted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_messages() {
        assert!(!TerminationCause::None.is_terminal());
        assert!(TerminationCause::None.message().is_none());
        for cause in [
            TerminationCause::FatalError,
            TerminationCause::UserInterrupted,
            TerminationCause::SystemTerminated,
        ] {
            assert!(cause.is_terminal());
            assert!(cause.message().is_some());
        }
    }

    #[tokio::test]
    async fn test_non_terminal_causes_skipped() {
        let (handle, listener) = termination_channel();
        assert!(handle.signal(TerminationCause::None));
        assert!(handle.signal(TerminationCause::None));
        assert!(handle.signal(TerminationCause::FatalError));
        assert!(handle.signal(TerminationCause::UserInterrupted));

        assert_eq!(listener.wait().await, TerminationCause::FatalError);
    }

    #[tokio::test]
    async fn test_dropped_handles_resolve_to_none() {
        let (handle, listener) = termination_channel();
        handle.signal(TerminationCause::None);
        drop(handle);
        assert_eq!(listener.wait().await, TerminationCause::None);
    }

    #[tokio::test]
    async fn test_wait_for_termination_via_handle() {
        let (handle, listener) = termination_channel();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            handle.signal(TerminationCause::FatalError);
        });

        let cause = tokio::time::timeout(Duration::from_secs(5), wait_for_termination(listener))
            .await
            .unwrap();
        assert_eq!(cause, TerminationCause::FatalError);
    }

    #[tokio::test]
    async fn test_wait_for_termination_outlives_handles() {
        let (handle, listener) = termination_channel();
        handle.signal(TerminationCause::None);
        drop(handle);

        let waited =
            tokio::time::timeout(Duration::from_millis(200), wait_for_termination(listener)).await;
        assert!(waited.is_err(), "returned {waited:?} without a terminal cause");
    }

    #[tokio::test]
    async fn test_signal_after_listener_dropped() {
        let (handle, listener) = termination_channel();
        drop(listener);
        assert!(!handle.signal(TerminationCause::FatalError));
    }
}
