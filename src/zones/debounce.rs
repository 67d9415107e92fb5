//! Debounced postal-code validation for "validate after the user stops typing".
//!
//! Every submitted code restarts the window. When the window elapses with no
//! new input, only the most recent code is validated and emitted.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::debug;

use super::PostalCodeZone;
use crate::error::ValidationError;
use crate::models::DeliveryZoneEntry;

/// Outcome of one debounced validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneCheck {
    pub code: String,
    pub result: Result<DeliveryZoneEntry, ValidationError>,
}

/// Handle to a background debounce task.
///
/// Dropping the handle (or calling [`finish`](Self::finish)) closes the input;
/// a code still waiting for its window is validated before the task exits.
#[derive(Debug)]
pub struct DebouncedZoneValidator {
    tx: mpsc::UnboundedSender<String>,
    handle: JoinHandle<()>,
}

impl DebouncedZoneValidator {
    /// Spawn the debounce task on the current tokio runtime.
    pub fn spawn(
        zone: Arc<PostalCodeZone>,
        window: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<ZoneCheck>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run(zone, window, rx, out_tx));
        (Self { tx, handle }, out_rx)
    }

    /// Record the latest input. Returns `false` if the task has stopped.
    pub fn submit(&self, code: impl Into<String>) -> bool {
        self.tx.send(code.into()).is_ok()
    }

    /// Close the input and wait for the pending validation, if any.
    pub async fn finish(self) {
        drop(self.tx);
        let _ = self.handle.await;
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

async fn run(
    zone: Arc<PostalCodeZone>,
    window: Duration,
    mut rx: mpsc::UnboundedReceiver<String>,
    out: mpsc::UnboundedSender<ZoneCheck>,
) {
    let mut pending: Option<String> = None;
    let mut deadline: Option<Instant> = None;

    loop {
        tokio::select! {
            input = rx.recv() => match input {
                Some(code) => {
                    if let Some(superseded) = pending.replace(code) {
                        debug!("Superseded pending postal code {:?}", superseded);
                    }
                    deadline = Some(Instant::now() + window);
                }
                None => {
                    if let Some(code) = pending.take() {
                        emit(&zone, code, &out);
                    }
                    break;
                }
            },
            () = sleep_until(deadline), if deadline.is_some() => {
                deadline = None;
                if let Some(code) = pending.take() {
                    if !emit(&zone, code, &out) {
                        break;
                    }
                }
            }
        }
    }
}

fn emit(zone: &PostalCodeZone, code: String, out: &mpsc::UnboundedSender<ZoneCheck>) -> bool {
    let result = zone.validate(&code);
    out.send(ZoneCheck { code, result }).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zones::ZonePolicy;

    const WINDOW: Duration = Duration::from_millis(350);

    fn zone() -> Arc<PostalCodeZone> {
        Arc::new(PostalCodeZone::with_policy(ZonePolicy::strict()))
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_last_code_in_burst_is_validated() {
        let (validator, mut checks) = DebouncedZoneValidator::spawn(zone(), WINDOW);
        let started = Instant::now();
        for partial in ["0", "03", "031", "0310", "03100"] {
            assert!(validator.submit(partial));
        }

        let check = checks.recv().await.unwrap();
        assert_eq!(check.code, "03100");
        assert!(check.result.is_ok());
        assert!(started.elapsed() >= WINDOW);
        assert!(checks.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_separate_bursts_each_validate() {
        let (validator, mut checks) = DebouncedZoneValidator::spawn(zone(), WINDOW);

        validator.submit("03100");
        tokio::time::sleep(WINDOW * 2).await;
        validator.submit("99999");

        let first = checks.recv().await.unwrap();
        let second = checks.recv().await.unwrap();
        assert_eq!(first.code, "03100");
        assert_eq!(second.code, "99999");
        assert!(matches!(
            second.result,
            Err(ValidationError::DeliveryNotAvailable { .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_finish_flushes_pending_code() {
        let (validator, mut checks) = DebouncedZoneValidator::spawn(zone(), WINDOW);
        validator.submit("1156");
        validator.finish().await;

        let check = checks.recv().await.unwrap();
        assert_eq!(check.code, "1156");
        assert!(matches!(
            check.result,
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(checks.recv().await.is_none());
    }
}
