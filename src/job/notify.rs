use crate::ScribeError;

/// Completion notice delivery
///
/// Notification is best-effort: a failure is logged and never changes the
/// job's status.
pub trait Notifier: Send + Sync {
    fn notify(&self, job_id: &str, destination: &str, link: &str) -> Result<(), ScribeError>;
}

/// Writes the notice to the log instead of delivering it
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, job_id: &str, destination: &str, link: &str) -> Result<(), ScribeError> {
        tracing::info!("Job {} ready for {}: {}", job_id, destination, link);
        Ok(())
    }
}
