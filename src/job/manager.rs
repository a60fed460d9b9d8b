use crate::config::Config;
use crate::job::notify::{LogNotifier, Notifier};
use crate::job::orchestrator::Orchestrator;
use crate::job::{with_store, JobOptions};
use crate::state::JobStatus;
use crate::storage::{JobRecord, JobSnapshot, JobStore, PageRecord};
use crate::url::parse_seed_url;
use crate::ScribeError;
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Creates jobs and runs each one on its own tokio task
///
/// Every job is independent: a failing job never touches another job's
/// record or files. Status is read back through the shared store.
pub struct JobManager<S> {
    orchestrator: Orchestrator<S>,
}

impl<S> JobManager<S>
where
    S: JobStore + Send + 'static,
{
    pub fn new(config: &Config, store: S) -> Result<Self, ScribeError> {
        let store = Arc::new(Mutex::new(store));
        let orchestrator = Orchestrator::new(config, store, Arc::new(LogNotifier))?;
        Ok(Self { orchestrator })
    }

    /// Replaces the completion notifier
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.orchestrator.set_notifier(notifier);
        self
    }

    /// Validates `url`, records a pending job and starts it in the background
    ///
    /// Returns the job ID right away; the handle resolves to the job's final
    /// status.
    pub fn submit(
        &self,
        url: &str,
        options: JobOptions,
    ) -> Result<(String, JoinHandle<JobStatus>), ScribeError> {
        let job_id = self.create(url, &options)?;

        let orchestrator = self.orchestrator.clone();
        let id = job_id.clone();
        let handle = tokio::spawn(async move { orchestrator.run(&id).await });

        Ok((job_id, handle))
    }

    /// Creates a job and runs it on the current task
    pub async fn run_to_completion(
        &self,
        url: &str,
        options: JobOptions,
    ) -> Result<(String, JobStatus), ScribeError> {
        let job_id = self.create(url, &options)?;
        let status = self.orchestrator.run(&job_id).await;
        Ok((job_id, status))
    }

    fn create(&self, url: &str, options: &JobOptions) -> Result<String, ScribeError> {
        let seed = parse_seed_url(url)?;
        let job_id = Uuid::new_v4().to_string();
        with_store(self.orchestrator.store(), |s| {
            s.create_job(&job_id, seed.as_str(), options)
        })?;
        tracing::info!("Created job {} for {}", job_id, seed);
        Ok(job_id)
    }

    pub fn job(&self, job_id: &str) -> Result<JobRecord, ScribeError> {
        with_store(self.orchestrator.store(), |s| s.get_job(job_id))
    }

    /// Status view of a job, as served to pollers
    pub fn snapshot(&self, job_id: &str) -> Result<JobSnapshot, ScribeError> {
        Ok(self.job(job_id)?.snapshot())
    }

    pub fn pages(&self, job_id: &str) -> Result<Vec<PageRecord>, ScribeError> {
        with_store(self.orchestrator.store(), |s| s.list_pages(job_id))
    }

    pub fn store(&self) -> &Arc<Mutex<S>> {
        self.orchestrator.store()
    }
}
