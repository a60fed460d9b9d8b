//! Job orchestrator - drives one job through its states
//!
//! `pending -> crawling -> processing -> completed`, with `failed` reachable
//! from `crawling` and `processing`. Failures never escape [`Orchestrator::run`];
//! the persisted status is the only place they show up.

use crate::archive::{self, ARCHIVE_FILE_NAME};
use crate::config::Config;
use crate::crawler::{
    build_http_client, fetch_url, parse_html, CrawlLimits, CrawlSink, Crawler, FetchResult,
    PageLoader,
};
use crate::document::DocumentWriter;
use crate::extract::{
    build_document, download_images, plan_page_images, ExtractOptions, ImageMap, LayoutRules,
};
use crate::job::notify::Notifier;
use crate::job::progress::{crawl_progress, processing_progress, COMPLETE, CRAWL_DONE};
use crate::job::{with_store, JobOptions};
use crate::state::JobStatus;
use crate::storage::{JobProgress, JobRecord, JobStore, PageRecord};
use crate::url::{document_folder, parse_seed_url, Scope};
use crate::ScribeError;
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use url::Url;

/// Folder under a job's directory that holds its documents
pub const DOCUMENTS_DIR: &str = "documents";

/// Everything a job needs besides its own record
pub struct Orchestrator<S> {
    store: Arc<Mutex<S>>,
    client: Client,
    loader: PageLoader,
    limits: CrawlLimits,
    rules: Arc<LayoutRules>,
    storage_dir: PathBuf,
    notifier: Arc<dyn Notifier>,
}

impl<S> Clone for Orchestrator<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            client: self.client.clone(),
            loader: self.loader.clone(),
            limits: self.limits,
            rules: Arc::clone(&self.rules),
            storage_dir: self.storage_dir.clone(),
            notifier: Arc::clone(&self.notifier),
        }
    }
}

impl<S: JobStore> Orchestrator<S> {
    pub fn new(
        config: &Config,
        store: Arc<Mutex<S>>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, ScribeError> {
        let client = build_http_client(&config.fetch)?;
        let loader = PageLoader::from_config(&config.fetch, client.clone());
        let rules = LayoutRules::from_config(&config.layout)?;

        Ok(Self {
            store,
            client,
            loader,
            limits: CrawlLimits::from_config(&config.crawler),
            rules: Arc::new(rules),
            storage_dir: PathBuf::from(&config.output.storage_dir),
            notifier,
        })
    }

    pub fn store(&self) -> &Arc<Mutex<S>> {
        &self.store
    }

    pub(crate) fn set_notifier(&mut self, notifier: Arc<dyn Notifier>) {
        self.notifier = notifier;
    }

    /// Directory holding a job's documents and archive
    pub fn job_dir(&self, job_id: &str) -> PathBuf {
        self.storage_dir.join(job_id)
    }

    /// Runs a pending job to a terminal state and returns that state
    pub async fn run(&self, job_id: &str) -> JobStatus {
        match self.execute(job_id).await {
            Ok(()) => JobStatus::Completed,
            Err(e) => {
                tracing::error!("Job {} failed: {}", job_id, e);
                if let Err(mark_err) = self.mark_failed(job_id) {
                    tracing::error!("Could not record failure of job {}: {}", job_id, mark_err);
                }
                self.current_status(job_id).unwrap_or(JobStatus::Failed)
            }
        }
    }

    async fn execute(&self, job_id: &str) -> Result<(), ScribeError> {
        let job = with_store(&self.store, |s| s.get_job(job_id))?;
        let single_page = job.options.single_page_only;
        let expected_pages = if single_page { 1 } else { 0 };
        self.update(
            job_id,
            JobStatus::Crawling,
            JobProgress::new(0, expected_pages, 0),
        )?;

        let seed = parse_seed_url(&job.url)?;
        if single_page {
            self.fetch_single_page(job_id, &seed).await?;
        } else {
            self.crawl(&job, &seed).await?;
        }

        let pages = with_store(&self.store, |s| s.list_pages(job_id))?;
        let total = pages.len();
        self.update(
            job_id,
            JobStatus::Processing,
            JobProgress::new(CRAWL_DONE, total as u32, 0),
        )?;
        tracing::info!("Job {}: generating documents for {} pages", job_id, total);

        let job_dir = self.job_dir(job_id);
        let writer = DocumentWriter::new(job_dir.join(DOCUMENTS_DIR));
        let processed = self.generate_documents(&job, &pages, &writer).await?;

        if processed == 0 {
            return Err(ScribeError::NoPages {
                job_id: job_id.to_string(),
            });
        }

        let archive_path = archive::pack(writer.root(), &job_dir.join(ARCHIVE_FILE_NAME))?;
        let archive_str = archive_path.to_string_lossy().into_owned();
        with_store(&self.store, |s| s.set_archive_path(job_id, &archive_str))?;

        self.update(
            job_id,
            JobStatus::Completed,
            JobProgress::new(COMPLETE, total as u32, processed as u32),
        )?;
        tracing::info!(
            "Job {} completed: {}/{} pages, archive {}",
            job_id,
            processed,
            total,
            archive_path.display()
        );

        self.send_notification(&job);
        Ok(())
    }

    /// Single-page mode: one fetch, one page record, whatever the outcome
    async fn fetch_single_page(&self, job_id: &str, url: &Url) -> Result<(), ScribeError> {
        let title = match fetch_url(&self.client, url).await {
            FetchResult::Success {
                final_url, body, ..
            } => parse_html(&body, &final_url).title,
            failure => {
                tracing::warn!(
                    "Single-page fetch of {} failed: {}",
                    url,
                    failure.failure_reason().unwrap_or_default()
                );
                None
            }
        };

        let title = title.unwrap_or_else(|| url.to_string());
        with_store(&self.store, |s| s.add_page(job_id, url.as_str(), Some(&title)))?;
        Ok(())
    }

    async fn crawl(&self, job: &JobRecord, seed: &Url) -> Result<(), ScribeError> {
        let crawler = Crawler::new(self.client.clone(), self.limits);
        let mut sink = StoreSink {
            store: Arc::clone(&self.store),
            job_id: job.id.clone(),
        };
        let scope = Scope::from_follow_all(job.options.follow_all_domains);

        crawler.crawl(seed, scope, &mut sink).await?;
        Ok(())
    }

    /// Writes one document per page, returning how many succeeded
    async fn generate_documents(
        &self,
        job: &JobRecord,
        pages: &[PageRecord],
        writer: &DocumentWriter,
    ) -> Result<usize, ScribeError> {
        let total = pages.len();
        let mut processed = 0;

        for page in pages {
            match self.generate_page(&job.options, page, writer).await {
                Ok(path) => {
                    let path_str = path.to_string_lossy().into_owned();
                    with_store(&self.store, |s| s.update_page_document(page.id, &path_str))?;
                    processed += 1;
                    tracing::info!("Job {}: [{}/{}] {}", job.id, processed, total, page.url);
                }
                Err(e) if e.is_page_local() => {
                    tracing::warn!("Job {}: skipping {}: {}", job.id, page.url, e);
                }
                Err(e) => return Err(e),
            }

            self.update(
                &job.id,
                JobStatus::Processing,
                JobProgress::new(
                    processing_progress(processed, total),
                    total as u32,
                    processed as u32,
                ),
            )?;
        }

        Ok(processed)
    }

    async fn generate_page(
        &self,
        options: &JobOptions,
        page: &PageRecord,
        writer: &DocumentWriter,
    ) -> Result<PathBuf, ScribeError> {
        let url = Url::parse(&page.url)?;
        let loaded = self.loader.load(&url).await?;
        let selector = options.content_selector.as_deref();

        let images = if options.include_images {
            let folder = writer.root().join(document_folder(&url));
            self.fetch_images(&loaded.html, &loaded.final_url, selector, &folder)
                .await?
        } else {
            ImageMap::new()
        };

        let doc = build_document(
            &loaded.html,
            &loaded.final_url,
            ExtractOptions {
                selector,
                include_images: options.include_images,
            },
            &images,
            &self.rules,
        );

        let title = page.title.as_deref().unwrap_or(&page.url);
        writer.write(&doc, title, &url)
    }

    async fn fetch_images(
        &self,
        html: &str,
        base_url: &Url,
        selector: Option<&str>,
        folder: &Path,
    ) -> Result<ImageMap, ScribeError> {
        let plan = plan_page_images(html, base_url, selector);
        Ok(download_images(&self.client, &plan, folder).await?)
    }

    fn send_notification(&self, job: &JobRecord) {
        let Some(destination) = job.options.notify.as_deref() else {
            return;
        };
        let link = format!("/api/jobs/{}/download", job.id);
        if let Err(e) = self.notifier.notify(&job.id, destination, &link) {
            tracing::warn!("Notification for job {} failed: {}", job.id, e);
        }
    }

    fn update(
        &self,
        job_id: &str,
        status: JobStatus,
        progress: JobProgress,
    ) -> Result<(), ScribeError> {
        with_store(&self.store, |s| s.update_job_status(job_id, status, progress))
    }

    fn mark_failed(&self, job_id: &str) -> Result<(), ScribeError> {
        let status = self.current_status(job_id)?;
        if status.can_transition_to(JobStatus::Failed) {
            self.update(job_id, JobStatus::Failed, JobProgress::default())?;
        } else {
            tracing::warn!("Job {} left in {} (cannot move to failed)", job_id, status);
        }
        Ok(())
    }

    fn current_status(&self, job_id: &str) -> Result<JobStatus, ScribeError> {
        Ok(with_store(&self.store, |s| s.get_job(job_id))?.status)
    }
}

/// Records crawled pages and crawl progress for one job
struct StoreSink<S> {
    store: Arc<Mutex<S>>,
    job_id: String,
}

impl<S: JobStore> CrawlSink for StoreSink<S> {
    fn record_page(&mut self, url: &Url, title: Option<&str>) -> Result<(), ScribeError> {
        with_store(&self.store, |s| s.add_page(&self.job_id, url.as_str(), title))?;
        Ok(())
    }

    fn report_progress(&mut self, visited: usize, max_urls: usize) -> Result<(), ScribeError> {
        let progress = JobProgress {
            progress: Some(crawl_progress(visited, max_urls)),
            ..JobProgress::default()
        };
        with_store(&self.store, |s| {
            s.update_job_status(&self.job_id, JobStatus::Crawling, progress)
        })
    }
}
