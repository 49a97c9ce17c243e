//! Background fetch of file content for webhook-derived events.
//!
//! Submitters may attach a callback. The registry lives in this process
//! only: a callback registered before a restart is lost, and the job's
//! result must then be picked up some other way.

use async_trait::async_trait;
use futures::future::{join_all, BoxFuture};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

use crate::application::services::AdapterResolver;
use crate::common::error::GitgateError;
use crate::common::result::GitgateResult;
use crate::domain::entities::{ChangedFileEvent, PushedCommit};
use crate::infrastructure::jobs::{InProcessJobQueue, JobHandler, JobId, JobListener, JobQueue};
use crate::infrastructure::vendors::TokenPolicy;

pub const FETCH_FILE_CONTENT_QUEUE: &str = "fetch-file-content";

/// One file to fetch at the commit that last touched it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileAtCommit {
    pub file_path: String,
    pub commit: PushedCommit,
}

impl From<ChangedFileEvent> for FileAtCommit {
    fn from(event: ChangedFileEvent) -> Self {
        Self {
            file_path: event.file_path,
            commit: event.commit,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchFileContentInput {
    pub organization_id: String,
    pub repository_id: String,
    pub files: Vec<FileAtCommit>,
}

/// Files that were found, in input order, with content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchFileContentOutput {
    pub organization_id: String,
    pub repository_id: String,
    pub files: Vec<ChangedFileEvent>,
}

pub type FetchCallback =
    Box<dyn FnOnce(FetchFileContentOutput) -> BoxFuture<'static, GitgateResult<()>> + Send>;

/// Boxes an async closure as a [`FetchCallback`].
pub fn fetch_callback<F, Fut>(callback: F) -> FetchCallback
where
    F: FnOnce(FetchFileContentOutput) -> Fut + Send + 'static,
    Fut: Future<Output = GitgateResult<()>> + Send + 'static,
{
    Box::new(move |output| Box::pin(callback(output)))
}

/// Finished job ids remembered for rejecting late registrations.
pub const FINISHED_JOBS_CAPACITY: usize = 1024;

#[derive(Default)]
struct RegistryState {
    callbacks: HashMap<JobId, FetchCallback>,
    finished: HashSet<JobId>,
    finished_order: VecDeque<JobId>,
}

impl RegistryState {
    fn mark_finished(&mut self, job_id: &JobId) {
        if !self.finished.insert(job_id.clone()) {
            return;
        }
        self.finished_order.push_back(job_id.clone());
        while self.finished_order.len() > FINISHED_JOBS_CAPACITY {
            if let Some(oldest) = self.finished_order.pop_front() {
                self.finished.remove(&oldest);
            }
        }
    }
}

/// Job id to callback, in process memory.
///
/// Completion and registration share one lock, so a callback is either
/// taken by the listener or rejected as late; it never stays behind.
#[derive(Clone, Default)]
pub struct CallbackRegistry {
    state: Arc<Mutex<RegistryState>>,
}

impl CallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        // A panic while holding the lock cannot leave the state half-updated
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Replaces any callback already registered for `job_id`. Fails when
    /// the job has already finished.
    pub fn register(&self, job_id: JobId, callback: FetchCallback) -> GitgateResult<()> {
        let mut state = self.lock();
        if state.finished.contains(&job_id) {
            return Err(GitgateError::job_error(
                job_id.to_string(),
                "job already finished, callback not registered",
            ));
        }
        if state.callbacks.insert(job_id.clone(), callback).is_some() {
            warn!(job_id = %job_id, "Replacing callback registered for job");
        }
        Ok(())
    }

    /// Marks the job finished and returns its callback. At most one caller
    /// gets it.
    pub fn finish(&self, job_id: &JobId) -> Option<FetchCallback> {
        let mut state = self.lock();
        state.mark_finished(job_id);
        state.callbacks.remove(job_id)
    }

    /// Drops the callback without marking the job finished.
    pub fn remove(&self, job_id: &JobId) -> bool {
        self.lock().callbacks.remove(job_id).is_some()
    }

    pub fn contains(&self, job_id: &JobId) -> bool {
        self.lock().callbacks.contains_key(job_id)
    }

    pub fn is_finished(&self, job_id: &JobId) -> bool {
        self.lock().finished.contains(job_id)
    }

    pub fn len(&self) -> usize {
        self.lock().callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().callbacks.is_empty()
    }
}

/// Worker side of the job.
pub struct FetchFileContentHandler {
    resolver: AdapterResolver,
    max_parallel: usize,
}

impl FetchFileContentHandler {
    pub fn new(resolver: AdapterResolver, max_parallel: usize) -> Self {
        Self {
            resolver,
            max_parallel: max_parallel.max(1),
        }
    }
}

#[async_trait]
impl JobHandler<FetchFileContentInput, FetchFileContentOutput> for FetchFileContentHandler {
    async fn run(&self, job_id: &JobId, input: FetchFileContentInput) -> GitgateResult<FetchFileContentOutput> {
        info!(
            job_id = %job_id,
            repository_id = %input.repository_id,
            files = input.files.len(),
            "Fetching file contents"
        );
        let resolved = self
            .resolver
            .resolve(&input.organization_id, &input.repository_id, TokenPolicy::Required)
            .await?;

        let semaphore = Arc::new(Semaphore::new(self.max_parallel));
        let tasks: Vec<_> = input
            .files
            .into_iter()
            .map(|file| {
                let adapter = Arc::clone(&resolved.adapter);
                let semaphore = Arc::clone(&semaphore);
                tokio::spawn(async move {
                    let _permit = semaphore.acquire().await.map_err(|e| {
                        GitgateError::internal_error(format!("Failed to acquire semaphore: {}", e))
                    })?;
                    let git_ref = Some(file.commit.sha.as_str()).filter(|sha| !sha.is_empty());
                    let fetched = adapter.get_file_on_repo(&file.file_path, git_ref).await?;
                    let event = match fetched {
                        Some(remote) => Some(
                            ChangedFileEvent::new(file.file_path, file.commit)
                                .with_content(remote.decoded_content()?),
                        ),
                        None => {
                            warn!(path = %file.file_path, sha = %file.commit.sha, "File not found at commit, skipping");
                            None
                        }
                    };
                    Ok::<_, GitgateError>(event)
                })
            })
            .collect();

        let mut files = Vec::with_capacity(tasks.len());
        for result in join_all(tasks).await {
            match result {
                Ok(Ok(Some(event))) => files.push(event),
                Ok(Ok(None)) => {}
                Ok(Err(e)) => warn!(job_id = %job_id, error = %e, "Failed to fetch file, skipping"),
                Err(e) => error!(job_id = %job_id, error = %e, "File fetch task aborted"),
            }
        }

        info!(job_id = %job_id, fetched = files.len(), "File contents fetched");
        Ok(FetchFileContentOutput {
            organization_id: input.organization_id,
            repository_id: input.repository_id,
            files,
        })
    }
}

/// Delivers results to registered callbacks, once.
pub struct FetchFileContentListener {
    registry: CallbackRegistry,
}

impl FetchFileContentListener {
    pub fn new(registry: CallbackRegistry) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl JobListener<FetchFileContentOutput> for FetchFileContentListener {
    async fn on_completed(&self, job_id: &JobId, output: FetchFileContentOutput) {
        let callback = match self.registry.finish(job_id) {
            Some(callback) => callback,
            None => {
                debug!(job_id = %job_id, "No callback registered for job");
                return;
            }
        };
        // Errors and panics stay inside the callback task
        match tokio::spawn(callback(output)).await {
            Ok(Ok(())) => debug!(job_id = %job_id, "Callback completed"),
            Ok(Err(e)) => error!(job_id = %job_id, error = %e, "Callback failed"),
            Err(e) => error!(job_id = %job_id, error = %e, "Callback panicked"),
        }
    }

    async fn on_failed(&self, job_id: &JobId, error: &GitgateError) {
        if self.registry.finish(job_id).is_some() {
            debug!(job_id = %job_id, "Dropped callback of failed job");
        }
        warn!(job_id = %job_id, error = %error, "File content fetch failed");
    }
}

/// Submission side.
pub struct FetchFileContentJob {
    queue: Arc<dyn JobQueue<FetchFileContentInput>>,
    registry: CallbackRegistry,
}

impl FetchFileContentJob {
    /// Job running on the in-process queue.
    pub fn new(resolver: AdapterResolver, max_parallel: usize) -> Self {
        let registry = CallbackRegistry::new();
        let queue = InProcessJobQueue::new(
            FETCH_FILE_CONTENT_QUEUE,
            Arc::new(FetchFileContentHandler::new(resolver, max_parallel)),
            Arc::new(FetchFileContentListener::new(registry.clone())),
        );
        Self::with_queue(Arc::new(queue), registry)
    }

    /// Job on another transport. Its listener must share `registry`.
    pub fn with_queue(queue: Arc<dyn JobQueue<FetchFileContentInput>>, registry: CallbackRegistry) -> Self {
        Self { queue, registry }
    }

    pub fn registry(&self) -> &CallbackRegistry {
        &self.registry
    }

    pub async fn submit(&self, input: FetchFileContentInput) -> GitgateResult<JobId> {
        self.queue.submit(input).await
    }

    /// Registers `callback` before the job is queued, so completion always
    /// finds it.
    pub async fn submit_with_callback(
        &self,
        input: FetchFileContentInput,
        callback: FetchCallback,
    ) -> GitgateResult<JobId> {
        let job_id = JobId::new();
        self.registry.register(job_id.clone(), callback)?;
        if let Err(e) = self.queue.enqueue(job_id.clone(), input).await {
            self.registry.remove(&job_id);
            return Err(e);
        }
        debug!(job_id = %job_id, "Job submitted with callback");
        Ok(job_id)
    }

    /// Attaches a callback to a job submitted earlier. A job that has
    /// already finished rejects it with [`GitgateError::JobError`].
    pub fn register_callback(&self, job_id: JobId, callback: FetchCallback) -> GitgateResult<()> {
        self.registry.register(job_id, callback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::{fake_factory, seeded_store, FakeRemote, ORG};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn file(path: &str, sha: &str) -> FileAtCommit {
        FileAtCommit {
            file_path: path.to_string(),
            commit: PushedCommit {
                sha: sha.to_string(),
                author: None,
                message: None,
            },
        }
    }

    fn input(repository_id: &str, files: Vec<FileAtCommit>) -> FetchFileContentInput {
        FetchFileContentInput {
            organization_id: ORG.into(),
            repository_id: repository_id.into(),
            files,
        }
    }

    fn resolver(remote: Arc<FakeRemote>) -> AdapterResolver {
        let store = seeded_store();
        AdapterResolver::new(store.clone(), store, fake_factory(remote))
    }

    fn output() -> FetchFileContentOutput {
        FetchFileContentOutput {
            organization_id: ORG.into(),
            repository_id: "r1".into(),
            files: vec![],
        }
    }

    #[tokio::test]
    async fn test_handler_keeps_order_and_skips_misses() {
        let remote = FakeRemote::with_files(&[("a.txt", "A"), ("c.txt", "C"), ("d.txt", "D")]);
        remote.fail_reads_of("d.txt");
        let handler = FetchFileContentHandler::new(resolver(remote), 2);

        let output = handler
            .run(
                &JobId::new(),
                input(
                    "r1",
                    vec![file("c.txt", "s1"), file("b.txt", "s2"), file("a.txt", "s3"), file("d.txt", "s4")],
                ),
            )
            .await
            .unwrap();
        let fetched: Vec<(&str, Option<&str>)> = output
            .files
            .iter()
            .map(|e| (e.file_path.as_str(), e.file_content.as_deref()))
            .collect();
        assert_eq!(fetched, vec![("c.txt", Some("C")), ("a.txt", Some("A"))]);
    }

    #[tokio::test]
    async fn test_handler_fails_on_unknown_repository() {
        let handler = FetchFileContentHandler::new(resolver(Arc::new(FakeRemote::default())), 2);
        let err = handler
            .run(&JobId::new(), input("missing", vec![file("a.txt", "s1")]))
            .await
            .unwrap_err();
        assert!(matches!(err, GitgateError::RepositoryNotFound { .. }));
    }

    #[tokio::test]
    async fn test_listener_invokes_callback_once() {
        let registry = CallbackRegistry::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let job_id = JobId::new();
        registry.register(
            job_id.clone(),
            fetch_callback(move |_| async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<(), GitgateError>(())
            }),
        )
        .unwrap();
        let listener = FetchFileContentListener::new(registry.clone());

        listener.on_completed(&job_id, output()).await;
        listener.on_completed(&job_id, output()).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_listener_failure_drops_callback_without_calling_it() {
        let registry = CallbackRegistry::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let job_id = JobId::new();
        registry.register(
            job_id.clone(),
            fetch_callback(move |_| async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<(), GitgateError>(())
            }),
        )
        .unwrap();
        let listener = FetchFileContentListener::new(registry.clone());

        listener
            .on_failed(&job_id, &GitgateError::repository_not_found("r1"))
            .await;
        listener.on_completed(&job_id, output()).await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(!registry.contains(&job_id));
    }

    #[tokio::test]
    async fn test_callback_errors_and_panics_are_swallowed() {
        let registry = CallbackRegistry::new();
        let listener = FetchFileContentListener::new(registry.clone());
        let failing = JobId::new();
        let panicking = JobId::new();
        registry.register(
            failing.clone(),
            fetch_callback(|_| async { Err::<(), _>(GitgateError::internal_error("callback broke")) }),
        )
        .unwrap();
        registry.register(
            panicking.clone(),
            fetch_callback(|output| async move {
                assert!(!output.files.is_empty(), "callback exploded");
                Ok::<(), GitgateError>(())
            }),
        )
        .unwrap();

        listener.on_completed(&failing, output()).await;
        listener.on_completed(&panicking, output()).await;
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_submit_with_callback_end_to_end() {
        let remote = FakeRemote::with_files(&[("a.txt", "hello")]);
        let job = FetchFileContentJob::new(resolver(remote), 4);
        let (tx, mut rx) = mpsc::unbounded_channel();

        let job_id = job
            .submit_with_callback(
                input("r1", vec![file("a.txt", "s1"), file("gone.txt", "s1")]),
                fetch_callback(move |output| async move {
                    let _ = tx.send(output);
                    Ok::<(), GitgateError>(())
                }),
            )
            .await
            .unwrap();

        let delivered = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(delivered.files.len(), 1);
        assert_eq!(delivered.files[0].file_content.as_deref(), Some("hello"));
        assert!(!job.registry().contains(&job_id));
        // The callback (and its sender) is consumed: no second delivery
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_late_registration_is_rejected() {
        let remote = FakeRemote::with_files(&[("a.txt", "hello")]);
        let job = FetchFileContentJob::new(resolver(remote), 2);

        let job_id = job.submit(input("r1", vec![file("a.txt", "s1")])).await.unwrap();
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        while !job.registry().is_finished(&job_id) {
            assert!(tokio::time::Instant::now() < deadline, "job never finished");
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        let err = job
            .register_callback(job_id.clone(), fetch_callback(|_| async { Ok::<(), GitgateError>(()) }))
            .unwrap_err();
        assert!(matches!(err, GitgateError::JobError { .. }));
        assert!(job.registry().is_empty());
    }

    #[tokio::test]
    async fn test_registration_before_completion_is_delivered() {
        let remote = FakeRemote::with_files(&[("a.txt", "hello")]);
        let registry = CallbackRegistry::new();
        let listener = FetchFileContentListener::new(registry.clone());
        let job_id = JobId::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        registry
            .register(
                job_id.clone(),
                fetch_callback(move |output| async move {
                    let _ = tx.send(output);
                    Ok::<(), GitgateError>(())
                }),
            )
            .unwrap();

        let output = FetchFileContentHandler::new(resolver(remote), 1)
            .run(&job_id, input("r1", vec![file("a.txt", "s1")]))
            .await
            .unwrap();
        listener.on_completed(&job_id, output).await;
        assert_eq!(rx.recv().await.unwrap().files.len(), 1);
        assert!(registry.is_finished(&job_id));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_finished_jobs_are_bounded() {
        let registry = CallbackRegistry::new();
        let first = JobId::new();
        registry.finish(&first);
        for _ in 0..FINISHED_JOBS_CAPACITY {
            registry.finish(&JobId::new());
        }
        assert!(!registry.is_finished(&first));
        registry
            .register(first.clone(), fetch_callback(|_| async { Ok::<(), GitgateError>(()) }))
            .unwrap();
        assert!(registry.contains(&first));
    }
}
