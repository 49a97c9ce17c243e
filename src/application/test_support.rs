//! In-process fakes for application tests.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::common::error::GitgateError;
use crate::common::result::GitgateResult;
use crate::domain::entities::{
    AvailableRepository, CommitInfo, CommitOutcome, FileToCommit, FileToDelete, Provider,
    RemoteFile, RepoTarget, Repository,
};
use crate::domain::services::PushPayloadParser;
use crate::domain::value_objects::Vendor;
use crate::infrastructure::http::{HttpRequest, HttpResponse, HttpTransport};
use crate::infrastructure::memory_store::InMemoryStore;
use crate::infrastructure::vendors::github::GithubPushParser;
use crate::infrastructure::vendors::{AdapterContext, GitProvider, GitRepo, VendorBuilder, VendorFactory};

pub const ORG: &str = "org-1";

pub struct NoNetwork;

#[async_trait]
impl HttpTransport for NoNetwork {
    async fn send(&self, request: HttpRequest) -> GitgateResult<HttpResponse> {
        panic!("unexpected request to {}", request.url);
    }
}

/// Shared remote state behind every adapter the fake builder hands out.
#[derive(Default)]
pub struct FakeRemote {
    pub files: Mutex<BTreeMap<String, String>>,
    pub commits: AtomicUsize,
    pub fail_reads: Mutex<Vec<String>>,
}

impl FakeRemote {
    pub fn with_files(files: &[(&str, &str)]) -> Arc<Self> {
        let remote = Self::default();
        if let Ok(mut map) = remote.files.lock() {
            for (path, content) in files {
                map.insert(path.to_string(), content.to_string());
            }
        }
        Arc::new(remote)
    }

    pub fn fail_reads_of(&self, path: &str) {
        self.fail_reads.lock().unwrap().push(path.to_string());
    }
}

pub struct FakeRepo {
    remote: Arc<FakeRemote>,
    target: RepoTarget,
    parser: GithubPushParser,
}

#[async_trait]
impl GitRepo for FakeRepo {
    fn vendor(&self) -> Vendor {
        Vendor::Github
    }

    fn target(&self) -> &RepoTarget {
        &self.target
    }

    fn repository_url(&self) -> String {
        format!("https://github.com/{}/{}", self.target.owner, self.target.repo)
    }

    async fn commit_files(
        &self,
        files: &[FileToCommit],
        message: &str,
        delete_files: &[FileToDelete],
    ) -> GitgateResult<CommitOutcome> {
        if files.is_empty() && delete_files.is_empty() {
            return Err(GitgateError::NoFilesToCommit);
        }
        let mut map = self.remote.files.lock().unwrap();
        let writes: Vec<&FileToCommit> = files
            .iter()
            .filter(|f| map.get(&f.path) != Some(&f.content))
            .collect();
        let deletes: Vec<&FileToDelete> = delete_files
            .iter()
            .filter(|f| map.contains_key(&f.path))
            .collect();
        if writes.is_empty() && deletes.is_empty() {
            return Ok(CommitOutcome::NoChanges);
        }
        for file in writes {
            map.insert(file.path.clone(), file.content.clone());
        }
        for file in deletes {
            map.remove(&file.path);
        }
        let n = self.remote.commits.fetch_add(1, Ordering::SeqCst) + 1;
        let sha = format!("sha-{}", n);
        Ok(CommitOutcome::Committed(CommitInfo {
            url: Vendor::Github.commit_url(&self.repository_url(), &sha),
            sha,
            message: message.to_string(),
            author: "dev@example.com".to_string(),
        }))
    }

    async fn get_file_on_repo(&self, path: &str, _git_ref: Option<&str>) -> GitgateResult<Option<RemoteFile>> {
        if self.remote.fail_reads.lock().unwrap().iter().any(|p| p == path) {
            return Err(GitgateError::vendor_api("GitHub", Some(500), "boom"));
        }
        let map = self.remote.files.lock().unwrap();
        Ok(map.get(path).map(|content| RemoteFile {
            sha: format!("blob-{}", path),
            content: STANDARD.encode(content),
        }))
    }

    async fn list_directories_on_repo(&self, path: Option<&str>) -> GitgateResult<Vec<String>> {
        let map = self.remote.files.lock().unwrap();
        let mut dirs: Vec<String> = map
            .keys()
            .filter_map(|p| p.rsplit_once('/').map(|(dir, _)| dir.to_string()))
            .collect();
        dirs.sort();
        dirs.dedup();
        Ok(crate::domain::value_objects::repo_path::relative_directories(dirs, path))
    }

    async fn check_directory_exists(&self, path: &str, _branch: Option<&str>) -> GitgateResult<bool> {
        let prefix = format!("{}/", path.trim_matches('/'));
        Ok(self.remote.files.lock().unwrap().keys().any(|p| p.starts_with(&prefix)))
    }

    async fn list_files_in_directory(&self, path: &str, _git_ref: Option<&str>) -> GitgateResult<Vec<String>> {
        let prefix = format!("{}/", path.trim_matches('/'));
        Ok(self
            .remote
            .files
            .lock()
            .unwrap()
            .keys()
            .filter(|p| p.starts_with(&prefix))
            .cloned()
            .collect())
    }

    fn push_parser(&self) -> &dyn PushPayloadParser {
        &self.parser
    }
}

pub struct FakeProvider {
    pub branches: Vec<String>,
}

#[async_trait]
impl GitProvider for FakeProvider {
    fn vendor(&self) -> Vendor {
        Vendor::Github
    }

    async fn list_available_repositories(&self) -> GitgateResult<Vec<AvailableRepository>> {
        Ok(vec![AvailableRepository {
            name: "widgets".into(),
            owner: "acme".into(),
            description: None,
            private: true,
            default_branch: "main".into(),
            language: Some("Rust".into()),
            stars: 3,
        }])
    }

    async fn check_branch_exists(&self, _owner: &str, _repo: &str, branch: &str) -> GitgateResult<bool> {
        Ok(self.branches.iter().any(|b| b == branch))
    }
}

pub struct FakeBuilder {
    pub remote: Arc<FakeRemote>,
}

impl VendorBuilder for FakeBuilder {
    fn vendor(&self) -> Vendor {
        Vendor::Github
    }

    fn build_repo(&self, _context: &AdapterContext, target: RepoTarget) -> Arc<dyn GitRepo> {
        Arc::new(FakeRepo {
            remote: Arc::clone(&self.remote),
            target,
            parser: GithubPushParser,
        })
    }

    fn build_provider(&self, _context: &AdapterContext) -> Arc<dyn GitProvider> {
        Arc::new(FakeProvider {
            branches: vec!["main".into()],
        })
    }

    fn push_parser(&self) -> Arc<dyn PushPayloadParser> {
        Arc::new(GithubPushParser)
    }
}

pub fn fake_factory(remote: Arc<FakeRemote>) -> Arc<VendorFactory> {
    let mut factory = VendorFactory::empty(Arc::new(NoNetwork));
    factory.register(Arc::new(FakeBuilder { remote }));
    Arc::new(factory)
}

/// Store with provider `p1` (github, token) and repository `r1`
/// (`acme/widgets@main`) in [`ORG`].
pub fn seeded_store() -> Arc<InMemoryStore> {
    Arc::new(InMemoryStore::seeded(
        vec![Provider::new("p1", "github", ORG).with_token("ghp_test")],
        vec![Repository::new("r1", "acme", "widgets", "p1", ORG)],
    ))
}
