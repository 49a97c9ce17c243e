//! Latest-wins reconciliation across both vendor payload shapes.

mod common;

use common::mock_services::ScriptedTransport;
use common::test_fixtures::{github_push, gitlab_push, push_commit};
use gitgate::application::services::WebhookReconciler;
use gitgate::domain::value_objects::Vendor;
use gitgate::infrastructure::vendors::VendorFactory;
use proptest::prelude::*;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

const PATHS: [&str; 5] = ["a.yaml", "b.yaml", "c.txt", "dir/d.yaml", "e.md"];

fn reconciler() -> WebhookReconciler {
    WebhookReconciler::new(Arc::new(VendorFactory::new(ScriptedTransport::new())))
}

fn payload(vendor: Vendor, git_ref: &str, commits: Vec<Value>) -> Value {
    match vendor {
        Vendor::Github => github_push(git_ref, commits),
        Vendor::Gitlab => gitlab_push(git_ref, commits),
    }
}

fn commits_strategy() -> impl Strategy<Value = Vec<Vec<usize>>> {
    prop::collection::vec(prop::collection::vec(0..PATHS.len(), 0..4), 1..6)
}

proptest! {
    #[test]
    fn prop_each_path_once_with_last_commit(
        touched in commits_strategy(),
        github in any::<bool>(),
    ) {
        let vendor = if github { Vendor::Github } else { Vendor::Gitlab };
        let commits: Vec<Value> = touched
            .iter()
            .enumerate()
            .map(|(i, files)| {
                let files: Vec<&str> = files.iter().map(|f| PATHS[*f]).collect();
                push_commit(&format!("c{}", i), Some("dev"), Some("msg"), &files)
            })
            .collect();

        let events = reconciler()
            .extract_matching_files(vendor, &payload(vendor, "refs/heads/main", commits), "main", r"\.yaml$")
            .unwrap();

        let mut expected: HashMap<&str, String> = HashMap::new();
        for (i, files) in touched.iter().enumerate() {
            for f in files {
                if PATHS[*f].ends_with(".yaml") {
                    expected.insert(PATHS[*f], format!("c{}", i));
                }
            }
        }

        prop_assert_eq!(events.len(), expected.len());
        for event in &events {
            prop_assert_eq!(Some(&event.commit.sha), expected.get(event.file_path.as_str()));
        }
    }

    #[test]
    fn prop_other_branches_produce_nothing(
        touched in commits_strategy(),
        branch in "[a-z]{1,8}",
    ) {
        prop_assume!(branch != "main");
        let commits: Vec<Value> = touched
            .iter()
            .map(|files| {
                let files: Vec<&str> = files.iter().map(|f| PATHS[*f]).collect();
                push_commit("c", None, None, &files)
            })
            .collect();
        let git_ref = format!("refs/heads/{}", branch);
        for vendor in Vendor::all() {
            let events = reconciler()
                .extract_matching_files(vendor, &payload(vendor, &git_ref, commits.clone()), "main", ".*")
                .unwrap();
            prop_assert!(events.is_empty());
        }
    }
}

#[test]
fn test_first_seen_order_is_kept() {
    let commits = vec![
        push_commit("c1", Some("Ann"), Some("one"), &["b.yaml", "a.yaml"]),
        push_commit("c2", Some("Bob"), Some("two"), &["a.yaml"]),
    ];
    let events = reconciler()
        .extract_matching_files(Vendor::Github, &github_push("refs/heads/main", commits), "main", ".*")
        .unwrap();
    let order: Vec<&str> = events.iter().map(|e| e.file_path.as_str()).collect();
    assert_eq!(order, vec!["b.yaml", "a.yaml"]);
    assert_eq!(events[1].commit.author.as_deref(), Some("Bob"));
    assert_eq!(events[0].commit.author.as_deref(), Some("Ann"));
}

#[test]
fn test_vendor_shapes_are_not_interchangeable() {
    let commits = vec![push_commit("c1", None, None, &["a.yaml"])];
    let github = github_push("refs/heads/main", commits);
    let events = reconciler()
        .extract_matching_files(Vendor::Gitlab, &github, "main", ".*")
        .unwrap();
    assert!(events.is_empty());
}

#[test]
fn test_missing_author_and_message_stay_empty() {
    let commits = vec![push_commit("c1", None, None, &["a.yaml"])];
    let events = reconciler()
        .extract_matching_files(Vendor::Gitlab, &gitlab_push("refs/heads/main", commits), "main", ".*")
        .unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].commit.author, None);
    assert_eq!(events[0].commit.message, None);
}

#[test]
fn test_payload_without_commits() {
    let mut payload = github_push("refs/heads/main", vec![]);
    assert!(reconciler()
        .extract_matching_files(Vendor::Github, &payload, "main", ".*")
        .unwrap()
        .is_empty());
    payload.as_object_mut().unwrap().remove("commits");
    assert!(reconciler()
        .extract_matching_files(Vendor::Github, &payload, "main", ".*")
        .unwrap()
        .is_empty());
}
