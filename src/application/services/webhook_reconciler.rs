use serde_json::Value;
use std::sync::Arc;

use crate::common::result::GitgateResult;
use crate::domain::entities::ChangedFileEvent;
use crate::domain::services::webhook_reconciler::reconcile;
use crate::domain::value_objects::{FileMatcher, Vendor};
use crate::infrastructure::vendors::VendorFactory;

/// Reconciles a push payload without a repository record or network access.
pub struct WebhookReconciler {
    factory: Arc<VendorFactory>,
}

impl WebhookReconciler {
    pub fn new(factory: Arc<VendorFactory>) -> Self {
        Self { factory }
    }

    pub fn extract_matching_files(
        &self,
        vendor: Vendor,
        payload: &Value,
        tracked_branch: &str,
        pattern: &str,
    ) -> GitgateResult<Vec<ChangedFileEvent>> {
        let matcher = FileMatcher::new(pattern)?;
        let parser = self.factory.push_parser(vendor)?;
        Ok(reconcile(parser.as_ref(), payload, tracked_branch, &matcher))
    }
}
