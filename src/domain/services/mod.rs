pub mod webhook_reconciler;

pub use webhook_reconciler::{NormalizedPush, PushCommit, PushPayloadParser};
