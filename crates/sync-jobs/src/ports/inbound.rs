//! Inbound Ports (Driving Ports / API)

use crate::domain::entities::{JobDescriptor, TransactionJob};
use crate::domain::errors::SyncJobError;
use async_trait::async_trait;

/// Primary job construction API
#[async_trait]
pub trait TransactionJobApi: Send + Sync {
    /// Build the transaction job for a sync run.
    ///
    /// This is the single entry point. It:
    /// 1. Expands every requested operation into its dependency closure
    /// 2. Orders each unit, if a sorter is attached
    /// 3. Populates payloads now (`populate == true`) or leaves them for
    ///    `TransactionJobUnit::create_job_entries`
    async fn build(
        &self,
        descriptor: &JobDescriptor,
        populate: bool,
    ) -> Result<TransactionJob, SyncJobError>;
}
