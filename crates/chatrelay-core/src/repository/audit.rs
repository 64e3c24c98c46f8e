//! AuditSink trait definition.

use chatrelay_types::audit::AuditRecord;
use chatrelay_types::error::RepositoryError;

/// Append-only sink for processed exchanges.
///
/// Must tolerate concurrent appends from different users. Implementations
/// live in chatrelay-infra (e.g., `SqliteAuditLog`).
pub trait AuditSink: Send + Sync {
    /// Persist one record. The record is considered logged once this returns `Ok`.
    fn append(
        &self,
        record: &AuditRecord,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
