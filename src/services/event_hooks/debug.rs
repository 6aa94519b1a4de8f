/*
    A implementation of EventHooks that traces every event, for debugging purposes.
*/

use crate::imports::*;

pub struct DebugEventHooks;

#[async_trait]
impl EventHooks for DebugEventHooks {
    async fn before_execute(&self, event: &hook_events::ExecutionStarted) -> Result<()> {
        tracing::debug!(
            token = event.token,
            data_source = %event.data_source,
            operation_count = event.operation_count,
            "DebugEventHooks - before_execute"
        );
        Ok(())
    }
    async fn after_execute(&self, event: &hook_events::ExecutionFinished) -> Result<()> {
        tracing::debug!(
            token = event.token,
            applied = event.applied,
            duration_ms = event.duration.as_millis() as u64,
            total_row_count = event.result.total_row_count,
            "DebugEventHooks - after_execute"
        );
        Ok(())
    }
    async fn execution_failed(&self, event: &hook_events::ExecutionFailed) -> Result<()> {
        tracing::debug!(
            token = event.token,
            duration_ms = event.duration.as_millis() as u64,
            error = %event.error,
            "DebugEventHooks - execution_failed"
        );
        Ok(())
    }
    async fn snapshot_saved(&self, event: &hook_events::SnapshotSaved) -> Result<()> {
        tracing::debug!(key = %event.key, bytes = event.bytes, "DebugEventHooks - snapshot_saved");
        Ok(())
    }
}
