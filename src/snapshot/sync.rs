use crate::imports::*;

/*
    SnapshotSync - Keeps one pipeline's snapshot up to date.

    Subscribes to the pipeline (operations, cursor, data source) and to execution hooks (result).
    Each change restarts a debounce; when it fires, the serialized snapshot is written unless it is
    byte-identical to the last write.
*/

struct SyncState {
    data: PipelineData,
    result: QueryResult,
}

struct SyncInner {
    name: String,
    key: SnapshotKey,
    store: SnapshotStore,
    services: PipelineServices,
    debouncer: Debouncer,
    state: Mutex<SyncState>,
    last_written: Mutex<Option<String>>,
    // Held for a whole write so a flush and a debounced write cannot interleave.
    writing: tokio::sync::Mutex<()>,
}

#[derive(Clone)]
pub struct SnapshotSync {
    inner: Arc<SyncInner>,
}

impl std::fmt::Debug for SnapshotSync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotSync")
            .field("key", &self.inner.key.to_string())
            .finish()
    }
}

impl SnapshotSync {
    // `services` must not contain this sync itself, it only receives snapshot_saved events.
    pub fn new(
        name: impl Into<String>,
        key: SnapshotKey,
        store: SnapshotStore,
        services: PipelineServices,
        delay: Duration,
    ) -> Self {
        SnapshotSync {
            inner: Arc::new(SyncInner {
                name: name.into(),
                key,
                store,
                services,
                debouncer: Debouncer::new(delay),
                state: Mutex::new(SyncState {
                    data: PipelineData::new(),
                    result: QueryResult::empty(),
                }),
                last_written: Mutex::new(None),
                writing: tokio::sync::Mutex::new(()),
            }),
        }
    }

    pub fn key(&self) -> &SnapshotKey {
        &self.inner.key
    }

    /// Loads the stored snapshot if it belongs to this pipeline's name.
    pub async fn restore(&self) -> Result<Option<PipelineSnapshot>> {
        let Some(snapshot) = self.inner.store.load(&self.inner.key).await? else {
            return Ok(None);
        };
        if snapshot.name != self.inner.name {
            tracing::warn!(
                key = %self.inner.key,
                stored_name = %snapshot.name,
                "Snapshot name does not match, ignoring"
            );
            return Ok(None);
        }
        {
            let mut state = self.inner.state.lock();
            state.data = snapshot.pipeline_data();
            state.result = snapshot.result.clone();
        }
        *self.inner.last_written.lock() = serde_json::to_string(&snapshot).ok();
        tracing::debug!(
            key = %self.inner.key,
            operation_count = snapshot.operations.len(),
            "Restored snapshot"
        );
        Ok(Some(snapshot))
    }

    pub fn serialize(&self) -> PipelineSnapshot {
        let state = self.inner.state.lock();
        PipelineSnapshot::new(
            self.inner.name.clone(),
            state.data.clone(),
            state.result.clone(),
        )
    }

    /// Writes the current snapshot now, cancelling any pending debounced write.
    /// Returns false when nothing changed since the last write.
    pub async fn flush(&self) -> Result<bool> {
        self.inner.debouncer.cancel();
        self.write().await
    }

    async fn write(&self) -> Result<bool> {
        let _writing = self.inner.writing.lock().await;
        let snapshot = self.serialize();
        let blob = serde_json::to_string(&snapshot).context("Failed to serialize snapshot")?;
        if self.inner.last_written.lock().as_deref() == Some(blob.as_str()) {
            tracing::trace!(key = %self.inner.key, "Snapshot unchanged, skipping write");
            return Ok(false);
        }
        let bytes = self.inner.store.save_raw(&self.inner.key, blob.clone()).await?;
        *self.inner.last_written.lock() = Some(blob);
        tracing::debug!(key = %self.inner.key, bytes, "Saved snapshot");
        if let Err(e) = self
            .inner
            .services
            .snapshot_saved(hook_events::SnapshotSaved {
                key: self.inner.key.to_string(),
                bytes,
            })
            .await
        {
            tracing::warn!(error = %e, "snapshot_saved hooks failed");
        }
        Ok(true)
    }

    fn schedule_write(&self) {
        let sync = self.clone();
        self.inner.debouncer.schedule(async move {
            if let Err(e) = sync.write().await {
                tracing::warn!(error = %format!("{:#}", e), "Scheduled snapshot write failed");
            }
        });
    }
}

impl PipelineObserver for SnapshotSync {
    fn on_change(&self, event: &PipelineChanged) {
        self.inner.state.lock().data = event.data.clone();
        self.schedule_write();
    }
}

#[async_trait]
impl EventHooks for SnapshotSync {
    async fn after_execute(&self, event: &hook_events::ExecutionFinished) -> Result<()> {
        if event.applied {
            self.inner.state.lock().result = event.result.clone();
            self.schedule_write();
        }
        Ok(())
    }
}
