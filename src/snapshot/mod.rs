use crate::imports::*;

pub mod backend;
pub mod sync;

/*
    Types:
    * PipelineSnapshot - Everything needed to resume a pipeline: name, data source, operations,
      cursor and last result
    * SnapshotKey - "<namespace>:<kind>:<name>"
    * SnapshotStore - Typed access to a SnapshotBackend

    Entries have no TTL and are only removed by remove()/clear().
*/

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineSnapshot {
    pub name: String,
    pub data_source: Option<String>,
    pub operations: Vec<Operation>,
    pub active_operation_idx: isize,
    #[serde(default)]
    pub result: QueryResult,
}

impl PipelineSnapshot {
    pub fn new(name: impl Into<String>, data: PipelineData, result: QueryResult) -> Self {
        PipelineSnapshot {
            name: name.into(),
            data_source: data.data_source,
            operations: data.operations,
            active_operation_idx: data.active_operation_idx,
            result,
        }
    }

    pub fn pipeline_data(&self) -> PipelineData {
        PipelineData {
            data_source: self.data_source.clone(),
            operations: self.operations.clone(),
            active_operation_idx: self.active_operation_idx,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SnapshotKey {
    namespace: String,
    kind: PipelineKind,
    name: String,
}

impl SnapshotKey {
    pub fn new(namespace: impl Into<String>, kind: PipelineKind, name: impl Into<String>) -> Self {
        SnapshotKey {
            namespace: namespace.into(),
            kind,
            name: name.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> PipelineKind {
        self.kind
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }
}

impl std::fmt::Display for SnapshotKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.namespace, self.kind, self.name)
    }
}

#[derive(Clone)]
pub struct SnapshotStore {
    backend: Arc<dyn SnapshotBackend>,
}

impl std::fmt::Debug for SnapshotStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotStore").finish_non_exhaustive()
    }
}

impl SnapshotStore {
    pub fn new<B: SnapshotBackend + 'static>(backend: B) -> Self {
        SnapshotStore {
            backend: Arc::new(backend),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new())
    }

    pub async fn load(&self, key: &SnapshotKey) -> Result<Option<PipelineSnapshot>> {
        let key = key.to_string();
        let Some(blob) = self.backend.load(&key).await? else {
            return Ok(None);
        };
        let snapshot = serde_json::from_str(&blob)
            .with_context(|| format!("Failed to parse snapshot '{}'", key))?;
        Ok(Some(snapshot))
    }

    /// Writes the snapshot and returns the size of the stored blob.
    pub async fn save(&self, key: &SnapshotKey, snapshot: &PipelineSnapshot) -> Result<usize> {
        let blob = serde_json::to_string(snapshot).context("Failed to serialize snapshot")?;
        self.save_raw(key, blob).await
    }

    pub(crate) async fn save_raw(&self, key: &SnapshotKey, blob: String) -> Result<usize> {
        let bytes = blob.len();
        self.backend
            .save(&key.to_string(), blob)
            .await
            .with_context(|| format!("Failed to save snapshot '{}'", key))?;
        Ok(bytes)
    }

    pub async fn remove(&self, key: &SnapshotKey) -> Result<()> {
        self.backend.remove(&key.to_string()).await
    }

    pub async fn keys(&self) -> Result<Vec<String>> {
        self.backend.keys().await
    }

    pub async fn clear(&self) -> Result<()> {
        self.backend.clear().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::constructors::*;
    use crate::test_utils::init_tracing;

    fn sample_snapshot() -> PipelineSnapshot {
        let mut pipeline = Pipeline::new();
        pipeline.set_data_source("erp");
        pipeline.add_source(table("Invoice"));
        pipeline.add_limit(10);
        pipeline.add_limit(20);
        pipeline.set_active_step(1).unwrap();
        PipelineSnapshot::new("sales", pipeline.data(), QueryResult::empty())
    }

    #[test]
    fn test_snapshot_key_format() {
        let key = SnapshotKey::new("insights", PipelineKind::Chart, "Monthly Sales");
        assert_eq!(key.to_string(), "insights:chart:Monthly Sales");
    }

    #[test]
    fn test_snapshot_wire_shape() {
        let json = serde_json::to_value(sample_snapshot()).unwrap();
        assert_eq!(json["name"], "sales");
        assert_eq!(json["dataSource"], "erp");
        assert_eq!(json["activeOperationIdx"], 1);
        assert_eq!(json["operations"].as_array().unwrap().len(), 3);
        assert_eq!(json["result"]["executedSQL"], "");
    }

    #[test]
    fn test_deserialize_serialize_reconstructs_pipeline() {
        let snapshot = sample_snapshot();
        let blob = serde_json::to_string(&snapshot).unwrap();
        let restored: PipelineSnapshot = serde_json::from_str(&blob).unwrap();
        let pipeline = Pipeline::from_data(restored.pipeline_data());

        assert_eq!(pipeline.data_source(), Some("erp"));
        assert_eq!(pipeline.operations(), snapshot.operations.as_slice());
        assert_eq!(pipeline.active_operation_idx(), 1);
        assert_eq!(pipeline.current_operations().len(), 2);
    }

    #[tokio::test]
    async fn test_store_load_save_remove() {
        init_tracing();
        let store = SnapshotStore::in_memory();
        let key = SnapshotKey::new("insights", PipelineKind::Query, "sales");

        assert!(store.load(&key).await.unwrap().is_none());

        let snapshot = sample_snapshot();
        let bytes = store.save(&key, &snapshot).await.unwrap();
        assert!(bytes > 0);
        assert_eq!(store.load(&key).await.unwrap(), Some(snapshot));
        assert_eq!(store.keys().await.unwrap(), vec!["insights:query:sales".to_string()]);

        store.remove(&key).await.unwrap();
        assert!(store.load(&key).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_corrupt_blob_is_an_error() {
        init_tracing();
        let backend = MemoryBackend::new();
        backend
            .save("insights:query:broken", "{not json".to_string())
            .await
            .unwrap();
        let store = SnapshotStore::new(backend);
        let err = store
            .load(&SnapshotKey::new("insights", PipelineKind::Query, "broken"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to parse snapshot 'insights:query:broken'"));
    }
}
