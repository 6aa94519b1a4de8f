use crate::imports::*;
use crate::snapshot::sync::SnapshotSync;
use tokio::sync::watch;

/*
    Query - One named pipeline wired to its collaborators.

    * pipeline: the edit log; mutate it through pipeline_mut()
    * trigger: subscribed to the pipeline, executes the prefix on change when auto_execute is on
    * snapshot: optional, subscribed to the pipeline and to execution results, persists both

    Built with Query::builder(name, executor).
*/
pub struct Query {
    name: String,
    settings: QuerySettings,
    pipeline: Pipeline,
    trigger: ExecutionTrigger,
    snapshot: Option<SnapshotSync>,
}

impl std::fmt::Debug for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Query")
            .field("name", &self.name)
            .field("kind", &self.settings.kind())
            .field("pipeline", &self.pipeline)
            .field("trigger", &self.trigger)
            .field("snapshot", &self.snapshot)
            .finish()
    }
}

pub struct QueryBuilder {
    name: String,
    executor: Arc<dyn QueryExecutor>,
    settings: QuerySettings,
    services: PipelineServices,
    snapshots: Option<SnapshotStore>,
}

impl QueryBuilder {
    pub fn with_settings(mut self, settings: QuerySettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_services(mut self, services: PipelineServices) -> Self {
        self.services = services;
        self
    }

    pub fn with_snapshots(mut self, store: SnapshotStore) -> Self {
        self.snapshots = Some(store);
        self
    }

    /// Wires the pipeline, trigger and snapshot sync together. A stored snapshot with a matching
    /// name is restored (data source, operations, cursor and result) without executing.
    #[tracing::instrument(skip(self), fields(name = %self.name, kind = %self.settings.kind()))]
    pub async fn build(self) -> Result<Query> {
        let QueryBuilder {
            name,
            executor,
            settings,
            mut services,
            snapshots,
        } = self;

        let snapshot = snapshots.map(|store| {
            SnapshotSync::new(
                name.clone(),
                settings.snapshot_key(&name),
                store,
                services.clone(),
                settings.snapshot_debounce(),
            )
        });
        if let Some(sync) = &snapshot {
            services.add_hook(sync.clone());
        }

        let trigger = ExecutionTrigger::new(executor, services.clone(), &settings);
        let mut pipeline = Pipeline::new().with_services(services);

        if let Some(sync) = &snapshot {
            match sync.restore().await {
                Ok(Some(restored)) => {
                    let data = restored.pipeline_data();
                    pipeline.load(data.clone());
                    trigger.restore(&data, restored.result).await;
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(
                        key = %sync.key(),
                        error = %format!("{:#}", e),
                        "Failed to restore snapshot, starting empty"
                    );
                }
            }
            pipeline.subscribe(sync.clone());
        }
        pipeline.subscribe(trigger.clone());

        tracing::debug!(
            operation_count = pipeline.operations().len(),
            auto_execute = settings.auto_execute(),
            "Built query"
        );
        Ok(Query {
            name,
            settings,
            pipeline,
            trigger,
            snapshot,
        })
    }
}

impl Query {
    pub fn builder(name: impl Into<String>, executor: Arc<dyn QueryExecutor>) -> QueryBuilder {
        QueryBuilder {
            name: name.into(),
            executor,
            settings: QuerySettings::default(),
            services: PipelineServices::new(),
            snapshots: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn settings(&self) -> &QuerySettings {
        &self.settings
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn pipeline_mut(&mut self) -> &mut Pipeline {
        &mut self.pipeline
    }

    pub fn trigger(&self) -> &ExecutionTrigger {
        &self.trigger
    }

    /// Executes the current prefix right away, bypassing the debounce.
    pub async fn execute(&self) -> Result<ExecutionOutcome> {
        self.trigger
            .execute(
                self.pipeline.data_source(),
                self.pipeline.current_operations(),
            )
            .await
    }

    pub async fn result(&self) -> QueryResult {
        self.trigger.result().await
    }

    pub fn executing(&self) -> bool {
        self.trigger.executing()
    }

    pub fn watch_executing(&self) -> watch::Receiver<bool> {
        self.trigger.watch_executing()
    }

    pub fn last_error(&self) -> Option<String> {
        self.trigger.last_error()
    }

    pub async fn serialize(&self) -> PipelineSnapshot {
        PipelineSnapshot::new(
            self.name.clone(),
            self.pipeline.data(),
            self.trigger.result().await,
        )
    }

    pub(crate) fn snapshot_sync(&self) -> Option<&SnapshotSync> {
        self.snapshot.as_ref()
    }

    /// Writes the snapshot immediately. Returns false without snapshots or when nothing changed.
    pub async fn flush_snapshot(&self) -> Result<bool> {
        match self.snapshot_sync() {
            Some(sync) => sync.flush().await,
            None => Ok(false),
        }
    }

    pub async fn distinct_column_values(
        &self,
        column_name: &str,
        search_term: Option<&str>,
    ) -> Result<ScalarValue> {
        self.trigger
            .distinct_column_values(
                self.pipeline.data_source(),
                self.pipeline.current_operations(),
                column_name,
                search_term,
            )
            .await
    }

    pub async fn min_max(&self, column_name: &str) -> Result<ScalarValue> {
        self.trigger
            .min_max(
                self.pipeline.data_source(),
                self.pipeline.current_operations(),
                column_name,
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operations::constructors::*;
    use crate::test_utils::{MockExecutor, init_tracing};
    use serde_json::json;

    fn settings() -> QuerySettings {
        QuerySettings::new().with_auto_execute(false)
    }

    #[tokio::test]
    async fn test_execute_sends_current_prefix() {
        init_tracing();
        let executor = Arc::new(MockExecutor::new());
        let mut query = Query::builder("sales", executor.clone())
            .with_settings(settings())
            .build()
            .await
            .unwrap();

        let pipeline = query.pipeline_mut();
        pipeline.set_data_source("erp");
        pipeline.add_source(table("Invoice"));
        pipeline.add_limit(10);
        pipeline.set_active_step(0).unwrap();

        let outcome = query.execute().await.unwrap();
        assert!(!outcome.is_stale());

        let requests = executor.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].data_source, "erp");
        assert_eq!(requests[0].query_pipeline, vec![source(table("Invoice"))]);
        assert_eq!(query.result().await.executed_sql, "SELECT 1 -- 1 operations");
    }

    #[tokio::test(start_paused = true)]
    async fn test_snapshot_written_after_debounce_and_restored() {
        init_tracing();
        let store = SnapshotStore::in_memory();
        let executor = Arc::new(MockExecutor::new());
        let settings = settings();
        let key = settings.snapshot_key("sales");

        {
            let mut query = Query::builder("sales", executor.clone())
                .with_settings(settings.clone())
                .with_snapshots(store.clone())
                .build()
                .await
                .unwrap();
            let pipeline = query.pipeline_mut();
            pipeline.set_data_source("erp");
            pipeline.add_source(table("Invoice"));
            pipeline.add_order_by(OrderBy {
                column: column("month"),
                direction: OrderDirection::Desc,
            });
            query.execute().await.unwrap();

            assert!(store.load(&key).await.unwrap().is_none());
            tokio::time::sleep(settings.snapshot_debounce() * 2).await;

            let stored = store.load(&key).await.unwrap().unwrap();
            assert_eq!(stored, query.serialize().await);
            assert!(!query.flush_snapshot().await.unwrap());
        }

        let restored = Query::builder("sales", executor.clone())
            .with_settings(settings)
            .with_snapshots(store.clone())
            .build()
            .await
            .unwrap();
        assert_eq!(restored.pipeline().data_source(), Some("erp"));
        assert_eq!(restored.pipeline().operations().len(), 2);
        assert_eq!(restored.pipeline().active_operation_idx(), 1);
        assert_eq!(
            restored.result().await.executed_sql,
            "SELECT 1 -- 2 operations"
        );
        // restoring never executes
        assert_eq!(executor.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_snapshot_for_other_name_is_ignored() {
        init_tracing();
        let store = SnapshotStore::in_memory();
        let settings = settings();
        let mut pipeline = Pipeline::new();
        pipeline.set_data_source("erp");
        pipeline.add_source(table("Invoice"));
        store
            .save(
                &settings.snapshot_key("sales"),
                &PipelineSnapshot::new("renamed", pipeline.data(), QueryResult::empty()),
            )
            .await
            .unwrap();

        let query = Query::builder("sales", Arc::new(MockExecutor::new()))
            .with_settings(settings)
            .with_snapshots(store)
            .build()
            .await
            .unwrap();
        assert!(query.pipeline().is_empty());
        assert_eq!(query.pipeline().data_source(), None);
    }

    #[tokio::test]
    async fn test_auxiliary_calls_use_current_prefix() {
        init_tracing();
        let executor = Arc::new(
            MockExecutor::new()
                .with_distinct_values(json!(["EU", "US"]))
                .with_min_max(json!({"min": 1, "max": 9})),
        );
        let mut query = Query::builder("sales", executor.clone())
            .with_settings(settings())
            .build()
            .await
            .unwrap();
        query.pipeline_mut().set_data_source("erp");
        query.pipeline_mut().add_source(table("Invoice"));

        let values = query
            .distinct_column_values("region", Some("u"))
            .await
            .unwrap();
        assert_eq!(values, json!(["EU", "US"]));
        let range = query.min_max("amount").await.unwrap();
        assert_eq!(range["max"], 9);

        let calls = executor.auxiliary_calls();
        assert_eq!(
            calls,
            vec![
                "distinct_column_values(region, Some(\"u\")) on 1 operations".to_string(),
                "min_max(amount) on 1 operations".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_execute_without_data_source_fails() {
        init_tracing();
        let query = Query::builder("sales", Arc::new(MockExecutor::new()))
            .with_settings(settings())
            .build()
            .await
            .unwrap();
        let err = query.execute().await.unwrap_err();
        assert_eq!(err.to_string(), "Data source is not set");
    }
}
