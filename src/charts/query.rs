use super::{AxisChartOptions, ChartModel, ChartOptions, MetricChartOptions};
use crate::imports::*;
use crate::snapshot::sync::SnapshotSync;

/*
    ChartQuery - A chart's own pipeline, derived from an upstream ChartModel.

    The wrapped Query never auto executes: a fetch rebuilds the whole log (upstream prefix plus
    chart steps) and then executes once. watch_options() deep-compares the options and debounces
    fetches; pre-flight errors are kept in last_error() for the editor to show.
*/

struct ChartInner {
    query: Mutex<Query>,
    trigger: ExecutionTrigger,
    snapshot: Option<SnapshotSync>,
    model: Mutex<ChartModel>,
    debouncer: Debouncer,
    watched: Mutex<Option<ChartOptions>>,
    last_error: Mutex<Option<String>>,
}

#[derive(Clone)]
pub struct ChartQuery {
    inner: Arc<ChartInner>,
}

impl std::fmt::Debug for ChartQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChartQuery")
            .field("query", &self.inner.query.lock().name().to_string())
            .field("watched", &self.inner.watched.lock())
            .field("last_error", &self.inner.last_error.lock())
            .finish()
    }
}

impl ChartQuery {
    /// Builds the chart's pipeline as a chart-kind, non auto-executing Query.
    pub async fn new(
        name: impl Into<String>,
        executor: Arc<dyn QueryExecutor>,
        model: ChartModel,
        settings: QuerySettings,
        services: PipelineServices,
        snapshots: Option<SnapshotStore>,
    ) -> Result<Self> {
        let settings = settings
            .with_auto_execute(false)
            .with_kind(PipelineKind::Chart);
        let chart_debounce = settings.chart_debounce();
        let mut builder = Query::builder(name, executor)
            .with_settings(settings)
            .with_services(services);
        if let Some(store) = snapshots {
            builder = builder.with_snapshots(store);
        }
        let query = builder.build().await?;
        let trigger = query.trigger().clone();
        let snapshot = query.snapshot_sync().cloned();

        Ok(ChartQuery {
            inner: Arc::new(ChartInner {
                query: Mutex::new(query),
                trigger,
                snapshot,
                model: Mutex::new(model),
                debouncer: Debouncer::new(chart_debounce),
                watched: Mutex::new(None),
                last_error: Mutex::new(None),
            }),
        })
    }

    pub fn set_model(&self, model: ChartModel) {
        *self.inner.model.lock() = model;
    }

    pub fn model(&self) -> ChartModel {
        self.inner.model.lock().clone()
    }

    pub fn operations(&self) -> Vec<Operation> {
        self.inner.query.lock().pipeline().operations().to_vec()
    }

    pub fn data(&self) -> PipelineData {
        self.inner.query.lock().pipeline().data()
    }

    pub async fn result(&self) -> QueryResult {
        self.inner.trigger.result().await
    }

    pub fn executing(&self) -> bool {
        self.inner.trigger.executing()
    }

    /// Pre-flight error of the last fetch, or the execution error if it got that far.
    pub fn last_error(&self) -> Option<String> {
        self.inner
            .last_error
            .lock()
            .clone()
            .or_else(|| self.inner.trigger.last_error())
    }

    pub async fn fetch_axis_chart_data(&self, options: &AxisChartOptions) -> Result<ExecutionOutcome> {
        self.fetch(&ChartOptions::Axis(options.clone())).await
    }

    pub async fn fetch_metric_chart_data(
        &self,
        options: &MetricChartOptions,
    ) -> Result<ExecutionOutcome> {
        self.fetch(&ChartOptions::Metric(options.clone())).await
    }

    #[tracing::instrument(skip(self, options))]
    async fn fetch(&self, options: &ChartOptions) -> Result<ExecutionOutcome> {
        let model = self.model();
        let chart_operations = match options.build(&model) {
            Ok(operations) => operations,
            Err(e) => {
                tracing::debug!(error = %e, "Chart options rejected");
                *self.inner.last_error.lock() = Some(e.to_string());
                return Err(e);
            }
        };
        *self.inner.last_error.lock() = None;

        let (data_source, prefix) = {
            let mut query = self.inner.query.lock();
            let pipeline = query.pipeline_mut();
            pipeline.load(model.pipeline_data());
            for operation in chart_operations {
                pipeline.add_operation(operation);
            }
            (
                pipeline.data_source().map(String::from),
                pipeline.current_operations().to_vec(),
            )
        };
        tracing::debug!(operation_count = prefix.len(), "Rebuilt chart pipeline");
        self.inner
            .trigger
            .execute(data_source.as_deref(), &prefix)
            .await
    }

    /// Fetches with `options` after the chart debounce, unless they equal the last watched ones.
    pub fn watch_options(&self, options: impl Into<ChartOptions>) {
        let options = options.into();
        {
            let mut watched = self.inner.watched.lock();
            if watched.as_ref() == Some(&options) {
                return;
            }
            *watched = Some(options.clone());
        }
        let chart = self.clone();
        self.inner.debouncer.schedule(async move {
            if let Err(e) = chart.fetch(&options).await {
                tracing::warn!(error = %format!("{:#}", e), "Chart refresh failed");
            }
        });
    }

    pub async fn flush_snapshot(&self) -> Result<bool> {
        match &self.inner.snapshot {
            Some(sync) => sync.flush().await,
            None => Ok(false),
        }
    }
}
