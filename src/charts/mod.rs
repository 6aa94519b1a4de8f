use crate::imports::*;
use crate::operations::constructors as op;

pub mod axis;
pub mod metric;
pub mod query;

pub use axis::AxisChartOptions;
pub use metric::MetricChartOptions;
pub use query::ChartQuery;

/*
    Types:
    * ChartModel - The upstream pipeline a chart is derived from: data source, executable prefix
      and the columns its last result exposed
    * ChartOptions - Declarative options of one chart, either axis or metric

    Builders in axis.rs / metric.rs are pure: ChartModel + options in, extra operations out.
    Every check runs before any operation is built, so invalid options never reach the executor.
*/

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChartModel {
    pub data_source: Option<String>,
    pub operations: Vec<Operation>,
    pub columns: Vec<ResultColumn>,
}

impl ChartModel {
    pub fn new(
        data_source: impl Into<String>,
        operations: Vec<Operation>,
        columns: Vec<ResultColumn>,
    ) -> Self {
        ChartModel {
            data_source: Some(data_source.into()),
            operations,
            columns,
        }
    }

    /// Snapshot of an upstream query: its current prefix and the columns of its last result.
    pub async fn from_query(query: &Query) -> Self {
        ChartModel {
            data_source: query.pipeline().data_source().map(String::from),
            operations: query.pipeline().current_operations().to_vec(),
            columns: query.result().await.columns,
        }
    }

    pub fn dimension(&self, name: &str) -> Option<&ResultColumn> {
        self.columns
            .iter()
            .find(|c| c.name == name && c.is_dimension())
    }

    pub fn measure(&self, name: &str) -> Option<&ResultColumn> {
        self.columns
            .iter()
            .find(|c| c.name == name && c.is_measure())
    }

    pub(crate) fn pipeline_data(&self) -> PipelineData {
        PipelineData {
            data_source: self.data_source.clone(),
            operations: self.operations.clone(),
            active_operation_idx: self.operations.len() as isize - 1,
        }
    }
}

/// The aggregated form of a measure column inside summarize / pivot metrics.
pub(crate) fn measure_metric(measure: &ResultColumn) -> Metric {
    Metric::new(
        measure.name.clone(),
        op::expression(format!("sum({})", measure.name)),
    )
}

pub(crate) fn dimension_column(dimension: &ResultColumn) -> Column {
    op::column(dimension.name.clone())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "chart_type", rename_all = "snake_case")]
pub enum ChartOptions {
    Axis(AxisChartOptions),
    Metric(MetricChartOptions),
}

impl ChartOptions {
    pub fn build(&self, model: &ChartModel) -> Result<Vec<Operation>> {
        match self {
            ChartOptions::Axis(options) => axis::build(model, options),
            ChartOptions::Metric(options) => metric::build(model, options),
        }
    }
}

impl From<AxisChartOptions> for ChartOptions {
    fn from(options: AxisChartOptions) -> Self {
        ChartOptions::Axis(options)
    }
}

impl From<MetricChartOptions> for ChartOptions {
    fn from(options: MetricChartOptions) -> Self {
        ChartOptions::Metric(options)
    }
}
