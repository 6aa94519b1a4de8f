use super::{ChartModel, dimension_column, measure_metric};
use crate::imports::*;
use crate::operations::constructors as op;

/// A single headline number, optionally compared to a fixed target, a target measure, or
/// broken down over a date dimension.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MetricChartOptions {
    pub metric_column: Option<String>,
    pub target_value: Option<f64>,
    pub target_column: Option<String>,
    pub date_column: Option<String>,
}

impl MetricChartOptions {
    pub fn new(metric_column: impl Into<String>) -> Self {
        MetricChartOptions {
            metric_column: Some(metric_column.into()),
            ..Default::default()
        }
    }

    pub fn with_target_value(mut self, target_value: f64) -> Self {
        self.target_value = Some(target_value);
        self
    }

    pub fn with_target_column(mut self, target_column: impl Into<String>) -> Self {
        self.target_column = Some(target_column.into());
        self
    }

    pub fn with_date_column(mut self, date_column: impl Into<String>) -> Self {
        self.date_column = Some(date_column.into());
        self
    }

    fn validate(&self) -> Result<&str> {
        if self.target_value.is_some() && self.target_column.is_some() {
            return Err(anyhow::anyhow!(
                "Target value and target column cannot be used together"
            ));
        }
        if self.metric_column.is_some() && self.metric_column == self.target_column {
            return Err(anyhow::anyhow!(
                "Metric column and target column cannot be the same"
            ));
        }
        if self.target_column.is_some() && self.date_column.is_some() {
            return Err(anyhow::anyhow!(
                "Target column and date column cannot be used together"
            ));
        }
        match self.metric_column.as_deref() {
            Some(metric) if !metric.is_empty() => Ok(metric),
            _ => Err(anyhow::anyhow!("Metric column is required")),
        }
    }
}

/// Operations appended to the model's prefix for a metric chart.
pub fn build(model: &ChartModel, options: &MetricChartOptions) -> Result<Vec<Operation>> {
    let metric = options.validate()?;
    let metric = model
        .measure(metric)
        .ok_or_else(|| anyhow::anyhow!("Metric column '{}' is not a measure of the model", metric))?;

    if let Some(target_value) = options.target_value.filter(|v| *v > 0.0) {
        return Ok(vec![
            op::summarize([measure_metric(metric)].into_iter().collect(), Vec::new()),
            op::mutate(
                "target",
                op::expression(format!("literal({})", target_value)),
            ),
        ]);
    }

    if let Some(target) = options
        .target_column
        .as_deref()
        .and_then(|name| model.measure(name))
    {
        return Ok(vec![op::summarize(
            [measure_metric(metric), measure_metric(target)]
                .into_iter()
                .collect(),
            Vec::new(),
        )]);
    }

    if let Some(date) = options
        .date_column
        .as_deref()
        .and_then(|name| model.dimension(name))
    {
        return Ok(vec![op::summarize(
            [measure_metric(metric)].into_iter().collect(),
            vec![dimension_column(date)],
        )]);
    }

    Ok(vec![op::summarize(
        [measure_metric(metric)].into_iter().collect(),
        Vec::new(),
    )])
}
