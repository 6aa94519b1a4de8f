use super::{ChartModel, dimension_column, measure_metric};
use crate::imports::*;
use crate::operations::constructors as op;

/// `x_axis` groups, `y_axis` lists measures, `split_by` optionally pivots a second dimension
/// into columns.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AxisChartOptions {
    pub x_axis: Option<String>,
    #[serde(default)]
    pub y_axis: Vec<String>,
    pub split_by: Option<String>,
}

impl AxisChartOptions {
    pub fn new(x_axis: impl Into<String>) -> Self {
        AxisChartOptions {
            x_axis: Some(x_axis.into()),
            ..Default::default()
        }
    }

    pub fn with_y_axis(mut self, measure: impl Into<String>) -> Self {
        self.y_axis.push(measure.into());
        self
    }

    pub fn with_split_by(mut self, dimension: impl Into<String>) -> Self {
        self.split_by = Some(dimension.into());
        self
    }

    fn validate(&self) -> Result<&str> {
        let x_axis = match self.x_axis.as_deref() {
            Some(x) if !x.is_empty() => x,
            _ => return Err(anyhow::anyhow!("X-axis is required")),
        };
        if self.split_by.as_deref() == Some(x_axis) {
            return Err(anyhow::anyhow!("X-axis and split-by cannot be the same"));
        }
        Ok(x_axis)
    }
}

/// Operations appended to the model's prefix for an axis chart.
pub fn build(model: &ChartModel, options: &AxisChartOptions) -> Result<Vec<Operation>> {
    let x_axis = options.validate()?;
    let x_axis = model
        .dimension(x_axis)
        .ok_or_else(|| anyhow::anyhow!("X-axis '{}' is not a dimension of the model", x_axis))?;

    let mut measures: Metrics = options
        .y_axis
        .iter()
        .filter_map(|name| {
            let measure = model.measure(name);
            if measure.is_none() {
                tracing::debug!(column = %name, "Dropping unknown y-axis measure");
            }
            measure
        })
        .map(measure_metric)
        .collect();
    if measures.is_empty() {
        measures.insert("count", op::expression("count()"));
    }

    let split_by = options
        .split_by
        .as_deref()
        .and_then(|name| model.dimension(name));

    let operation = match split_by {
        Some(split_by) => op::pivot_wider(
            vec![dimension_column(x_axis)],
            vec![dimension_column(split_by)],
            measures,
        ),
        None => op::summarize(measures, vec![dimension_column(x_axis)]),
    };
    Ok(vec![operation])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::fixtures::sales_model;

    #[test]
    fn test_x_axis_required() {
        let err = build(&sales_model(), &AxisChartOptions::default()).unwrap_err();
        assert_eq!(err.to_string(), "X-axis is required");
    }

    #[test]
    fn test_x_axis_and_split_by_must_differ() {
        let options = AxisChartOptions::new("team").with_split_by("team");
        let err = build(&sales_model(), &options).unwrap_err();
        assert_eq!(err.to_string(), "X-axis and split-by cannot be the same");
    }

    #[test]
    fn test_x_axis_must_be_a_dimension() {
        let err = build(&sales_model(), &AxisChartOptions::new("total")).unwrap_err();
        assert!(err.to_string().contains("'total' is not a dimension"));
        let err = build(&sales_model(), &AxisChartOptions::new("missing")).unwrap_err();
        assert!(err.to_string().contains("'missing' is not a dimension"));
    }

    #[test]
    fn test_summarize_by_x_axis_drops_unknown_measures() {
        let options = AxisChartOptions::new("month")
            .with_y_axis("total")
            .with_y_axis("nope")
            .with_y_axis("quantity");
        let operations = build(&sales_model(), &options).unwrap();
        assert_eq!(
            operations,
            vec![op::summarize(
                Metrics::new()
                    .with("total", op::expression("sum(total)"))
                    .with("quantity", op::expression("sum(quantity)")),
                vec![op::column("month")],
            )]
        );
    }

    #[test]
    fn test_defaults_to_count() {
        let options = AxisChartOptions::new("month").with_y_axis("team");
        let operations = build(&sales_model(), &options).unwrap();
        assert_eq!(
            operations,
            vec![op::summarize(
                Metrics::new().with("count", op::expression("count()")),
                vec![op::column("month")],
            )]
        );
    }

    #[test]
    fn test_split_by_pivots() {
        let options = AxisChartOptions::new("month")
            .with_y_axis("total")
            .with_split_by("region");
        let operations = build(&sales_model(), &options).unwrap();
        assert_eq!(
            operations,
            vec![op::pivot_wider(
                vec![op::column("month")],
                vec![op::column("region")],
                Metrics::new().with("total", op::expression("sum(total)")),
            )]
        );
    }

    #[test]
    fn test_split_by_on_measure_falls_back_to_summarize() {
        let options = AxisChartOptions::new("month").with_split_by("total");
        let operations = build(&sales_model(), &options).unwrap();
        assert_eq!(operations[0].kind(), OperationKind::Summarize);
    }
}
