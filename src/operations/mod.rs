use crate::imports::*;

pub mod constructors;
pub mod metrics;
pub mod types;

/*
    Operation - One typed step of a query pipeline.

    Serialized as a flat JSON object with a "type" discriminator, which is exactly what the
    executor receives in `query_pipeline`. Every consumer matches exhaustively so a new variant
    is a compile error everywhere it needs handling.
*/
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Operation {
    Source(Source),
    Join(Join),
    Select(Select),
    Remove(Remove),
    Rename(Rename),
    Cast(Cast),
    Filter(Filter),
    Mutate(Mutate),
    Summarize(Summarize),
    PivotWider(PivotWider),
    OrderBy(OrderBy),
    Limit(Limit),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Source,
    Join,
    Select,
    Remove,
    Rename,
    Cast,
    Filter,
    Mutate,
    Summarize,
    PivotWider,
    OrderBy,
    Limit,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Source => "source",
            OperationKind::Join => "join",
            OperationKind::Select => "select",
            OperationKind::Remove => "remove",
            OperationKind::Rename => "rename",
            OperationKind::Cast => "cast",
            OperationKind::Filter => "filter",
            OperationKind::Mutate => "mutate",
            OperationKind::Summarize => "summarize",
            OperationKind::PivotWider => "pivot_wider",
            OperationKind::OrderBy => "order_by",
            OperationKind::Limit => "limit",
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub table: Table,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Join {
    #[serde(default)]
    pub join_type: JoinType,
    pub table: Table,
    pub left_column: Column,
    pub right_column: Column,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Select {
    pub column_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Remove {
    pub column_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rename {
    pub column: Column,
    pub new_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cast {
    pub column: Column,
    pub data_type: ColumnDataType,
}

// A column predicate or a raw expression. Untagged: the presence of `expression` decides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Filter {
    Column {
        column: Column,
        operator: FilterOperator,
        #[serde(default)]
        value: ScalarValue,
    },
    Expression {
        expression: Expression,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mutate {
    #[serde(alias = "label")]
    pub new_name: String,
    pub mutation: ColumnOrExpression,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summarize {
    pub metrics: Metrics,
    #[serde(default)]
    pub by: Vec<Column>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PivotWider {
    #[serde(alias = "rows")]
    pub id_cols: Vec<Column>,
    #[serde(alias = "columns")]
    pub names_from: Vec<Column>,
    #[serde(alias = "values")]
    pub values_from: Metrics,
    #[serde(default)]
    pub values_agg: Aggregation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBy {
    pub column: Column,
    pub direction: OrderDirection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Limit {
    pub limit: u64,
}

impl Operation {
    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::Source(_) => OperationKind::Source,
            Operation::Join(_) => OperationKind::Join,
            Operation::Select(_) => OperationKind::Select,
            Operation::Remove(_) => OperationKind::Remove,
            Operation::Rename(_) => OperationKind::Rename,
            Operation::Cast(_) => OperationKind::Cast,
            Operation::Filter(_) => OperationKind::Filter,
            Operation::Mutate(_) => OperationKind::Mutate,
            Operation::Summarize(_) => OperationKind::Summarize,
            Operation::PivotWider(_) => OperationKind::PivotWider,
            Operation::OrderBy(_) => OperationKind::OrderBy,
            Operation::Limit(_) => OperationKind::Limit,
        }
    }

    /// One-line description of the step, as shown in a step list.
    pub fn label(&self) -> String {
        match self {
            Operation::Source(Source { table }) => format!("Source: {}", table.table_name),
            Operation::Join(join) => format!(
                "Join ({}): {} on {} = {}",
                join.join_type.as_str(),
                join.table.table_name,
                join.left_column.column_name,
                join.right_column.column_name
            ),
            Operation::Select(Select { column_names }) => {
                format!("Select: {}", column_names.join(", "))
            }
            Operation::Remove(Remove { column_names }) => {
                format!("Remove: {}", column_names.join(", "))
            }
            Operation::Rename(Rename { column, new_name }) => {
                format!("Rename: {} as {}", column.column_name, new_name)
            }
            Operation::Cast(Cast { column, data_type }) => {
                format!("Cast: {} to {}", column.column_name, data_type)
            }
            Operation::Filter(Filter::Column {
                column,
                operator,
                value,
            }) => {
                if operator.takes_value() {
                    format!(
                        "Filter: {} {} {}",
                        column.column_name,
                        operator.as_str(),
                        value
                    )
                } else {
                    format!("Filter: {} {}", column.column_name, operator.as_str())
                }
            }
            Operation::Filter(Filter::Expression { expression }) => {
                format!("Filter: {}", expression.expression)
            }
            Operation::Mutate(Mutate { new_name, mutation }) => {
                format!("Mutate: {} = {}", new_name, mutation.display_text())
            }
            Operation::Summarize(Summarize { metrics, by }) => {
                let metric_names = metrics.names().collect::<Vec<_>>().join(", ");
                if by.is_empty() {
                    format!("Summarize: {}", metric_names)
                } else {
                    let by = by
                        .iter()
                        .map(|c| c.column_name.as_str())
                        .collect::<Vec<_>>()
                        .join(", ");
                    format!("Summarize: {} by {}", metric_names, by)
                }
            }
            Operation::PivotWider(pivot) => {
                let join_names = |cols: &[Column]| {
                    cols.iter()
                        .map(|c| c.column_name.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                };
                format!(
                    "Pivot: {} by {} across {}",
                    pivot.values_from.names().collect::<Vec<_>>().join(", "),
                    join_names(&pivot.id_cols),
                    join_names(&pivot.names_from)
                )
            }
            Operation::OrderBy(OrderBy { column, direction }) => {
                format!("Sort: {} {}", column.column_name, direction.as_str())
            }
            Operation::Limit(Limit { limit }) => format!("Limit: {}", limit),
        }
    }

    pub fn as_order_by(&self) -> Option<&OrderBy> {
        match self {
            Operation::OrderBy(order_by) => Some(order_by),
            _ => None,
        }
    }

    pub fn as_source(&self) -> Option<&Source> {
        match self {
            Operation::Source(source) => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::constructors::*;
    use super::*;

    #[test]
    fn test_operations_serialize_with_type_tag() {
        let op = join(
            JoinType::Left,
            table("Team"),
            column("team"),
            column("name"),
        );
        let json = serde_json::to_value(&op).unwrap();
        assert_eq!(json["type"], "join");
        assert_eq!(json["join_type"], "left");
        assert_eq!(json["table"]["table_name"], "Team");
        assert_eq!(json["left_column"]["column_name"], "team");

        let json = serde_json::to_value(pivot_wider(
            vec![column("month")],
            vec![column("region")],
            Metrics::new().with("count", expression("count()")),
        ))
        .unwrap();
        assert_eq!(json["type"], "pivot_wider");
        assert_eq!(json["values_agg"], "sum");
    }

    #[test]
    fn test_filter_shapes_parse_from_executor_json() {
        let column_filter: Operation = serde_json::from_value(serde_json::json!({
            "type": "filter",
            "column": { "column_name": "status" },
            "operator": "=",
            "value": "Paid"
        }))
        .unwrap();
        assert_eq!(
            column_filter,
            filter(column("status"), FilterOperator::Equals, "Paid".into())
        );

        let expression_filter: Operation = serde_json::from_value(serde_json::json!({
            "type": "filter",
            "expression": { "expression": "amount > 10 and status == 'Paid'" }
        }))
        .unwrap();
        assert_eq!(
            expression_filter,
            filter_expression(expression("amount > 10 and status == 'Paid'"))
        );
    }

    #[test]
    fn test_legacy_field_names_are_accepted() {
        let op: Operation = serde_json::from_value(serde_json::json!({
            "type": "pivot_wider",
            "rows": [{ "column_name": "month" }],
            "columns": [{ "column_name": "region" }],
            "values": { "total": { "type": "column", "column_name": "total" } }
        }))
        .unwrap();
        match op {
            Operation::PivotWider(pivot) => {
                assert_eq!(pivot.id_cols[0].column_name, "month");
                assert_eq!(pivot.names_from[0].column_name, "region");
                assert_eq!(pivot.values_agg, Aggregation::Sum);
            }
            other => panic!("Expected pivot_wider, got {:?}", other),
        }

        let op: Operation = serde_json::from_value(serde_json::json!({
            "type": "mutate",
            "label": "target",
            "mutation": { "type": "expression", "expression": "literal(10)" }
        }))
        .unwrap();
        assert_eq!(op, mutate("target", expression("literal(10)")));
    }

    #[test]
    fn test_labels() {
        assert_eq!(source(table("Invoice")).label(), "Source: Invoice");
        assert_eq!(
            filter(column("amount"), FilterOperator::GreaterThan, 100.into()).label(),
            "Filter: amount > 100"
        );
        assert_eq!(
            filter(column("owner"), FilterOperator::IsSet, ScalarValue::Null).label(),
            "Filter: owner is_set"
        );
        assert_eq!(
            summarize(
                Metrics::new()
                    .with("count", expression("count()"))
                    .with("total", expression("sum(total)")),
                vec![column("month")]
            )
            .label(),
            "Summarize: count, total by month"
        );
        assert_eq!(
            order_by(column("month"), OrderDirection::Desc).label(),
            "Sort: month desc"
        );
        assert_eq!(limit(50).label(), "Limit: 50");
        assert_eq!(limit(50).kind(), OperationKind::Limit);
        assert_eq!(OperationKind::PivotWider.to_string(), "pivot_wider");
    }
}
