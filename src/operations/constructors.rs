use crate::imports::*;

/*
    Pure constructors, one per operation variant plus the supporting value types.
    They never fail: checking that a column exists or a value fits an operator is the
    executor's job when the prefix runs.
*/

pub fn table(table_name: impl Into<String>) -> Table {
    Table::new(table_name)
}

pub fn column(column_name: impl Into<String>) -> Column {
    Column::new(column_name)
}

pub fn expression(expression: impl Into<String>) -> Expression {
    Expression::new(expression)
}

pub fn source(table: Table) -> Operation {
    Operation::Source(Source { table })
}

pub fn join(join_type: JoinType, table: Table, left_column: Column, right_column: Column) -> Operation {
    Operation::Join(Join {
        join_type,
        table,
        left_column,
        right_column,
    })
}

pub fn select(column_names: impl IntoIterator<Item = impl Into<String>>) -> Operation {
    Operation::Select(Select {
        column_names: column_names.into_iter().map(Into::into).collect(),
    })
}

pub fn remove(column_names: impl IntoIterator<Item = impl Into<String>>) -> Operation {
    Operation::Remove(Remove {
        column_names: column_names.into_iter().map(Into::into).collect(),
    })
}

pub fn rename(column: Column, new_name: impl Into<String>) -> Operation {
    Operation::Rename(Rename {
        column,
        new_name: new_name.into(),
    })
}

pub fn cast(column: Column, data_type: ColumnDataType) -> Operation {
    Operation::Cast(Cast { column, data_type })
}

pub fn filter(column: Column, operator: FilterOperator, value: ScalarValue) -> Operation {
    Operation::Filter(Filter::Column {
        column,
        operator,
        value,
    })
}

pub fn filter_expression(expression: Expression) -> Operation {
    Operation::Filter(Filter::Expression { expression })
}

pub fn mutate(new_name: impl Into<String>, mutation: impl Into<ColumnOrExpression>) -> Operation {
    Operation::Mutate(Mutate {
        new_name: new_name.into(),
        mutation: mutation.into(),
    })
}

pub fn summarize(metrics: Metrics, by: Vec<Column>) -> Operation {
    Operation::Summarize(Summarize { metrics, by })
}

pub fn pivot_wider(id_cols: Vec<Column>, names_from: Vec<Column>, values_from: Metrics) -> Operation {
    Operation::PivotWider(PivotWider {
        id_cols,
        names_from,
        values_from,
        values_agg: Aggregation::default(),
    })
}

pub fn order_by(column: Column, direction: OrderDirection) -> Operation {
    Operation::OrderBy(OrderBy { column, direction })
}

pub fn limit(limit: u64) -> Operation {
    Operation::Limit(Limit { limit })
}

/// The synthetic row-count metric used when a chart has no measure of its own.
pub fn count() -> Metric {
    Metric::new("count", expression("count()"))
}
