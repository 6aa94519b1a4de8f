use crate::imports::*;

/*
    Types:
    * Table - A relation known to the executor
    * Column - A named column, with optional executor-specific options
    * Expression - A formula string, opaque to this crate
    * ColumnOrExpression - Either of the above, tagged by "type"
    * ColumnDataType - Declared type of a column, shared with the executor
    * FilterOperator / OrderDirection / JoinType / Aggregation - Small closed vocabularies
*/

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Table {
    pub table_name: String,
}

impl Table {
    pub fn new(table_name: impl Into<String>) -> Self {
        Table {
            table_name: table_name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub column_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<ScalarValue>,
}

impl Column {
    pub fn new(column_name: impl Into<String>) -> Self {
        Column {
            column_name: column_name.into(),
            options: None,
        }
    }

    pub fn with_options(mut self, options: ScalarValue) -> Self {
        self.options = Some(options);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Expression {
    pub expression: String,
}

impl Expression {
    pub fn new(expression: impl Into<String>) -> Self {
        Expression {
            expression: expression.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ColumnOrExpression {
    Column(Column),
    Expression(Expression),
}

impl ColumnOrExpression {
    /// Short text used by labels: the column name or the raw formula.
    pub fn display_text(&self) -> &str {
        match self {
            ColumnOrExpression::Column(column) => &column.column_name,
            ColumnOrExpression::Expression(expression) => &expression.expression,
        }
    }
}

impl From<Column> for ColumnOrExpression {
    fn from(column: Column) -> Self {
        ColumnOrExpression::Column(column)
    }
}

impl From<Expression> for ColumnOrExpression {
    fn from(expression: Expression) -> Self {
        ColumnOrExpression::Expression(expression)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ColumnDataType {
    #[default]
    String,
    Text,
    Integer,
    Decimal,
    Date,
    Datetime,
    Time,
    #[serde(rename = "JSON")]
    Json,
}

impl ColumnDataType {
    /// Numeric types are aggregated (measures), everything else is grouped on.
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnDataType::Integer | ColumnDataType::Decimal)
    }

    pub fn is_temporal(&self) -> bool {
        matches!(
            self,
            ColumnDataType::Date | ColumnDataType::Datetime | ColumnDataType::Time
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnDataType::String => "String",
            ColumnDataType::Text => "Text",
            ColumnDataType::Integer => "Integer",
            ColumnDataType::Decimal => "Decimal",
            ColumnDataType::Date => "Date",
            ColumnDataType::Datetime => "Datetime",
            ColumnDataType::Time => "Time",
            ColumnDataType::Json => "JSON",
        }
    }
}

impl std::fmt::Display for ColumnDataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterOperator {
    #[serde(rename = "=")]
    Equals,
    #[serde(rename = "!=")]
    NotEquals,
    #[serde(rename = ">")]
    GreaterThan,
    #[serde(rename = ">=")]
    GreaterThanOrEqual,
    #[serde(rename = "<")]
    LessThan,
    #[serde(rename = "<=")]
    LessThanOrEqual,
    #[serde(rename = "in")]
    In,
    #[serde(rename = "not_in")]
    NotIn,
    #[serde(rename = "between")]
    Between,
    #[serde(rename = "within")]
    Within,
    #[serde(rename = "contains")]
    Contains,
    #[serde(rename = "not_contains")]
    NotContains,
    #[serde(rename = "starts_with")]
    StartsWith,
    #[serde(rename = "ends_with")]
    EndsWith,
    #[serde(rename = "is_set")]
    IsSet,
    #[serde(rename = "is_not_set")]
    IsNotSet,
}

impl FilterOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Equals => "=",
            FilterOperator::NotEquals => "!=",
            FilterOperator::GreaterThan => ">",
            FilterOperator::GreaterThanOrEqual => ">=",
            FilterOperator::LessThan => "<",
            FilterOperator::LessThanOrEqual => "<=",
            FilterOperator::In => "in",
            FilterOperator::NotIn => "not_in",
            FilterOperator::Between => "between",
            FilterOperator::Within => "within",
            FilterOperator::Contains => "contains",
            FilterOperator::NotContains => "not_contains",
            FilterOperator::StartsWith => "starts_with",
            FilterOperator::EndsWith => "ends_with",
            FilterOperator::IsSet => "is_set",
            FilterOperator::IsNotSet => "is_not_set",
        }
    }

    // is_set / is_not_set carry no operand
    pub fn takes_value(&self) -> bool {
        !matches!(self, FilterOperator::IsSet | FilterOperator::IsNotSet)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderDirection {
    #[default]
    Asc,
    Desc,
}

impl OrderDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderDirection::Asc => "asc",
            OrderDirection::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinType {
    Inner,
    #[default]
    Left,
    Right,
    Full,
}

impl JoinType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JoinType::Inner => "inner",
            JoinType::Left => "left",
            JoinType::Right => "right",
            JoinType::Full => "full",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    #[default]
    Sum,
    Count,
    Avg,
    Min,
    Max,
}

impl Aggregation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Aggregation::Sum => "sum",
            Aggregation::Count => "count",
            Aggregation::Avg => "avg",
            Aggregation::Min => "min",
            Aggregation::Max => "max",
        }
    }
}
