use crate::imports::*;

/*
    Types:
    * Row - One result row as returned by the executor
    * ResultColumn - Name and declared type of a result column
    * ColumnOption - label/value/description triple for column pickers
    * QueryResult - The last successful execution; always replaced wholesale
*/
pub type Row = serde_json::Map<String, ScalarValue>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultColumn {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: ColumnDataType,
}

impl ResultColumn {
    pub fn new(name: impl Into<String>, data_type: ColumnDataType) -> Self {
        ResultColumn {
            name: name.into(),
            data_type,
        }
    }

    pub fn is_measure(&self) -> bool {
        self.data_type.is_numeric()
    }

    pub fn is_dimension(&self) -> bool {
        !self.is_measure()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnOption {
    pub label: String,
    pub value: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    #[serde(rename = "executedSQL")]
    pub executed_sql: String,
    pub total_row_count: u64,
    pub rows: Vec<Row>,
    pub columns: Vec<ResultColumn>,
    #[serde(default)]
    pub column_options: Vec<ColumnOption>,
}

impl QueryResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() && self.rows.is_empty()
    }

    pub fn dimension_columns(&self) -> impl Iterator<Item = &ResultColumn> {
        self.columns.iter().filter(|c| c.is_dimension())
    }

    pub fn measure_columns(&self) -> impl Iterator<Item = &ResultColumn> {
        self.columns.iter().filter(|c| c.is_measure())
    }

    pub fn column(&self, name: &str) -> Option<&ResultColumn> {
        self.columns.iter().find(|c| c.name == name)
    }
}

impl From<ExecutionResponse> for QueryResult {
    fn from(response: ExecutionResponse) -> Self {
        let column_options = column_options(&response.columns);
        QueryResult {
            executed_sql: response.sql,
            total_row_count: response.total_row_count,
            rows: response.rows,
            columns: response.columns,
            column_options,
        }
    }
}

pub fn column_options(columns: &[ResultColumn]) -> Vec<ColumnOption> {
    columns
        .iter()
        .map(|c| ColumnOption {
            label: c.name.clone(),
            value: c.name.clone(),
            description: c.data_type.to_string(),
        })
        .collect()
}
