use crate::imports::*;

pub mod registry;
pub mod result;
pub mod trigger;


/*
    Types:
    * ExecutionRequest - What the executor receives: a data source and an executable prefix
    * ExecutionResponse - What the executor returns for a prefix
    * QueryExecutor - The external backend that turns a prefix into SQL and rows

    The executor is a black box. Auxiliary calls take the same request plus their own
    parameters and return executor-defined payloads untouched.
*/

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRequest {
    pub data_source: String,
    pub query_pipeline: Vec<Operation>,
}

impl ExecutionRequest {
    pub fn new(data_source: impl Into<String>, query_pipeline: Vec<Operation>) -> Self {
        ExecutionRequest {
            data_source: data_source.into(),
            query_pipeline,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExecutionResponse {
    pub sql: String,
    pub rows: Vec<Row>,
    pub columns: Vec<ResultColumn>,
    pub total_row_count: u64,
}

#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn execute(&self, request: &ExecutionRequest) -> Result<ExecutionResponse>;

    async fn distinct_column_values(
        &self,
        _request: &ExecutionRequest,
        column_name: &str,
        _search_term: Option<&str>,
    ) -> Result<ScalarValue> {
        Err(anyhow::anyhow!(
            "Executor does not support distinct values (column '{}')",
            column_name
        ))
    }

    async fn min_max(&self, _request: &ExecutionRequest, column_name: &str) -> Result<ScalarValue> {
        Err(anyhow::anyhow!(
            "Executor does not support min/max (column '{}')",
            column_name
        ))
    }
}
