use crate::imports::*;
use std::collections::VecDeque;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();
}

/*
    MockExecutor - Scripted QueryExecutor for tests.

    Every response reports the prefix length it was computed for ("SELECT 1 -- N operations"),
    so tests can tell which request a stored result came from. Delays are consumed one per call
    in call order.
*/
#[derive(Default)]
pub struct MockExecutor {
    requests: Mutex<Vec<ExecutionRequest>>,
    delays: Mutex<VecDeque<Duration>>,
    failure: Mutex<Option<String>>,
    columns: Vec<ResultColumn>,
    distinct_values: Option<ScalarValue>,
    min_max: Option<ScalarValue>,
    auxiliary_calls: Mutex<Vec<String>>,
}

impl MockExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_columns(mut self, columns: Vec<ResultColumn>) -> Self {
        self.columns = columns;
        self
    }

    pub fn with_delays(self, delays: impl IntoIterator<Item = Duration>) -> Self {
        self.delays.lock().extend(delays);
        self
    }

    pub fn with_distinct_values(mut self, values: ScalarValue) -> Self {
        self.distinct_values = Some(values);
        self
    }

    pub fn with_min_max(mut self, values: ScalarValue) -> Self {
        self.min_max = Some(values);
        self
    }

    pub fn fail_with(&self, message: &str) {
        *self.failure.lock() = Some(message.to_string());
    }

    pub fn succeed(&self) {
        *self.failure.lock() = None;
    }

    pub fn requests(&self) -> Vec<ExecutionRequest> {
        self.requests.lock().clone()
    }

    pub fn auxiliary_calls(&self) -> Vec<String> {
        self.auxiliary_calls.lock().clone()
    }

    pub fn sql_for(operation_count: usize) -> String {
        format!("SELECT 1 -- {} operations", operation_count)
    }
}

#[async_trait]
impl QueryExecutor for MockExecutor {
    async fn execute(&self, request: &ExecutionRequest) -> Result<ExecutionResponse> {
        self.requests.lock().push(request.clone());
        let delay = self.delays.lock().pop_front();
        let failure = self.failure.lock().clone();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(message) = failure {
            return Err(anyhow::anyhow!(message));
        }

        let operation_count = request.query_pipeline.len();
        let mut row = Row::new();
        row.insert("operations".to_string(), serde_json::json!(operation_count));
        Ok(ExecutionResponse {
            sql: Self::sql_for(operation_count),
            rows: vec![row],
            columns: self.columns.clone(),
            total_row_count: operation_count as u64,
        })
    }

    async fn distinct_column_values(
        &self,
        request: &ExecutionRequest,
        column_name: &str,
        search_term: Option<&str>,
    ) -> Result<ScalarValue> {
        self.auxiliary_calls.lock().push(format!(
            "distinct_column_values({}, {:?}) on {} operations",
            column_name,
            search_term,
            request.query_pipeline.len()
        ));
        self.distinct_values
            .clone()
            .ok_or_else(|| anyhow::anyhow!("no distinct values scripted"))
    }

    async fn min_max(&self, request: &ExecutionRequest, column_name: &str) -> Result<ScalarValue> {
        self.auxiliary_calls.lock().push(format!(
            "min_max({}) on {} operations",
            column_name,
            request.query_pipeline.len()
        ));
        self.min_max
            .clone()
            .ok_or_else(|| anyhow::anyhow!("no min/max scripted"))
    }
}
