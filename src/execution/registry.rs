use crate::imports::*;
use tokio::sync::OnceCell;

/*
    RequestRegistry - Shares one executor call between identical concurrent requests.

    Requests are keyed by their serialized JSON. The first caller runs the executor; callers that
    arrive while it is in flight await the same cell. The entry is dropped as soon as the call
    resolves or is abandoned, so this never caches finished results.

    One registry per application session. clear() on logout/teardown forgets every in-flight
    entry; callers already waiting still receive their response.
*/

type SharedResponse = Arc<OnceCell<std::result::Result<ExecutionResponse, String>>>;

pub struct RequestRegistry {
    inner: Arc<dyn QueryExecutor>,
    in_flight: Mutex<HashMap<String, SharedResponse>>,
}

impl std::fmt::Debug for RequestRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestRegistry")
            .field("in_flight", &self.in_flight.lock().len())
            .finish()
    }
}

impl RequestRegistry {
    pub fn new(inner: Arc<dyn QueryExecutor>) -> Self {
        RequestRegistry {
            inner,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.lock().len()
    }

    pub fn clear(&self) {
        let cleared = {
            let mut in_flight = self.in_flight.lock();
            let count = in_flight.len();
            in_flight.clear();
            count
        };
        tracing::debug!(cleared, "Cleared request registry");
    }

    fn cell_for(&self, key: &str) -> (SharedResponse, bool) {
        let mut in_flight = self.in_flight.lock();
        match in_flight.get(key) {
            Some(cell) => (cell.clone(), false),
            None => {
                let cell: SharedResponse = Arc::new(OnceCell::new());
                in_flight.insert(key.to_string(), cell.clone());
                (cell, true)
            }
        }
    }

    fn release(&self, key: &str, cell: &SharedResponse) {
        let mut in_flight = self.in_flight.lock();
        if in_flight.get(key).is_some_and(|c| Arc::ptr_eq(c, cell)) {
            in_flight.remove(key);
        }
    }
}

// Drops the in-flight entry once the call running the executor ends, completed or dropped.
struct InFlight<'a> {
    registry: &'a RequestRegistry,
    key: &'a str,
    cell: &'a SharedResponse,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.registry.release(self.key, self.cell);
    }
}

#[async_trait]
impl QueryExecutor for RequestRegistry {
    async fn execute(&self, request: &ExecutionRequest) -> Result<ExecutionResponse> {
        let key = serde_json::to_string(request).context("Failed to serialize execution request")?;
        let (cell, owner) = self.cell_for(&key);
        if !owner {
            tracing::debug!("Joining in-flight execution request");
        }
        // Whoever ends up initialising the cell (a joiner, if the owner was dropped) releases it.
        let response = cell
            .get_or_init(|| async {
                let _in_flight = InFlight {
                    registry: self,
                    key: &key,
                    cell: &cell,
                };
                self.inner
                    .execute(request)
                    .await
                    .map_err(|e| format!("{:#}", e))
            })
            .await
            .clone();
        response.map_err(|e| anyhow::anyhow!(e))
    }

    async fn distinct_column_values(
        &self,
        request: &ExecutionRequest,
        column_name: &str,
        search_term: Option<&str>,
    ) -> Result<ScalarValue> {
        self.inner
            .distinct_column_values(request, column_name, search_term)
            .await
    }

    async fn min_max(&self, request: &ExecutionRequest, column_name: &str) -> Result<ScalarValue> {
        self.inner.min_max(request, column_name).await
    }
}
