use crate::imports::*;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;

/*
    ExecutionTrigger - Runs a pipeline prefix against the executor and owns the resulting state.

    * result: last applied QueryResult, replaced wholesale, never partially
    * executing: observable flag, true while the latest execution is in flight
    * last_error: message of the latest failed execution, cleared by the next success
    * latest_token: every execute() takes the next token; a response is applied only if its
      token is still the latest, so a slow response can never overwrite a newer one

    As a PipelineObserver it compares the executable prefix structurally and, when it changed and
    auto execution is on, debounces a call to execute().
*/

#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionOutcome {
    Applied(QueryResult),
    // A newer execution was started before this one resolved; nothing was stored.
    Stale,
}

impl ExecutionOutcome {
    pub fn is_stale(&self) -> bool {
        matches!(self, ExecutionOutcome::Stale)
    }

    pub fn into_result(self) -> Option<QueryResult> {
        match self {
            ExecutionOutcome::Applied(result) => Some(result),
            ExecutionOutcome::Stale => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
struct ObservedPrefix {
    data_source: Option<String>,
    operations: Vec<Operation>,
}

struct TriggerInner {
    executor: Arc<dyn QueryExecutor>,
    services: PipelineServices,
    auto_execute: bool,
    debouncer: Debouncer,
    result: RwLock<QueryResult>,
    executing: watch::Sender<bool>,
    latest_token: AtomicU64,
    last_error: Mutex<Option<String>>,
    observed: Mutex<ObservedPrefix>,
}

#[derive(Clone)]
pub struct ExecutionTrigger {
    inner: Arc<TriggerInner>,
}

impl std::fmt::Debug for ExecutionTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionTrigger")
            .field("auto_execute", &self.inner.auto_execute)
            .field("executing", &self.executing())
            .field("latest_token", &self.inner.latest_token.load(Ordering::SeqCst))
            .finish()
    }
}

impl ExecutionTrigger {
    pub fn new(
        executor: Arc<dyn QueryExecutor>,
        services: PipelineServices,
        settings: &QuerySettings,
    ) -> Self {
        let (executing, _) = watch::channel(false);
        ExecutionTrigger {
            inner: Arc::new(TriggerInner {
                executor,
                services,
                auto_execute: settings.auto_execute(),
                debouncer: Debouncer::new(settings.execute_debounce()),
                result: RwLock::new(QueryResult::empty()),
                executing,
                latest_token: AtomicU64::new(0),
                last_error: Mutex::new(None),
                observed: Mutex::new(ObservedPrefix::default()),
            }),
        }
    }

    pub fn auto_execute(&self) -> bool {
        self.inner.auto_execute
    }

    pub async fn result(&self) -> QueryResult {
        self.inner.result.read().await.clone()
    }

    pub fn executing(&self) -> bool {
        *self.inner.executing.borrow()
    }

    pub fn watch_executing(&self) -> watch::Receiver<bool> {
        self.inner.executing.subscribe()
    }

    pub fn last_error(&self) -> Option<String> {
        self.inner.last_error.lock().clone()
    }

    // Seeds state from a restored snapshot without running anything.
    pub(crate) async fn restore(&self, data: &PipelineData, result: QueryResult) {
        *self.inner.observed.lock() = ObservedPrefix {
            data_source: data.data_source.clone(),
            operations: data.current_operations().to_vec(),
        };
        *self.inner.result.write().await = result;
    }

    fn is_latest(&self, token: u64) -> bool {
        self.inner.latest_token.load(Ordering::SeqCst) == token
    }

    fn request(data_source: Option<&str>, operations: &[Operation]) -> Result<ExecutionRequest> {
        match data_source {
            Some(data_source) if !data_source.is_empty() => {
                Ok(ExecutionRequest::new(data_source, operations.to_vec()))
            }
            _ => Err(anyhow::anyhow!("Data source is not set")),
        }
    }

    /// Executes `operations` on `data_source`. An empty prefix resolves to an empty result
    /// without calling the executor.
    #[tracing::instrument(skip(self, operations), fields(operation_count = operations.len()))]
    pub async fn execute(
        &self,
        data_source: Option<&str>,
        operations: &[Operation],
    ) -> Result<ExecutionOutcome> {
        let request = Self::request(data_source, operations)?;
        let token = self.inner.latest_token.fetch_add(1, Ordering::SeqCst) + 1;

        if request.query_pipeline.is_empty() {
            tracing::debug!(token, "Empty pipeline, skipping executor");
            let result = QueryResult::empty();
            let applied = self.apply(token, &result).await;
            if applied {
                self.finished(token, Duration::ZERO, true, &result).await;
                return Ok(ExecutionOutcome::Applied(result));
            }
            return Ok(ExecutionOutcome::Stale);
        }

        self.inner.executing.send_replace(true);
        let _executing = ExecutingGuard {
            trigger: self,
            token,
        };
        let started = Instant::now();
        if let Err(e) = self
            .inner
            .services
            .before_execute(hook_events::ExecutionStarted {
                token,
                data_source: request.data_source.clone(),
                operation_count: request.query_pipeline.len(),
            })
            .await
        {
            tracing::warn!(error = %e, "before_execute hooks failed");
        }

        let response = self.inner.executor.execute(&request).await;
        let duration = started.elapsed();

        match response {
            Ok(response) => {
                let result = QueryResult::from(response);
                let applied = self.apply(token, &result).await;
                tracing::info!(
                    token,
                    applied,
                    total_row_count = result.total_row_count,
                    duration_ms = duration.as_millis() as u64,
                    "Execution finished"
                );
                self.finished(token, duration, applied, &result).await;
                if applied {
                    Ok(ExecutionOutcome::Applied(result))
                } else {
                    Ok(ExecutionOutcome::Stale)
                }
            }
            Err(e) => {
                let message = format!("{:#}", e);
                // Only the latest execution owns the error and executing state.
                let owned = {
                    let _slot = self.inner.result.write().await;
                    if self.is_latest(token) {
                        *self.inner.last_error.lock() = Some(message.clone());
                        self.inner.executing.send_replace(false);
                        true
                    } else {
                        false
                    }
                };
                if !owned {
                    tracing::debug!(token, error = %message, "Discarding failure of stale execution");
                    return Ok(ExecutionOutcome::Stale);
                }
                tracing::warn!(token, error = %message, "Execution failed");
                if let Err(hook_err) = self
                    .inner
                    .services
                    .execution_failed(hook_events::ExecutionFailed {
                        token,
                        duration,
                        error: message,
                    })
                    .await
                {
                    tracing::warn!(error = %hook_err, "execution_failed hooks failed");
                }
                Err(e.context("Query execution failed"))
            }
        }
    }

    async fn finished(&self, token: u64, duration: Duration, applied: bool, result: &QueryResult) {
        if let Err(e) = self
            .inner
            .services
            .after_execute(hook_events::ExecutionFinished {
                token,
                duration,
                applied,
                result: result.clone(),
            })
            .await
        {
            tracing::warn!(error = %e, "after_execute hooks failed");
        }
    }

    // Stores `result` if `token` is still the latest. The token is checked under the write lock
    // so a newer execution cannot slip in between the check and the store.
    async fn apply(&self, token: u64, result: &QueryResult) -> bool {
        let mut slot = self.inner.result.write().await;
        if !self.is_latest(token) {
            tracing::debug!(token, "Discarding stale result");
            return false;
        }
        *slot = result.clone();
        *self.inner.last_error.lock() = None;
        self.inner.executing.send_replace(false);
        true
    }

    pub async fn distinct_column_values(
        &self,
        data_source: Option<&str>,
        operations: &[Operation],
        column_name: &str,
        search_term: Option<&str>,
    ) -> Result<ScalarValue> {
        let request = Self::request(data_source, operations)?;
        self.inner
            .executor
            .distinct_column_values(&request, column_name, search_term)
            .await
            .with_context(|| format!("Failed to fetch distinct values of '{}'", column_name))
    }

    pub async fn min_max(
        &self,
        data_source: Option<&str>,
        operations: &[Operation],
        column_name: &str,
    ) -> Result<ScalarValue> {
        let request = Self::request(data_source, operations)?;
        self.inner
            .executor
            .min_max(&request, column_name)
            .await
            .with_context(|| format!("Failed to fetch min/max of '{}'", column_name))
    }
}

// Clears `executing` when an execution ends in any way, including its future being dropped.
struct ExecutingGuard<'a> {
    trigger: &'a ExecutionTrigger,
    token: u64,
}

impl Drop for ExecutingGuard<'_> {
    fn drop(&mut self) {
        if self.trigger.is_latest(self.token) {
            self.trigger.inner.executing.send_replace(false);
        }
    }
}

impl PipelineObserver for ExecutionTrigger {
    fn on_change(&self, event: &PipelineChanged) {
        let next = ObservedPrefix {
            data_source: event.data_source().map(String::from),
            operations: event.current_operations().to_vec(),
        };
        {
            let mut observed = self.inner.observed.lock();
            if *observed == next {
                return;
            }
            *observed = next.clone();
        }
        if !self.inner.auto_execute {
            tracing::trace!("Prefix changed, auto execution disabled");
            return;
        }
        tracing::debug!(
            operation_count = next.operations.len(),
            delay_ms = self.inner.debouncer.delay().as_millis() as u64,
            "Prefix changed, scheduling execution"
        );
        let trigger = self.clone();
        self.inner.debouncer.schedule(async move {
            if let Err(e) = trigger
                .execute(next.data_source.as_deref(), &next.operations)
                .await
            {
                tracing::warn!(error = %format!("{:#}", e), "Scheduled execution failed");
            }
        });
    }
}
