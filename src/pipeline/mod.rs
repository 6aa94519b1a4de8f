use crate::imports::*;

pub mod edit;
pub mod observer;
pub mod source;


use observer::Observers;

/*
    Types:
    * PipelineData - The serializable core of a pipeline: data source, operation log and cursor
    * Pipeline - Cursor-based edit log over PipelineData, notifying observers on every change

    Cursor semantics:
    * `active` is None for an empty prefix (-1 on the wire) or Some(i) with i < operations.len()
    * the executable prefix is operations[..=active]
    * inserting always happens right after the cursor and drops everything after it
*/

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineData {
    pub data_source: Option<String>,
    pub operations: Vec<Operation>,
    pub active_operation_idx: isize,
}

impl PipelineData {
    pub fn new() -> Self {
        PipelineData {
            data_source: None,
            operations: Vec::new(),
            active_operation_idx: -1,
        }
    }

    pub fn current_operations(&self) -> &[Operation] {
        match cursor_from_index(self.active_operation_idx, self.operations.len()) {
            Some(idx) => &self.operations[..=idx],
            None => &[],
        }
    }
}

// Clamps a wire-format cursor into the valid range for a log of `len` operations.
fn cursor_from_index(index: isize, len: usize) -> Option<usize> {
    if index < 0 || len == 0 {
        None
    } else {
        Some((index as usize).min(len - 1))
    }
}

pub struct Pipeline {
    data_source: Option<String>,
    operations: Vec<Operation>,
    active: Option<usize>,
    services: PipelineServices,
    observers: Observers,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("data_source", &self.data_source)
            .field("operations", &self.operations.len())
            .field("active_operation_idx", &self.active_operation_idx())
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Pipeline {
    pub fn new() -> Self {
        Pipeline {
            data_source: None,
            operations: Vec::new(),
            active: None,
            services: PipelineServices::new(),
            observers: Observers::default(),
        }
    }

    pub fn with_services(mut self, services: PipelineServices) -> Self {
        self.services = services;
        self
    }

    /// Rebuilds a pipeline from its serialized form. An out-of-range cursor is clamped.
    pub fn from_data(data: PipelineData) -> Self {
        let active = cursor_from_index(data.active_operation_idx, data.operations.len());
        Pipeline {
            data_source: data.data_source,
            operations: data.operations,
            active,
            services: PipelineServices::new(),
            observers: Observers::default(),
        }
    }

    pub fn data(&self) -> PipelineData {
        PipelineData {
            data_source: self.data_source.clone(),
            operations: self.operations.clone(),
            active_operation_idx: self.active_operation_idx(),
        }
    }

    // Accessors
    pub fn data_source(&self) -> Option<&str> {
        self.data_source.as_deref()
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn active_operation_idx(&self) -> isize {
        self.active.map(|idx| idx as isize).unwrap_or(-1)
    }

    pub fn current_operations(&self) -> &[Operation] {
        match self.active {
            Some(idx) => &self.operations[..=idx],
            None => &[],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn source_table(&self) -> Option<&Table> {
        self.current_operations()
            .iter()
            .find_map(|op| op.as_source())
            .map(|source| &source.table)
    }

    pub fn services(&self) -> &PipelineServices {
        &self.services
    }

    // Observers
    pub fn subscribe<O: PipelineObserver + 'static>(&mut self, observer: O) -> SubscriptionId {
        self.observers.subscribe(Arc::new(observer))
    }

    pub fn subscribe_arc(&mut self, observer: Arc<dyn PipelineObserver>) -> SubscriptionId {
        self.observers.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    fn notify(&self) {
        if self.observers.is_empty() {
            return;
        }
        let event = PipelineChanged { data: self.data() };
        self.observers.notify_all(&event);
    }

    // Primitives every add_* method funnels through.

    /// Inserts right after the cursor, dropping the redo branch, and advances the cursor.
    pub(crate) fn add_operation(&mut self, operation: Operation) {
        let insert_at = self.active.map(|idx| idx + 1).unwrap_or(0);
        let dropped = self.operations.len().saturating_sub(insert_at);
        self.operations.truncate(insert_at);
        tracing::debug!(
            kind = %operation.kind(),
            index = insert_at,
            dropped,
            "Adding operation"
        );
        self.operations.push(operation);
        self.active = Some(insert_at);
        self.notify();
    }

    pub(crate) fn replace_operation(&mut self, index: usize, operation: Operation) {
        tracing::debug!(kind = %operation.kind(), index, "Replacing operation in place");
        self.operations[index] = operation;
        self.notify();
    }

    pub fn remove_step(&mut self, index: usize) -> Result<()> {
        if index >= self.operations.len() {
            return Err(anyhow::anyhow!(
                "Step index {} out of range for pipeline with {} operations",
                index,
                self.operations.len()
            ));
        }
        self.remove_at(index);
        Ok(())
    }

    // `index` must be in range.
    pub(crate) fn remove_at(&mut self, index: usize) {
        let removed = self.operations.remove(index);
        self.active = match self.active {
            Some(active) if index <= active => active.checked_sub(1),
            other => other,
        };
        if self.operations.is_empty() {
            self.active = None;
        }
        tracing::debug!(
            kind = %removed.kind(),
            index,
            active_operation_idx = self.active_operation_idx(),
            "Removed operation"
        );
        self.notify();
    }

    /// Moves the cursor without touching the log. -1 deactivates every step.
    pub fn set_active_step(&mut self, index: isize) -> Result<()> {
        if index < -1 || index >= self.operations.len() as isize {
            return Err(anyhow::anyhow!(
                "Cannot activate step {} in pipeline with {} operations",
                index,
                self.operations.len()
            ));
        }
        let active = cursor_from_index(index, self.operations.len());
        if active == self.active {
            return Ok(());
        }
        self.active = active;
        tracing::debug!(active_operation_idx = index, "Moved cursor");
        self.notify();
        Ok(())
    }

    /// Replaces the whole log; the cursor lands on the last operation.
    pub fn set_operations(&mut self, operations: Vec<Operation>) {
        self.active = operations.len().checked_sub(1);
        self.operations = operations;
        tracing::debug!(
            operation_count = self.operations.len(),
            "Replaced operations"
        );
        self.notify();
    }

    pub fn set_data_source(&mut self, data_source: impl Into<String>) {
        let data_source = data_source.into();
        if self.data_source.as_deref() == Some(data_source.as_str()) {
            return;
        }
        self.data_source = Some(data_source);
        self.notify();
    }

    /// Clears the log, keeping the data source.
    pub fn reset(&mut self) {
        if self.operations.is_empty() {
            return;
        }
        self.operations.clear();
        self.active = None;
        tracing::debug!("Reset pipeline");
        self.notify();
    }

    // Used by callers that rebuild a pipeline in one go without emitting intermediate changes.
    pub(crate) fn load(&mut self, data: PipelineData) {
        self.active = cursor_from_index(data.active_operation_idx, data.operations.len());
        self.data_source = data.data_source;
        self.operations = data.operations;
        self.notify();
    }
}
