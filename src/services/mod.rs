/*
    Pipeline services module:
    * A pipeline service is a type that impls a given Service trait.
    * PipelineServices is a cheap-to-clone bundle handed to a Pipeline and its ExecutionTrigger.

    Two services:
    * An IO service for user interaction (notify/confirm). Confirmation gates destructive edits
      such as replacing the source of a non-empty pipeline.
    * A hooks service for observing execution and snapshot events.

    Hook failures never fail the operation that raised them; they are logged and dropped.
*/
use crate::imports::*;

pub mod hook_events;
pub mod io;

mod event_hooks; // Built-in Implementations of EventHooks

pub use event_hooks::debug::DebugEventHooks;

fn collect_hook_errors(errors: Vec<anyhow::Error>) -> Result<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        let msg = errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        Err(anyhow::anyhow!("Hook service errors: {msg}"))
    }
}

macro_rules! hook_dispatch {
    ($method:ident, $event_ty:ty) => {
        pub async fn $method(&self, event: $event_ty) -> Result<()> {
            let mut errors = Vec::new();
            for hook in &self.hooks {
                if let Err(e) = hook.$method(&event).await {
                    errors.push(e);
                }
            }
            collect_hook_errors(errors)
        }
    };
}

#[derive(Clone, Default)]
pub struct PipelineServices {
    io: Vec<Arc<dyn PipelineIO>>,
    hooks: Vec<Arc<dyn EventHooks>>,
}

impl std::fmt::Debug for PipelineServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineServices")
            .field("io_count", &self.io.len())
            .field("hooks_count", &self.hooks.len())
            .finish()
    }
}

impl PipelineServices {
    // Builder methods
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_io<T: PipelineIO + 'static>(&mut self, io: T) {
        self.io.push(Arc::new(io));
    }

    pub fn add_hook<T: EventHooks + 'static>(&mut self, hook: T) {
        self.hooks.push(Arc::new(hook));
    }

    pub fn add_hook_arc(&mut self, hook: Arc<dyn EventHooks>) {
        self.hooks.push(hook);
    }

    pub fn with_io<T: PipelineIO + 'static>(mut self, io: T) -> Self {
        self.add_io(io);
        self
    }

    pub fn with_hook<T: EventHooks + 'static>(mut self, hook: T) -> Self {
        self.add_hook(hook);
        self
    }

    // Single notify method, applies to all registered IO services
    pub async fn notify(&self, message: &str) -> Result<()> {
        let mut errors = Vec::new();
        for io in &self.io {
            if let Err(e) = io.notify(message).await {
                errors.push(e);
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            let msg = errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            Err(anyhow::anyhow!("IO service errors: {msg}"))
        }
    }

    // Asks each IO service in turn until one answers. Nobody answering counts as a decline.
    pub async fn confirm(&self, message: &str) -> Result<bool> {
        for io in &self.io {
            if let Some(answer) = io.confirm(message).await? {
                return Ok(answer);
            }
        }
        tracing::warn!(message, "No IO service answered the confirmation, declining");
        Ok(false)
    }

    // Hook methods
    hook_dispatch!(before_execute, hook_events::ExecutionStarted);
    hook_dispatch!(after_execute, hook_events::ExecutionFinished);
    hook_dispatch!(execution_failed, hook_events::ExecutionFailed);
    hook_dispatch!(snapshot_saved, hook_events::SnapshotSaved);

    pub fn defaults() -> Self {
        let mut services = Self::new();
        #[cfg(debug_assertions)]
        {
            services.add_hook(DebugEventHooks);
            services.add_io(io::StdoutInteraction);
        }
        services
    }
}

/*
    Service traits:
    * PipelineIO - Support for interaction outside of the pipeline.
    * EventHooks - Support for observing execution and persistence.

    Default impls on all methods so that types only need to implement what they care about.
*/
#[async_trait]
pub trait PipelineIO: Send + Sync {
    async fn notify(&self, _message: &str) -> Result<()> {
        Ok(())
    }
    // None means "no opinion", letting the next IO service answer.
    async fn confirm(&self, _message: &str) -> Result<Option<bool>> {
        Ok(None)
    }
}

#[async_trait]
pub trait EventHooks: Send + Sync {
    async fn before_execute(&self, _event: &hook_events::ExecutionStarted) -> Result<()> {
        Ok(())
    }
    async fn after_execute(&self, _event: &hook_events::ExecutionFinished) -> Result<()> {
        Ok(())
    }
    async fn execution_failed(&self, _event: &hook_events::ExecutionFailed) -> Result<()> {
        Ok(())
    }
    async fn snapshot_saved(&self, _event: &hook_events::SnapshotSaved) -> Result<()> {
        Ok(())
    }
}
