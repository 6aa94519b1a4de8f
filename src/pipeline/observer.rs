use crate::imports::*;

/*
    Types:
    * PipelineChanged - Emitted after every effective mutation of a Pipeline
    * PipelineObserver - Explicit subscriber to pipeline changes
    * SubscriptionId - Handle returned by Pipeline::subscribe
    * Observers - The subscriber list held by a Pipeline
*/
pub type SubscriptionId = u64;

#[derive(Debug, Clone)]
pub struct PipelineChanged {
    pub data: PipelineData,
}

impl PipelineChanged {
    pub fn data_source(&self) -> Option<&str> {
        self.data.data_source.as_deref()
    }

    /// The executable prefix at the time of the change.
    pub fn current_operations(&self) -> &[Operation] {
        self.data.current_operations()
    }
}

// Observers are called synchronously from inside the mutating method, so they must not block.
// Anything slow (execution, snapshot writes) is scheduled onto a debouncer instead.
pub trait PipelineObserver: Send + Sync {
    fn on_change(&self, event: &PipelineChanged);
}

impl<F> PipelineObserver for F
where
    F: Fn(&PipelineChanged) + Send + Sync,
{
    fn on_change(&self, event: &PipelineChanged) {
        self(event)
    }
}

#[derive(Default)]
pub(crate) struct Observers {
    subscribers: Vec<(SubscriptionId, Arc<dyn PipelineObserver>)>,
    next_id: SubscriptionId,
}

impl Observers {
    pub(crate) fn subscribe(&mut self, observer: Arc<dyn PipelineObserver>) -> SubscriptionId {
        self.next_id += 1;
        let id = self.next_id;
        self.subscribers.push((id, observer));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub_id, _)| *sub_id != id);
        self.subscribers.len() != before
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub(crate) fn notify_all(&self, event: &PipelineChanged) {
        for (_, observer) in &self.subscribers {
            observer.on_change(event);
        }
    }
}
