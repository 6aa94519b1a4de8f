mod charts;
mod execution;
mod operations;
mod pipeline;
mod query;
mod services;
mod settings;
mod snapshot;
mod timer;

#[cfg(test)]
mod test_utils;

// Library exports
pub mod prelude {
    // Operations
    pub use crate::operations::constructors;
    pub use crate::operations::metrics::{Metric, Metrics};
    pub use crate::operations::types::*;
    pub use crate::operations::{
        Cast, Filter, Join, Limit, Mutate, Operation, OperationKind, OrderBy, PivotWider, Remove,
        Rename, Select, Source, Summarize,
    };

    // Pipeline
    pub use crate::pipeline::observer::{PipelineChanged, PipelineObserver, SubscriptionId};
    pub use crate::pipeline::source::{REPLACE_SOURCE_PROMPT, SourceArgs};
    pub use crate::pipeline::{Pipeline, PipelineData};

    // Execution
    pub use crate::execution::registry::RequestRegistry;
    pub use crate::execution::result::{ColumnOption, QueryResult, ResultColumn, Row};
    pub use crate::execution::trigger::{ExecutionOutcome, ExecutionTrigger};
    pub use crate::execution::{ExecutionRequest, ExecutionResponse, QueryExecutor};

    // Query handles
    pub use crate::charts::{
        AxisChartOptions, ChartModel, ChartOptions, ChartQuery, MetricChartOptions,
    };
    pub use crate::query::{Query, QueryBuilder};

    // Services
    pub use crate::services::io::{StaticConfirmation, StdoutInteraction};
    pub use crate::services::{
        DebugEventHooks, EventHooks, PipelineIO, PipelineServices, hook_events,
    };

    // Snapshots and settings
    pub use crate::settings::{PipelineKind, QuerySettings};
    pub use crate::snapshot::backend::{DirectoryBackend, MemoryBackend, SnapshotBackend};
    pub use crate::snapshot::{PipelineSnapshot, SnapshotKey, SnapshotStore};
    pub use crate::timer::{Debouncer, TimerHandle};

    pub type ScalarValue = serde_json::Value;
}

// Internal imports for use within the crate
#[allow(unused_imports)]
pub(crate) mod imports {
    // Operations
    pub use crate::operations::metrics::{Metric, Metrics};
    pub use crate::operations::types::*;
    pub use crate::operations::{
        Cast, Filter, Join, Limit, Mutate, Operation, OperationKind, OrderBy, PivotWider, Remove,
        Rename, Select, Source, Summarize,
    };

    // Pipeline
    pub use crate::pipeline::observer::{PipelineChanged, PipelineObserver, SubscriptionId};
    pub use crate::pipeline::source::SourceArgs;
    pub use crate::pipeline::{Pipeline, PipelineData};

    // Execution
    pub use crate::execution::result::{ColumnOption, QueryResult, ResultColumn, Row};
    pub use crate::execution::trigger::{ExecutionOutcome, ExecutionTrigger};
    pub use crate::execution::{ExecutionRequest, ExecutionResponse, QueryExecutor};
    pub use crate::query::Query;

    // Services
    pub use crate::services::{EventHooks, PipelineIO, PipelineServices, hook_events};

    // Snapshots, settings and timers
    pub use crate::settings::{PipelineKind, QuerySettings};
    pub use crate::snapshot::backend::{MemoryBackend, SnapshotBackend};
    pub use crate::snapshot::{PipelineSnapshot, SnapshotKey, SnapshotStore};
    pub use crate::timer::Debouncer;

    // Values
    pub use crate::prelude::ScalarValue;

    // Result and error handling
    pub type Result<T> = anyhow::Result<T>;
    pub use anyhow::Context as _;

    // Traits and serialization
    pub use async_trait::async_trait;
    pub use serde::{Deserialize, Serialize};

    // File I/O
    pub use std::path::PathBuf;

    // Collections
    pub use std::collections::{HashMap, HashSet};

    // Sync and async
    pub use parking_lot::Mutex;
    pub use std::sync::Arc;
    pub use tokio::sync::RwLock;

    // Time
    pub use std::time::{Duration, Instant};
}
