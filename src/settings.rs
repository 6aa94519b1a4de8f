use crate::imports::*;

/*
    CONSTS:
    * DEFAULT_EXECUTE_DEBOUNCE - Quiet period before an edited prefix is executed
    * DEFAULT_SNAPSHOT_DEBOUNCE - Quiet period before a snapshot is written
    * DEFAULT_CHART_DEBOUNCE - Quiet period before changed chart options are rebuilt
    * DEFAULT_SNAPSHOT_NAMESPACE - First segment of every snapshot key
*/
pub const DEFAULT_EXECUTE_DEBOUNCE: Duration = Duration::from_millis(300);
pub const DEFAULT_SNAPSHOT_DEBOUNCE: Duration = Duration::from_millis(1000);
pub const DEFAULT_CHART_DEBOUNCE: Duration = Duration::from_millis(500);
pub const DEFAULT_SNAPSHOT_NAMESPACE: &str = "insights";

/*
    Types:
    * PipelineKind - Category of a pipeline, the second segment of its snapshot key
    * QuerySettings - Tunables for a Query or ChartQuery
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineKind {
    #[default]
    Query,
    Chart,
    Dashboard,
}

impl PipelineKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineKind::Query => "query",
            PipelineKind::Chart => "chart",
            PipelineKind::Dashboard => "dashboard",
        }
    }
}

impl std::fmt::Display for PipelineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct QuerySettings {
    pub(crate) execute_debounce: Duration,
    pub(crate) snapshot_debounce: Duration,
    pub(crate) chart_debounce: Duration,
    pub(crate) auto_execute: bool,
    pub(crate) snapshot_namespace: String,
    pub(crate) kind: PipelineKind,
}

impl Default for QuerySettings {
    fn default() -> Self {
        QuerySettings {
            execute_debounce: DEFAULT_EXECUTE_DEBOUNCE,
            snapshot_debounce: DEFAULT_SNAPSHOT_DEBOUNCE,
            chart_debounce: DEFAULT_CHART_DEBOUNCE,
            auto_execute: true,
            snapshot_namespace: DEFAULT_SNAPSHOT_NAMESPACE.to_string(),
            kind: PipelineKind::Query,
        }
    }
}

// Builder methods
impl QuerySettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn execute_debounce(&self) -> Duration {
        self.execute_debounce
    }

    pub fn snapshot_debounce(&self) -> Duration {
        self.snapshot_debounce
    }

    pub fn chart_debounce(&self) -> Duration {
        self.chart_debounce
    }

    pub fn auto_execute(&self) -> bool {
        self.auto_execute
    }

    pub fn snapshot_namespace(&self) -> &str {
        &self.snapshot_namespace
    }

    pub fn kind(&self) -> PipelineKind {
        self.kind
    }

    pub fn with_execute_debounce(mut self, delay: Duration) -> Self {
        self.execute_debounce = delay;
        self
    }

    pub fn with_snapshot_debounce(mut self, delay: Duration) -> Self {
        self.snapshot_debounce = delay;
        self
    }

    pub fn with_chart_debounce(mut self, delay: Duration) -> Self {
        self.chart_debounce = delay;
        self
    }

    pub fn with_auto_execute(mut self, auto_execute: bool) -> Self {
        self.auto_execute = auto_execute;
        self
    }

    pub fn with_snapshot_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.snapshot_namespace = namespace.into();
        self
    }

    pub fn with_kind(mut self, kind: PipelineKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn snapshot_key(&self, name: &str) -> SnapshotKey {
        SnapshotKey::new(&self.snapshot_namespace, self.kind, name)
    }
}
