/*
    Types for supporting EventHooks:
    * ExecutionStarted
    * ExecutionFinished
    * ExecutionFailed
    * SnapshotSaved
*/
use crate::imports::*;

#[derive(Debug, Clone)]
pub struct ExecutionStarted {
    pub token: u64,
    pub data_source: String,
    pub operation_count: usize,
}

#[derive(Debug, Clone)]
pub struct ExecutionFinished {
    pub token: u64,
    pub duration: Duration,
    // false when a newer execution superseded this one and the result was dropped
    pub applied: bool,
    pub result: QueryResult,
}

#[derive(Debug, Clone)]
pub struct ExecutionFailed {
    pub token: u64,
    pub duration: Duration,
    pub error: String,
}

#[derive(Debug, Clone)]
pub struct SnapshotSaved {
    pub key: String,
    pub bytes: usize,
}
