//! Endless cycle detection

use std::any::Any;

use crate::gateway::Interceptor;

/// Default maximum nesting depth of executed requests
pub const DEFAULT_CYCLE_LIMIT: usize = 100;

/// Guards against requests that keep re-executing each other
#[derive(Debug, Clone)]
pub struct EndlessCycleDetector {
    limit: usize,
}

impl Default for EndlessCycleDetector {
    fn default() -> Self {
        Self::new(DEFAULT_CYCLE_LIMIT)
    }
}

impl EndlessCycleDetector {
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Whether a nesting depth of `depth` breaks the limit
    pub fn is_exceeded(&self, depth: usize) -> bool {
        depth > self.limit
    }
}

impl Interceptor for EndlessCycleDetector {
    fn name(&self) -> &str {
        "endless_cycle_detector"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
