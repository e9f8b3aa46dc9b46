//! Pipeline component traits
//!
//! Handlers, capabilities and interceptors are held as trait objects so the
//! configuration can carry caller-provided implementations next to the
//! built-in ones.

use std::any::Any;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The three kinds of pipeline entries
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Handler,
    Capability,
    Interceptor,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Handler => "handler",
            EntryKind::Capability => "capability",
            EntryKind::Interceptor => "interceptor",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A discrete request-processing step
pub trait Handler: Send + Sync + fmt::Debug {
    /// Stable name used in logs and gateway shapes
    fn name(&self) -> &str;

    fn as_any(&self) -> &dyn Any;
}

/// A service object made available to handlers (e.g. HTTP access)
pub trait Capability: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    fn as_any(&self) -> &dyn Any;
}

/// A cross-cutting observer or guard attached to the pipeline
pub trait Interceptor: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    fn as_any(&self) -> &dyn Any;
}
