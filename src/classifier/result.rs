//! Classifier result types
//!
//! A `Classification` holds one `Bucket` per entry kind. Each entry keeps its
//! configuration key, its mapping position and, when listed in the bucket's
//! prepend list, its rank in that list.

use std::sync::Arc;

use crate::gateway::{Capability, EntryKind, Handler, Interceptor};

/// A pipeline component taken from the configuration
#[derive(Debug, Clone)]
pub enum Component {
    Handler(Arc<dyn Handler>),
    Capability(Arc<dyn Capability>),
    Interceptor(Arc<dyn Interceptor>),
}

impl Component {
    pub fn kind(&self) -> EntryKind {
        match self {
            Component::Handler(_) => EntryKind::Handler,
            Component::Capability(_) => EntryKind::Capability,
            Component::Interceptor(_) => EntryKind::Interceptor,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Component::Handler(h) => h.name(),
            Component::Capability(c) => c.name(),
            Component::Interceptor(i) => i.name(),
        }
    }
}

/// A bucket entry
#[derive(Debug, Clone)]
pub struct ClassifiedEntry {
    /// Configuration key, e.g. "gateway.handler.capture_payment"
    pub key: String,

    pub component: Component,

    /// Listed in the bucket's prepend list
    pub prepend: bool,

    /// Index of the key in the prepend list (first occurrence)
    pub prepend_rank: Option<usize>,

    /// Index among the bucket's entries, in mapping order
    pub position: usize,
}

/// Entries of one kind, in mapping order
#[derive(Debug, Clone)]
pub struct Bucket {
    pub kind: EntryKind,
    pub entries: Vec<ClassifiedEntry>,
}

impl Bucket {
    pub fn new(kind: EntryKind) -> Self {
        Self {
            kind,
            entries: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|e| e.key == key)
    }

    /// Prepended entries in declared prepend-list order
    pub fn prepended(&self) -> Vec<&ClassifiedEntry> {
        let mut prepended: Vec<&ClassifiedEntry> =
            self.entries.iter().filter(|e| e.prepend).collect();
        prepended.sort_by_key(|e| e.prepend_rank);
        prepended
    }

    /// Remaining entries in mapping order
    pub fn appended(&self) -> impl Iterator<Item = &ClassifiedEntry> {
        self.entries.iter().filter(|e| !e.prepend)
    }

    /// Keys in the order the assembled chain holds them
    pub fn placement(&self) -> Vec<&str> {
        self.prepended()
            .into_iter()
            .chain(self.appended())
            .map(|e| e.key.as_str())
            .collect()
    }
}

/// Classified view of a resolved configuration
#[derive(Debug, Clone)]
pub struct Classification {
    pub handlers: Bucket,
    pub capabilities: Bucket,
    pub interceptors: Bucket,

    /// Prepend-list keys that named no entry of their bucket
    pub ignored_prepends: Vec<String>,
}

impl Classification {
    /// Buckets in assembly order
    pub fn buckets(&self) -> [&Bucket; 3] {
        [&self.handlers, &self.capabilities, &self.interceptors]
    }

    pub fn bucket(&self, kind: EntryKind) -> &Bucket {
        match kind {
            EntryKind::Handler => &self.handlers,
            EntryKind::Capability => &self.capabilities,
            EntryKind::Interceptor => &self.interceptors,
        }
    }
}
