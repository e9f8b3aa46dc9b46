//! Gateway pipeline
//!
//! `Pipeline` is the insertion contract the assembler writes through.
//! `Gateway` is the in-memory implementation returned by the factory; it only
//! stores the ordered chains; executing requests is up to the caller.

mod component;

pub use component::{Capability, EntryKind, Handler, Interceptor};

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by a pipeline while accepting entries
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{kind} {name} rejected: {reason}")]
    Rejected {
        kind: EntryKind,
        name: String,
        reason: String,
    },
}

/// Insertion contract of a processing pipeline.
///
/// `prepend = true` inserts the entry in front of everything already present
/// in the corresponding chain; otherwise it is appended.
pub trait Pipeline {
    fn add_handler(
        &mut self,
        handler: Arc<dyn Handler>,
        prepend: bool,
    ) -> Result<(), PipelineError>;

    fn add_capability(
        &mut self,
        capability: Arc<dyn Capability>,
        prepend: bool,
    ) -> Result<(), PipelineError>;

    fn add_interceptor(
        &mut self,
        interceptor: Arc<dyn Interceptor>,
        prepend: bool,
    ) -> Result<(), PipelineError>;
}

/// Ordered component names of a gateway
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GatewayShape {
    pub handlers: Vec<String>,
    pub capabilities: Vec<String>,
    pub interceptors: Vec<String>,
}

impl GatewayShape {
    /// Human-readable listing
    pub fn to_human(&self) -> String {
        let mut out = String::new();
        for (title, names) in [
            ("handlers", &self.handlers),
            ("capabilities", &self.capabilities),
            ("interceptors", &self.interceptors),
        ] {
            out.push_str(&format!("{} ({}):\n", title, names.len()));
            for (i, name) in names.iter().enumerate() {
                out.push_str(&format!("  {:>2}. {}\n", i + 1, name));
            }
        }
        out
    }
}

/// In-memory gateway holding the assembled chains
#[derive(Debug, Default)]
pub struct Gateway {
    handlers: Vec<Arc<dyn Handler>>,
    capabilities: Vec<Arc<dyn Capability>>,
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl Gateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handler chain, front to back
    pub fn handlers(&self) -> &[Arc<dyn Handler>] {
        &self.handlers
    }

    pub fn capabilities(&self) -> &[Arc<dyn Capability>] {
        &self.capabilities
    }

    pub fn interceptors(&self) -> &[Arc<dyn Interceptor>] {
        &self.interceptors
    }

    /// First handler of concrete type `T`
    pub fn handler<T: 'static>(&self) -> Option<&T> {
        self.handlers.iter().find_map(|h| h.as_any().downcast_ref::<T>())
    }

    /// First capability of concrete type `T`
    pub fn capability<T: 'static>(&self) -> Option<&T> {
        self.capabilities
            .iter()
            .find_map(|c| c.as_any().downcast_ref::<T>())
    }

    pub fn interceptor<T: 'static>(&self) -> Option<&T> {
        self.interceptors
            .iter()
            .find_map(|i| i.as_any().downcast_ref::<T>())
    }

    pub fn shape(&self) -> GatewayShape {
        GatewayShape {
            handlers: self.handlers.iter().map(|h| h.name().to_string()).collect(),
            capabilities: self
                .capabilities
                .iter()
                .map(|c| c.name().to_string())
                .collect(),
            interceptors: self
                .interceptors
                .iter()
                .map(|i| i.name().to_string())
                .collect(),
        }
    }
}

fn insert<T: ?Sized>(chain: &mut Vec<Arc<T>>, item: Arc<T>, prepend: bool) {
    if prepend {
        chain.insert(0, item);
    } else {
        chain.push(item);
    }
}

impl Pipeline for Gateway {
    fn add_handler(
        &mut self,
        handler: Arc<dyn Handler>,
        prepend: bool,
    ) -> Result<(), PipelineError> {
        insert(&mut self.handlers, handler, prepend);
        Ok(())
    }

    fn add_capability(
        &mut self,
        capability: Arc<dyn Capability>,
        prepend: bool,
    ) -> Result<(), PipelineError> {
        insert(&mut self.capabilities, capability, prepend);
        Ok(())
    }

    fn add_interceptor(
        &mut self,
        interceptor: Arc<dyn Interceptor>,
        prepend: bool,
    ) -> Result<(), PipelineError> {
        insert(&mut self.interceptors, interceptor, prepend);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::any::Any;

    #[derive(Debug)]
    struct Named(&'static str);

    impl Handler for Named {
        fn name(&self) -> &str {
            self.0
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn test_prepend_inserts_at_head() {
        let mut gateway = Gateway::new();
        gateway.add_handler(Arc::new(Named("a")), false).unwrap();
        gateway.add_handler(Arc::new(Named("b")), false).unwrap();
        gateway.add_handler(Arc::new(Named("c")), true).unwrap();

        assert_eq!(gateway.shape().handlers, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_handler_downcast() {
        let mut gateway = Gateway::new();
        gateway.add_handler(Arc::new(Named("a")), false).unwrap();

        assert_eq!(gateway.handler::<Named>().map(|n| n.0), Some("a"));
        assert!(gateway.capabilities().is_empty());
    }

    #[test]
    fn test_shape_to_human() {
        let shape = GatewayShape {
            handlers: vec!["capture".to_string()],
            capabilities: vec![],
            interceptors: vec!["cycle".to_string()],
        };
        let text = shape.to_human();

        assert!(text.contains("handlers (1):"));
        assert!(text.contains("1. capture"));
        assert!(text.contains("capabilities (0):"));
    }
}
