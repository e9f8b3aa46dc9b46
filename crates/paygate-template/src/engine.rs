//! Template engine
//!
//! The engine owns a swappable loader. Callers share an engine through
//! `Arc<TemplateEngine>`; replacing the loader is visible to every holder.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::TemplateError;
use crate::loader::TemplateLoader;

/// Template engine holding the active loader
#[derive(Debug)]
pub struct TemplateEngine {
    loader: RwLock<Arc<dyn TemplateLoader>>,
}

impl TemplateEngine {
    pub fn new(loader: Arc<dyn TemplateLoader>) -> Self {
        Self {
            loader: RwLock::new(loader),
        }
    }

    /// Current loader
    pub fn loader(&self) -> Arc<dyn TemplateLoader> {
        self.loader.read().clone()
    }

    /// Replace the loader
    pub fn set_loader(&self, loader: Arc<dyn TemplateLoader>) {
        *self.loader.write() = loader;
    }

    /// Read the source of a template through the current loader
    pub fn source(&self, name: &str) -> Result<String, TemplateError> {
        self.loader().load(name)
    }

    pub fn exists(&self, name: &str) -> bool {
        self.loader().exists(name)
    }
}
