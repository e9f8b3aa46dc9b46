//! Template loaders
//!
//! - `TemplateLoader`: resolves a template name to a file
//! - `FilesystemLoader`: namespace -> directories registry
//! - `LoaderChain`: tries several loaders in order

use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::error::TemplateError;

/// Namespace used for names without an `@Namespace/` prefix
pub const MAIN_NAMESPACE: &str = "__main__";

/// Resolves template names to template sources
pub trait TemplateLoader: Send + Sync + fmt::Debug {
    /// Locate the file backing `name`
    fn find(&self, name: &str) -> Result<PathBuf, TemplateError>;

    /// Whether `name` can be located
    fn exists(&self, name: &str) -> bool {
        self.find(name).is_ok()
    }

    /// Read the source of `name`
    fn load(&self, name: &str) -> Result<String, TemplateError> {
        let path = self.find(name)?;
        fs::read_to_string(&path).map_err(|source| TemplateError::Io { path, source })
    }

    /// Downcast hook for chains
    fn as_chain(&self) -> Option<&LoaderChain> {
        None
    }
}

/// Split a template name into (namespace, relative path).
///
/// `@Shop/layout.html` yields `("Shop", "layout.html")`; `layout.html` yields
/// `(MAIN_NAMESPACE, "layout.html")`. Parent-directory segments are rejected.
pub fn parse_name(name: &str) -> Result<(&str, &str), TemplateError> {
    let (namespace, rest) = match name.strip_prefix('@') {
        Some(stripped) => match stripped.split_once('/') {
            Some((ns, rest)) if !ns.is_empty() && !rest.is_empty() => (ns, rest),
            _ => return Err(TemplateError::InvalidName(name.to_string())),
        },
        None => (MAIN_NAMESPACE, name),
    };

    if rest.is_empty()
        || Path::new(rest)
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::RootDir))
    {
        return Err(TemplateError::InvalidName(name.to_string()));
    }

    Ok((namespace, rest))
}

/// Loader backed by directories registered per namespace.
///
/// Registration goes through `&self`, so a loader handed out behind an `Arc`
/// can still be filled in.
#[derive(Debug, Default)]
pub struct FilesystemLoader {
    paths: RwLock<IndexMap<String, Vec<PathBuf>>>,
}

impl FilesystemLoader {
    /// Create an empty loader
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `path` to the search list of `namespace`.
    ///
    /// Returns false if the path was already registered for that namespace.
    pub fn add_path(&self, path: impl Into<PathBuf>, namespace: &str) -> bool {
        let path = path.into();
        let mut paths = self.paths.write();
        let entry = paths.entry(namespace.to_string()).or_default();
        if entry.contains(&path) {
            tracing::debug!(namespace, path = %path.display(), "template path already registered");
            return false;
        }
        tracing::debug!(namespace, path = %path.display(), "registered template path");
        entry.push(path);
        true
    }

    /// Search list for a namespace
    pub fn paths(&self, namespace: &str) -> Vec<PathBuf> {
        self.paths
            .read()
            .get(namespace)
            .cloned()
            .unwrap_or_default()
    }
}

impl TemplateLoader for FilesystemLoader {
    fn find(&self, name: &str) -> Result<PathBuf, TemplateError> {
        let (namespace, rest) = parse_name(name)?;
        let paths = self.paths.read();
        let dirs = paths
            .get(namespace)
            .ok_or_else(|| TemplateError::NotFound(name.to_string()))?;

        dirs.iter()
            .map(|dir| dir.join(rest))
            .find(|candidate| candidate.is_file())
            .ok_or_else(|| TemplateError::NotFound(name.to_string()))
    }
}

/// Tries each loader in order; the first one that finds the template wins.
///
/// An optional fallback is consulted after every other loader. Rebuilding a
/// chain with [`LoaderChain::with_fallback`] replaces the fallback instead of
/// nesting chains.
#[derive(Debug, Clone, Default)]
pub struct LoaderChain {
    loaders: Vec<Arc<dyn TemplateLoader>>,
    fallback: Option<Arc<dyn TemplateLoader>>,
}

impl LoaderChain {
    pub fn new(loaders: Vec<Arc<dyn TemplateLoader>>) -> Self {
        Self {
            loaders,
            fallback: None,
        }
    }

    /// Chain `primary` in front of `fallback`.
    ///
    /// If `primary` is itself a chain its loaders are taken over flat and its
    /// fallback, if any, is dropped in favor of the new one.
    pub fn with_fallback(
        primary: Arc<dyn TemplateLoader>,
        fallback: Arc<dyn TemplateLoader>,
    ) -> Self {
        let flattened = primary.as_chain().map(|chain| chain.loaders.clone());
        let loaders = flattened.unwrap_or_else(|| vec![primary]);
        Self {
            loaders,
            fallback: Some(fallback),
        }
    }

    pub fn loaders(&self) -> &[Arc<dyn TemplateLoader>] {
        &self.loaders
    }

    pub fn fallback(&self) -> Option<&Arc<dyn TemplateLoader>> {
        self.fallback.as_ref()
    }
}

impl TemplateLoader for LoaderChain {
    fn as_chain(&self) -> Option<&LoaderChain> {
        Some(self)
    }

    fn find(&self, name: &str) -> Result<PathBuf, TemplateError> {
        for loader in self.loaders.iter().chain(self.fallback.iter()) {
            match loader.find(name) {
                Ok(path) => return Ok(path),
                Err(TemplateError::NotFound(_)) => continue,
                Err(e) => return Err(e),
            }
        }
        Err(TemplateError::NotFound(name.to_string()))
    }
}
