//! Template loading for paygate.
//!
//! Templates are addressed by name. A name of the form `@Namespace/path`
//! selects a registered namespace; any other name is looked up in the main
//! namespace. Rendering is left to the caller: the engine only locates and
//! reads template sources.

mod engine;
mod error;
mod loader;

pub use engine::TemplateEngine;
pub use error::TemplateError;
pub use loader::{parse_name, FilesystemLoader, LoaderChain, TemplateLoader, MAIN_NAMESPACE};
