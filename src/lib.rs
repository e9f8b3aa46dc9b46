//! paygate - payment gateway factory
//!
//! Builds a gateway (a chain of handlers, capabilities and interceptors) from
//! a declarative configuration mapping. Values in the mapping are either
//! concrete components or providers evaluated once during the build.
//!
//! ```no_run
//! use paygate::{ConfigMap, GatewayFactory};
//!
//! let factory = GatewayFactory::new();
//! let gateway = factory
//!     .create(ConfigMap::new().with("gateway.template.layout", "@Shop/layout.html"))
//!     .unwrap();
//! println!("{}", gateway.shape().to_human());
//! ```

pub mod assembler;
pub mod classifier;
pub mod config;
pub mod currency;
pub mod error;
pub mod factory;
pub mod gateway;
pub mod handlers;
pub mod security;
pub mod transport;

pub use classifier::{classify, Classification, ClassifyError};
pub use config::{ConfigMap, ConfigValue, Provider, ProviderContext, ProviderError, ResolvedConfig};
pub use error::{FactoryError, FactoryResult};
pub use factory::GatewayFactory;
pub use gateway::{
    Capability, EntryKind, Gateway, GatewayShape, Handler, Interceptor, Pipeline, PipelineError,
};
