//! flotilla-core: application manifest loading
//!
//! This crate parses a declarative YAML manifest describing the services,
//! bindings, configuration, secrets, volumes, and ingress rules of a
//! multi-service application into a validated configuration model, and
//! resolves the inline `${provider:argument}` tokens embedded in
//! configuration values at load time.
//!
//! # Example
//!
//! ```rust
//! use flotilla_core::ManifestLoader;
//!
//! let yaml = r#"
//! name: shop
//! services:
//!   - name: api
//!     configuration:
//!       - name: db
//!         value: pw123
//!       - name: conn
//!         value: "server=db;password=${secret:db}"
//! "#;
//!
//! let app = ManifestLoader::from_str(yaml, "flotilla.yaml").load().unwrap();
//! assert_eq!(app.services[0].configuration[1].value, "server=db;password=pw123");
//! ```

pub mod error;
pub mod keyvault;
pub mod model;
pub mod name;
pub mod node;
pub mod secrets;
pub mod tokens;

mod body;
mod loader;

pub use error::{Error, ErrorKind, Result, SourceLocation, TokenErrorKind};
pub use loader::ManifestLoader;
pub use model::{
    Application, ConfigurationEntry, Ingress, IngressBinding, IngressRule, Secret, Service,
    ServiceBinding, Volume,
};
pub use node::{Node, NodeKind};
pub use tokens::{ProviderRegistry, TokenContext, TokenProvider};
