//! Manifest loading
//!
//! `ManifestLoader` wraps a manifest's text and origin path, parses the
//! text into the generic node tree, and assembles the configuration model:
//! body parse, name inference, then in-place token substitution over every
//! service's configuration values. The first error aborts the whole load;
//! there is no partial-result mode.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::body;
use crate::error::{Error, Result, SourceLocation};
use crate::model::Application;
use crate::name;
use crate::node::Node;
use crate::tokens::{self, ProviderRegistry, TokenContext};

/// Loads one application manifest
///
/// Only the first document of a multi-document source is consulted; any
/// further documents are ignored. This is a documented limitation, not an
/// error.
#[derive(Debug)]
pub struct ManifestLoader {
    text: String,
    source: PathBuf,
}

impl ManifestLoader {
    /// Create a loader for an in-memory manifest with the given origin path
    ///
    /// The origin path is recorded on the model and drives name inference;
    /// the file behind it is never opened.
    pub fn from_str(text: impl Into<String>, origin: impl Into<PathBuf>) -> Self {
        Self {
            text: text.into(),
            source: origin.into(),
        }
    }

    /// Create a loader by reading the manifest file at `path`
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::io(format!("Failed to read '{}': {}", path.display(), e))
                .with_source_location(SourceLocation {
                    file: path.display().to_string(),
                    line: None,
                    column: None,
                })
        })?;

        Ok(Self {
            text,
            source: path.to_path_buf(),
        })
    }

    /// Load the manifest into a fully assembled application
    pub fn load(&self) -> Result<Application> {
        self.load_with_providers(&ProviderRegistry::with_builtins())
    }

    /// Load the manifest, resolving tokens through a custom registry
    pub fn load_with_providers(&self, registry: &ProviderRegistry) -> Result<Application> {
        let root = self.parse_root()?;
        let mapping = root.expect_mapping()?;

        let mut app = Application::new(&self.source);
        body::parse_application(mapping, &mut app)?;

        if app.name.is_empty() {
            app.name = name::infer_application_name(&self.source);
            log::debug!(
                "manifest has no name, inferred '{}' from {}",
                app.name,
                self.source.display()
            );
        }

        for (si, service) in app.services.iter_mut().enumerate() {
            for ci in 0..service.configuration.len() {
                let ctx = TokenContext {
                    service: &service.name,
                    entries: &service.configuration,
                };
                let rewritten = tokens::substitute(&service.configuration[ci].value, registry, &ctx)
                    .map_err(|e| {
                        e.in_segment(format!("services[{}].configuration[{}]", si, ci))
                    })?;
                service.configuration[ci].value = rewritten;
            }
        }

        log::debug!(
            "loaded application '{}': {} services, {} ingress, {} secrets",
            app.name,
            app.services.len(),
            app.ingress.len(),
            app.secrets.len()
        );

        Ok(app)
    }

    /// Parse the first document of the source into a node tree
    fn parse_root(&self) -> Result<Node> {
        let mut documents = serde_yaml::Deserializer::from_str(&self.text);
        let first = documents.next().ok_or_else(|| {
            Error::syntax("manifest contains no YAML documents")
                .with_source_location(self.location(None))
        })?;

        let value =
            serde_yaml::Value::deserialize(first).map_err(|e| self.syntax_error(e))?;

        Node::from_yaml(value).map_err(|e| match e.source_location {
            Some(_) => e,
            None => e.with_source_location(self.location(None)),
        })
    }

    fn syntax_error(&self, err: serde_yaml::Error) -> Error {
        let location = err.location();
        let message = err.to_string();
        Error::syntax(message).with_source_location(
            self.location(location.map(|l| (l.line(), l.column()))),
        )
    }

    fn location(&self, line_column: Option<(usize, usize)>) -> SourceLocation {
        SourceLocation {
            file: self.source.display().to_string(),
            line: line_column.map(|(line, _)| line),
            column: line_column.map(|(_, column)| column),
        }
    }
}
