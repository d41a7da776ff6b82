//! The application configuration model
//!
//! Produced by the loader, consumed by whatever runs or deploys the
//! application. Every collection defaults to empty at construction, so a
//! field that is absent from the document and one that is present but
//! empty read identically downstream.

use std::path::PathBuf;

use serde::Serialize;

/// A fully loaded application manifest
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    /// Application name, lower-cased; inferred from the source path when
    /// the document omits it
    pub name: String,
    /// Path the manifest was loaded from
    pub source: PathBuf,
    pub services: Vec<Service>,
    pub ingress: Vec<Ingress>,
    pub secrets: Vec<Secret>,
}

impl Application {
    /// Create an empty application for the given source path
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            name: String::new(),
            source: source.into(),
            services: Vec::new(),
            ingress: Vec::new(),
            secrets: Vec::new(),
        }
    }
}

/// A deployable unit of the application
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub name: String,
    /// Container image to run, if this is a container service
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Executable to launch, if this is a process service
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executable: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replicas: Option<u32>,
    /// An external service is described but not launched
    pub external: bool,
    pub bindings: Vec<ServiceBinding>,
    pub configuration: Vec<ConfigurationEntry>,
    pub volumes: Vec<Volume>,
    pub tags: Vec<String>,
}

impl Service {
    /// Create a service with the given name and empty collections
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image: None,
            executable: None,
            args: None,
            replicas: None,
            external: false,
            bindings: Vec::new(),
            configuration: Vec::new(),
            volumes: Vec::new(),
            tags: Vec::new(),
        }
    }
}

/// A network binding exposed by a service
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceBinding {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
}

/// A named configuration value attached to a service
///
/// `value` has a two-phase lifecycle: raw as parsed from the document,
/// then rewritten in place by the token substitution pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigurationEntry {
    pub name: String,
    pub value: String,
}

impl ConfigurationEntry {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A named reference to an externally stored secret
///
/// `value` is populated by a secret-resolution collaborator after loading,
/// never by the loader itself.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Secret {
    pub name: String,
    pub source: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// An application-facing ingress entity
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ingress {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replicas: Option<u32>,
    pub bindings: Vec<IngressBinding>,
    pub rules: Vec<IngressRule>,
    pub tags: Vec<String>,
}

impl Ingress {
    /// Create an ingress with the given name and empty collections
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            replicas: None,
            bindings: Vec::new(),
            rules: Vec::new(),
            tags: Vec::new(),
        }
    }
}

/// A network binding exposed by an ingress
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngressBinding {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
}

/// A routing rule mapping host/path prefixes to a service
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngressRule {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
}

/// A volume mounted into a service
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Volume {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
}
