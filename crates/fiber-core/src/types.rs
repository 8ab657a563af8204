//! Domain types for the fibergrid planner.
//!
//! These types describe the planning inputs: component implementations,
//! deployment candidates, application instances, and the port wiring
//! between them. Everything is serializable so application graphs can be
//! written as TOML documents and plans emitted as JSON.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::error::ConfigError;

/// Identifier of a prebuilt artifact — a bitstream or shared object that
/// bundles the implementations of several instances.
pub type ArtifactId = u32;

/// Implementation ordinals are tracked per artifact in a single 64-bit
/// booking mask, so an artifact holds at most this many implementations.
pub const MAX_ARTIFACT_IMPLS: u32 = 64;

/// A compiled worker binary for a component spec.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Implementation {
    pub name: String,
    /// Execution model tag, e.g. "proc" or "fpga".
    pub model: String,
    /// Platform the implementation was built for, e.g. "linux-x86_64".
    /// Empty means the implementation runs on any platform of its model.
    #[serde(default)]
    pub platform: String,
    /// Declared ports, in declaration order.
    #[serde(default)]
    pub ports: Vec<String>,
    /// Position of this implementation inside its owning artifact.
    #[serde(default)]
    pub ordinal: u32,
}

/// A viable (implementation, artifact) pairing for an instance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Candidate {
    pub implementation: Implementation,
    /// Suitability score, must be >= 1. Higher is better.
    pub score: u32,
    /// Whether the implementation is physically fixed inside its artifact
    /// together with other instances, and thus not freely relocatable.
    #[serde(default)]
    pub exclusive: bool,
    pub artifact: ArtifactId,
}

/// One placed occurrence of a component spec in the application graph.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InstanceSpec {
    pub name: String,
    /// Component spec this instance realizes.
    pub spec: String,
    /// Deployment candidates, in preference order.
    pub candidates: Vec<Candidate>,
}

/// One endpoint of a declared connection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Endpoint {
    /// Index of the instance in declaration order.
    pub instance: usize,
    pub port: String,
}

/// An undirected port-to-port connection between two instances.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Connection {
    pub a: Endpoint,
    pub b: Endpoint,
}

/// The application graph handed to the planner: instances in declaration
/// order plus their port wiring.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AppGraph {
    pub instances: Vec<InstanceSpec>,
    #[serde(default)]
    pub connections: Vec<Connection>,
}

/// TOML document form of the graph. Connections are written as
/// `"instance.port"` strings and resolved to indices on load.
#[derive(Debug, Deserialize)]
struct AppGraphDoc {
    instances: Vec<InstanceSpec>,
    #[serde(default)]
    connections: Vec<RawConnection>,
}

#[derive(Debug, Deserialize)]
struct RawConnection {
    a: String,
    b: String,
}

impl AppGraph {
    /// Parse an application graph document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let doc: AppGraphDoc = toml::from_str(s)?;

        let index_of: HashMap<&str, usize> = doc
            .instances
            .iter()
            .enumerate()
            .map(|(i, inst)| (inst.name.as_str(), i))
            .collect();

        let mut connections = Vec::with_capacity(doc.connections.len());
        for raw in &doc.connections {
            connections.push(Connection {
                a: resolve_endpoint(&raw.a, &index_of)?,
                b: resolve_endpoint(&raw.b, &index_of)?,
            });
        }

        Ok(AppGraph {
            instances: doc.instances,
            connections,
        })
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// The instance wired to `(instance, port)`, if the graph declares one.
    pub fn connected_instance(&self, instance: usize, port: &str) -> Option<usize> {
        self.connections.iter().find_map(|c| {
            if c.a.instance == instance && c.a.port == port {
                Some(c.b.instance)
            } else if c.b.instance == instance && c.b.port == port {
                Some(c.a.instance)
            } else {
                None
            }
        })
    }
}

fn resolve_endpoint(
    raw: &str,
    index_of: &HashMap<&str, usize>,
) -> Result<Endpoint, ConfigError> {
    let (name, port) = raw
        .split_once('.')
        .ok_or_else(|| ConfigError::MalformedEndpoint(raw.to_string()))?;
    let instance = *index_of
        .get(name)
        .ok_or_else(|| ConfigError::UnknownInstance(name.to_string()))?;
    Ok(Endpoint {
        instance,
        port: port.to_string(),
    })
}
