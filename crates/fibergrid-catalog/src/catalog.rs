//! Container descriptors and host-capability queries.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use fiber_core::Implementation;

use crate::error::CatalogError;

/// An execution target capable of hosting workers. Its global ordinal is
/// its position in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Container {
    pub name: String,
    /// Execution model the container runs, e.g. "proc" or "fpga".
    pub model: String,
    pub platform: String,
}

impl Container {
    /// Whether this container can host the implementation. Models must
    /// match; an implementation with an empty platform runs on any
    /// platform of its model.
    pub fn can_host(&self, imp: &Implementation) -> bool {
        self.model == imp.model && (imp.platform.is_empty() || self.platform == imp.platform)
    }
}

/// Read-only catalog queries consumed by the planner.
pub trait ContainerCatalog {
    /// All containers, in ordinal order.
    fn containers(&self) -> &[Container];

    /// Ordinals of containers able to host `imp`, optionally restricted
    /// to a single named container.
    fn find_containers(&self, imp: &Implementation, name_filter: Option<&str>) -> Vec<usize> {
        self.containers()
            .iter()
            .enumerate()
            .filter(|(_, c)| c.can_host(imp))
            .filter(|(_, c)| name_filter.is_none_or(|n| c.name == n))
            .map(|(ordinal, _)| ordinal)
            .collect()
    }
}

/// Catalog backed by a plain container list, loadable from TOML:
///
/// ```toml
/// [[containers]]
/// name = "rcc0"
/// model = "proc"
/// platform = "linux-x86_64"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct InMemoryCatalog {
    containers: Vec<Container>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_containers(containers: Vec<Container>) -> Self {
        Self { containers }
    }

    /// Register a container and return its global ordinal.
    pub fn add(&mut self, container: Container) -> usize {
        let ordinal = self.containers.len();
        debug!(name = %container.name, model = %container.model, ordinal, "container registered");
        self.containers.push(container);
        ordinal
    }

    pub fn from_toml_str(s: &str) -> Result<Self, CatalogError> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }
}

impl ContainerCatalog for InMemoryCatalog {
    fn containers(&self) -> &[Container] {
        &self.containers
    }
}
