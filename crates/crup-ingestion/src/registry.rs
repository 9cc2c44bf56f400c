//! Ordered registry of research domains.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crup_common::{CrupError, Domain, Result};

/// Turn a display name into a domain id: trim, lowercase, and collapse every
/// whitespace run into a single hyphen.
pub fn normalize_domain_id(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

/// A configured starting domain. `id` defaults to the normalised name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DomainSeed {
    pub id: Option<String>,
    pub name: String,
}

impl DomainSeed {
    pub fn new(id: Option<&str>, name: &str) -> Self {
        Self { id: id.map(str::to_string), name: name.to_string() }
    }

    /// Physics, Biology, Engineering, Materials Science.
    pub fn defaults() -> Vec<DomainSeed> {
        vec![
            DomainSeed::new(None, "Physics"),
            DomainSeed::new(None, "Biology"),
            DomainSeed::new(None, "Engineering"),
            DomainSeed::new(Some("materials"), "Materials Science"),
        ]
    }
}

#[derive(Debug, Clone, Default)]
pub struct DomainRegistry {
    domains: Vec<Domain>,
}

impl DomainRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from seeds; invalid or colliding seeds are skipped.
    pub fn with_seeds(seeds: &[DomainSeed]) -> Self {
        let mut registry = Self::new();
        for seed in seeds {
            let id = seed.id.clone().unwrap_or_else(|| normalize_domain_id(&seed.name));
            if let Err(e) = registry.insert(Domain::new(id, seed.name.trim())) {
                warn!(seed = %seed.name, error = %e, "Skipping domain seed");
            }
        }
        registry
    }

    /// Register a domain from a free-text name.
    pub fn add(&mut self, name: &str) -> Result<Domain> {
        let id = normalize_domain_id(name);
        let domain = Domain::new(id, name.trim());
        self.insert(domain.clone())?;
        Ok(domain)
    }

    /// Register a domain with an explicit id. The id must already be in normal form.
    pub fn insert(&mut self, domain: Domain) -> Result<()> {
        if domain.id.is_empty() || normalize_domain_id(&domain.id) != domain.id {
            return Err(CrupError::InvalidDomainName(domain.id));
        }
        if self.contains(&domain.id) {
            return Err(CrupError::DuplicateDomainId(domain.id));
        }
        debug!(id = %domain.id, name = %domain.name, "Domain registered");
        self.domains.push(domain);
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> Result<Domain> {
        let pos = self
            .domains
            .iter()
            .position(|d| d.id == id)
            .ok_or_else(|| CrupError::DomainNotFound(id.to_string()))?;
        Ok(self.domains.remove(pos))
    }

    pub fn get(&self, id: &str) -> Option<&Domain> {
        self.domains.iter().find(|d| d.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Domains in insertion order.
    pub fn list(&self) -> &[Domain] {
        &self.domains
    }

    pub fn ids(&self) -> Vec<String> {
        self.domains.iter().map(|d| d.id.clone()).collect()
    }
}
