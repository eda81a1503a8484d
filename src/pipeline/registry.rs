//! Marketplace program registry

use std::collections::HashMap;

use crate::config::default_marketplaces;

/// Immutable program address -> marketplace display name mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketplaceRegistry {
    programs: HashMap<String, String>,
}

impl MarketplaceRegistry {
    pub fn new(programs: HashMap<String, String>) -> Self {
        Self { programs }
    }

    /// Display name for a program address
    pub fn lookup(&self, program: &str) -> Option<&str> {
        self.programs.get(program).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }
}

impl Default for MarketplaceRegistry {
    fn default() -> Self {
        Self::new(default_marketplaces())
    }
}
