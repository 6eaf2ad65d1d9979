//! Engine configuration.

use ludics_interaction::DEFAULT_FUEL;
use ludics_locus::Locus;

/// Default cap on forward-chaining passes.
pub const DEFAULT_CHAIN_ITERATION_CAP: usize = 256;

/// Configuration for an [`Engine`](crate::Engine).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Fuel for stepper runs that do not name their own.
    pub default_fuel: u32,

    /// Maximum forward-chaining passes per `interact_ce` call. Independent
    /// of stepper fuel.
    pub chain_iteration_cap: usize,

    /// Root locus that compiled designs start from.
    pub root: Locus,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_fuel: DEFAULT_FUEL,
            chain_iteration_cap: DEFAULT_CHAIN_ITERATION_CAP,
            root: Locus::root(),
        }
    }
}

impl EngineConfig {
    /// Set the default stepper fuel.
    #[must_use]
    pub fn with_default_fuel(mut self, fuel: u32) -> Self {
        self.default_fuel = fuel;
        self
    }

    /// Set the forward-chaining pass cap.
    #[must_use]
    pub fn with_chain_iteration_cap(mut self, cap: usize) -> Self {
        self.chain_iteration_cap = cap;
        self
    }

    /// Set the root locus for compiled designs.
    #[must_use]
    pub fn with_root(mut self, root: Locus) -> Self {
        self.root = root;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.default_fuel, 2048);
        assert_eq!(config.chain_iteration_cap, 256);
        assert_eq!(config.root.to_string(), "0");
    }

    #[test]
    fn builders_override() {
        let config = EngineConfig::default()
            .with_default_fuel(8)
            .with_chain_iteration_cap(3)
            .with_root(Locus::parse("1").unwrap());
        assert_eq!(config.default_fuel, 8);
        assert_eq!(config.chain_iteration_cap, 3);
        assert_eq!(config.root.to_string(), "1");
    }
}
