//! # Bonding Rules Module
//!
//! Element-pair bonding rules consulted when molecules are constructed or atoms
//! are placed. A rule supplies the equilibrium length baked into a new
//! [`Bond`](crate::core::models::topology::Bond) and the maximum distance at which
//! two elements are considered able to bond. The dynamics step never queries
//! these rules.
//!
//! ## Key Components
//!
//! - [`standard`] - Built-in, compile-time rule table for common light elements
//! - [`table`] - Rule tables loaded from CSV files
//!
//! Lookups are symmetric in the two elements. When several rules exist for a
//! pair (single, double, triple), the first listed one is used.

pub mod standard;
pub mod table;

pub use standard::StandardBondingRules;
pub use table::{BondingRuleTable, RuleLoadError};

use crate::core::models::topology::BondOrder;

/// Equilibrium length used for element pairs without a rule, in Angstroms.
pub const DEFAULT_BOND_LENGTH: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BondingRule {
    pub order: BondOrder,
    /// Ideal (equilibrium) bond length in Angstroms.
    pub ideal_length: f64,
    /// Largest separation at which the two elements may bond, in Angstroms.
    pub max_distance: f64,
}

/// Source of bonding rules for element pairs.
pub trait BondingRules {
    /// All rules for an element pair, in priority order. Empty if none.
    fn rules_for(&self, element1: &str, element2: &str) -> &[BondingRule];

    fn rule(&self, element1: &str, element2: &str) -> Option<&BondingRule> {
        self.rules_for(element1, element2).first()
    }

    /// Equilibrium length for a new bond, falling back to [`DEFAULT_BOND_LENGTH`].
    fn ideal_length(&self, element1: &str, element2: &str) -> f64 {
        self.rule(element1, element2)
            .map_or(DEFAULT_BOND_LENGTH, |rule| rule.ideal_length)
    }

    /// Whether the elements can bond at `distance`. Pairs without a rule never bond.
    fn can_bond(&self, element1: &str, element2: &str, distance: f64) -> bool {
        self.rule(element1, element2)
            .is_some_and(|rule| distance <= rule.max_distance)
    }
}

/// Canonical `"A-B"` key for an element pair, with the symbols in lexical order.
pub(crate) fn element_pair_key(element1: &str, element2: &str) -> String {
    if element1 <= element2 {
        format!("{element1}-{element2}")
    } else {
        format!("{element2}-{element1}")
    }
}
