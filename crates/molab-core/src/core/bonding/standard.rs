use super::{BondingRule, BondingRules, element_pair_key};
use crate::core::models::topology::BondOrder;
use crate::core::models::topology::BondOrder::{Double, Single, Triple};
use phf::phf_map;

const fn rule(order: BondOrder, ideal_length: f64, max_distance: f64) -> BondingRule {
    BondingRule {
        order,
        ideal_length,
        max_distance,
    }
}

// Keys are element pairs in lexical order (see `element_pair_key`).
static STANDARD_RULES: phf::Map<&'static str, &'static [BondingRule]> = phf_map! {
    "H-H" => &[rule(Single, 0.74, 1.2)],
    "C-H" => &[rule(Single, 1.09, 1.5)],
    "H-N" => &[rule(Single, 1.01, 1.4)],
    "H-O" => &[rule(Single, 0.96, 1.3)],
    "F-H" => &[rule(Single, 0.92, 1.2)],
    "C-C" => &[rule(Single, 1.54, 2.0), rule(Double, 1.34, 1.8), rule(Triple, 1.20, 1.6)],
    "C-N" => &[rule(Single, 1.47, 1.9), rule(Double, 1.29, 1.7), rule(Triple, 1.16, 1.5)],
    "C-O" => &[rule(Single, 1.43, 1.8), rule(Double, 1.20, 1.6)],
    "N-N" => &[rule(Single, 1.45, 1.9), rule(Double, 1.25, 1.7), rule(Triple, 1.10, 1.4)],
    "N-O" => &[rule(Single, 1.36, 1.8), rule(Double, 1.22, 1.6)],
    "O-O" => &[rule(Single, 1.48, 1.9), rule(Double, 1.21, 1.6)],
};

/// The built-in bonding rules for H, C, N, O and F.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardBondingRules;

impl StandardBondingRules {
    /// Every `(pair key, rules)` entry of the built-in table, sorted by pair key.
    pub fn entries() -> Vec<(&'static str, &'static [BondingRule])> {
        let mut entries: Vec<_> = STANDARD_RULES
            .entries()
            .map(|(key, rules)| (*key, *rules))
            .collect();
        entries.sort_by_key(|(key, _)| *key);
        entries
    }
}

impl BondingRules for StandardBondingRules {
    fn rules_for(&self, element1: &str, element2: &str) -> &[BondingRule] {
        STANDARD_RULES
            .get(element_pair_key(element1, element2).as_str())
            .copied()
            .unwrap_or(&[])
    }
}
