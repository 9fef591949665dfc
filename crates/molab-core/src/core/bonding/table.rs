use super::{BondingRule, BondingRules, StandardBondingRules, element_pair_key};
use crate::core::models::topology::BondOrder;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum RuleLoadError {
    #[error("CSV parsing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
    #[error("Invalid bonding rule in '{path}' for {pair}: {reason}")]
    InvalidRule {
        path: String,
        pair: String,
        reason: String,
    },
}

#[derive(Debug, Deserialize)]
struct RuleRecord {
    element1: String,
    element2: String,
    order: String,
    ideal_length: f64,
    max_distance: f64,
}

/// A bonding-rule table held in memory, typically loaded from CSV.
///
/// The CSV layout is `element1,element2,order,ideal_length,max_distance`, one
/// rule per row. Row order is the priority order within a pair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BondingRuleTable {
    rules: BTreeMap<String, Vec<BondingRule>>,
}

impl BondingRuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of the built-in rules, as an editable table.
    pub fn standard() -> Self {
        let rules = StandardBondingRules::entries()
            .into_iter()
            .map(|(key, rules)| (key.to_string(), rules.to_vec()))
            .collect();
        Self { rules }
    }

    pub fn from_csv(path: &Path) -> Result<Self, RuleLoadError> {
        let path_str = path.to_string_lossy().to_string();
        let reader = csv::Reader::from_path(path).map_err(|e| RuleLoadError::Csv {
            path: path_str.clone(),
            source: e,
        })?;
        let table = Self::from_csv_reader(reader, &path_str)?;
        debug!(
            "Loaded {} bonding rule(s) for {} element pair(s) from '{}'.",
            table.rule_count(),
            table.rules.len(),
            path_str
        );
        Ok(table)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, RuleLoadError> {
        Self::from_csv_reader(csv::Reader::from_reader(reader), "<reader>")
    }

    fn from_csv_reader<R: Read>(
        mut reader: csv::Reader<R>,
        path: &str,
    ) -> Result<Self, RuleLoadError> {
        let mut table = Self::new();
        for result in reader.deserialize::<RuleRecord>() {
            let record = result.map_err(|e| RuleLoadError::Csv {
                path: path.to_string(),
                source: e,
            })?;
            let pair = element_pair_key(record.element1.trim(), record.element2.trim());
            let invalid = |reason: String| RuleLoadError::InvalidRule {
                path: path.to_string(),
                pair: pair.clone(),
                reason,
            };

            let order: BondOrder = record
                .order
                .trim()
                .parse()
                .map_err(|_| invalid(format!("unknown bond order '{}'", record.order)))?;
            if !record.ideal_length.is_finite() || record.ideal_length < 0.0 {
                return Err(invalid(format!(
                    "ideal length must be a non-negative number, got {}",
                    record.ideal_length
                )));
            }
            if !record.max_distance.is_finite() || record.max_distance < 0.0 {
                return Err(invalid(format!(
                    "maximum distance must be a non-negative number, got {}",
                    record.max_distance
                )));
            }

            table.insert(
                record.element1.trim(),
                record.element2.trim(),
                BondingRule {
                    order,
                    ideal_length: record.ideal_length,
                    max_distance: record.max_distance,
                },
            );
        }
        Ok(table)
    }

    /// Appends a rule for a pair, after any rules already present for it.
    pub fn insert(&mut self, element1: &str, element2: &str, rule: BondingRule) {
        self.rules
            .entry(element_pair_key(element1, element2))
            .or_default()
            .push(rule);
    }

    /// Iterates `(pair key, rules)` in pair-key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[BondingRule])> {
        self.rules
            .iter()
            .map(|(key, rules)| (key.as_str(), rules.as_slice()))
    }

    pub fn rule_count(&self) -> usize {
        self.rules.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl BondingRules for BondingRuleTable {
    fn rules_for(&self, element1: &str, element2: &str) -> &[BondingRule] {
        self.rules
            .get(&element_pair_key(element1, element2))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
