//! The upgrade catalog — immutable definitions supplied at startup.
//!
//! RULE: the catalog is validated once at load time and never mutated
//! afterwards. A malformed catalog (bad ratios, dangling or cyclic
//! requirements) is a fatal configuration error, not something the
//! purchase path guesses its way around.

use crate::{
    error::{EconomyError, EconomyResult},
    types::UpgradeId,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A prerequisite for a composite upgrade: the player must own at
/// least `min_count` units of `upgrade_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompositeRequirement {
    pub upgrade_id: UpgradeId,
    pub min_count: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UpgradeCategory {
    Producer,
    Automation,
    Chain,
}

/// One immutable upgrade definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpgradeDefinition {
    pub upgrade_id: UpgradeId,
    pub label: String,
    pub base_cost: f64,
    pub base_income: f64,
    /// Cost growth per owned unit. Must be > 1.
    pub cost_ratio: f64,
    /// Income growth per owned unit. Must be >= 1.
    pub income_ratio: f64,
    pub category: UpgradeCategory,
    #[serde(default)]
    pub requirements: Vec<CompositeRequirement>,
    /// Optional presentation tier (unlock row in the shop UI).
    #[serde(default)]
    pub unlock_tier: Option<u32>,
}

impl UpgradeDefinition {
    /// Composite upgrades gate on prerequisites and feed the unique
    /// item generator on purchase.
    pub fn is_composite(&self) -> bool {
        !self.requirements.is_empty() || self.category == UpgradeCategory::Chain
    }
}

#[derive(Debug, Clone, Deserialize)]
struct CatalogFile {
    upgrades: Vec<UpgradeDefinition>,
}

/// The validated, immutable upgrade catalog.
#[derive(Debug, Clone)]
pub struct UpgradeCatalog {
    defs: HashMap<UpgradeId, UpgradeDefinition>,
    /// Definition order as loaded, for stable iteration.
    order: Vec<UpgradeId>,
}

impl UpgradeCatalog {
    /// Build a catalog from definitions, validating every invariant.
    pub fn new(defs: Vec<UpgradeDefinition>) -> EconomyResult<Self> {
        let mut map = HashMap::with_capacity(defs.len());
        let mut order = Vec::with_capacity(defs.len());

        for def in defs {
            validate_definition(&def)?;
            order.push(def.upgrade_id.clone());
            if map.insert(def.upgrade_id.clone(), def).is_some() {
                let id = order.last().cloned().unwrap_or_default();
                return Err(EconomyError::InvalidDefinition {
                    upgrade_id: id,
                    reason: "duplicate upgrade_id".into(),
                });
            }
        }

        let catalog = Self { defs: map, order };
        catalog.validate_requirements()?;
        catalog.validate_acyclic()?;
        log::debug!("Catalog loaded: {} upgrades", catalog.order.len());
        Ok(catalog)
    }

    /// Load a catalog from its JSON file representation.
    pub fn from_json(json: &str) -> EconomyResult<Self> {
        let file: CatalogFile = serde_json::from_str(json)?;
        Self::new(file.upgrades)
    }

    pub fn get(&self, upgrade_id: &str) -> Option<&UpgradeDefinition> {
        self.defs.get(upgrade_id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Definitions in load order.
    pub fn iter(&self) -> impl Iterator<Item = &UpgradeDefinition> {
        self.order.iter().filter_map(|id| self.defs.get(id))
    }

    /// Every requirement must point at a defined upgrade.
    fn validate_requirements(&self) -> EconomyResult<()> {
        for def in self.iter() {
            for req in &def.requirements {
                if !self.defs.contains_key(&req.upgrade_id) {
                    return Err(EconomyError::UnknownPrerequisite {
                        upgrade_id: def.upgrade_id.clone(),
                        prerequisite: req.upgrade_id.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// DFS three-color cycle check over the requirement graph.
    fn validate_acyclic(&self) -> EconomyResult<()> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            White,
            Grey,
            Black,
        }

        fn visit(
            id: &str,
            defs: &HashMap<UpgradeId, UpgradeDefinition>,
            marks: &mut HashMap<UpgradeId, Mark>,
        ) -> EconomyResult<()> {
            match marks.get(id).copied().unwrap_or(Mark::White) {
                Mark::Black => return Ok(()),
                Mark::Grey => {
                    return Err(EconomyError::CyclicRequirements {
                        upgrade_id: id.to_string(),
                    })
                }
                Mark::White => {}
            }
            marks.insert(id.to_string(), Mark::Grey);
            if let Some(def) = defs.get(id) {
                for req in &def.requirements {
                    visit(&req.upgrade_id, defs, marks)?;
                }
            }
            marks.insert(id.to_string(), Mark::Black);
            Ok(())
        }

        let mut marks = HashMap::new();
        for id in &self.order {
            visit(id, &self.defs, &mut marks)?;
        }
        Ok(())
    }

    /// The tuned default ladder used by the runner and tests.
    pub fn standard() -> Self {
        let defs = vec![
            producer("auto_clicker", "Auto Clicker", 15.0, 0.1),
            producer("workshop", "Workshop", 100.0, 1.0),
            producer("forge", "Forge", 1_100.0, 8.0),
            producer("mine", "Deep Mine", 12_000.0, 47.0),
            producer("foundry", "Foundry", 130_000.0, 260.0),
            UpgradeDefinition {
                upgrade_id: "assembly_line".into(),
                label: "Assembly Line".into(),
                base_cost: 500_000.0,
                base_income: 1_400.0,
                cost_ratio: 1.2,
                income_ratio: 1.02,
                category: UpgradeCategory::Chain,
                requirements: vec![
                    CompositeRequirement {
                        upgrade_id: "forge".into(),
                        min_count: 10,
                    },
                    CompositeRequirement {
                        upgrade_id: "foundry".into(),
                        min_count: 1,
                    },
                ],
                unlock_tier: Some(2),
            },
            UpgradeDefinition {
                upgrade_id: "megaplex".into(),
                label: "Megaplex".into(),
                base_cost: 4_000_000.0,
                base_income: 7_800.0,
                cost_ratio: 1.25,
                income_ratio: 1.03,
                category: UpgradeCategory::Chain,
                requirements: vec![CompositeRequirement {
                    upgrade_id: "assembly_line".into(),
                    min_count: 3,
                }],
                unlock_tier: Some(3),
            },
        ];
        // The built-in ladder is known-good; a panic here is a bug in
        // this function, not a runtime condition.
        Self::new(defs).expect("standard catalog is valid")
    }
}

fn producer(id: &str, label: &str, base_cost: f64, base_income: f64) -> UpgradeDefinition {
    UpgradeDefinition {
        upgrade_id: id.into(),
        label: label.into(),
        base_cost,
        base_income,
        cost_ratio: 1.15,
        income_ratio: 1.0,
        category: UpgradeCategory::Producer,
        requirements: Vec::new(),
        unlock_tier: None,
    }
}

fn validate_definition(def: &UpgradeDefinition) -> EconomyResult<()> {
    let fail = |reason: &str| {
        Err(EconomyError::InvalidDefinition {
            upgrade_id: def.upgrade_id.clone(),
            reason: reason.into(),
        })
    };
    if def.upgrade_id.is_empty() {
        return fail("empty upgrade_id");
    }
    if !(def.base_cost.is_finite() && def.base_cost > 0.0) {
        return fail("base_cost must be finite and positive");
    }
    if !(def.base_income.is_finite() && def.base_income >= 0.0) {
        return fail("base_income must be finite and non-negative");
    }
    if !(def.cost_ratio.is_finite() && def.cost_ratio > 1.0) {
        return fail("cost_ratio must be > 1");
    }
    if !(def.income_ratio.is_finite() && def.income_ratio >= 1.0) {
        return fail("income_ratio must be >= 1");
    }
    Ok(())
}
