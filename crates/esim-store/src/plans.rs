//! Plan catalog.
//!
//! Purchasable plan definitions, loaded from a YAML file when one is
//! configured and falling back to a small builtin set otherwise. The
//! catalog supplies the metadata (label, quota, validity) a synthesized
//! profile is built from.

use std::path::Path;

use serde::{Deserialize, Serialize};

use esim_core::EsimError;

/// Longest validity a catalog may sell, one century in days.
const MAX_PLAN_DURATION_DAYS: i64 = 36_500;

/// One purchasable plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanDef {
    /// Three-digit id embedded in synthesized identifiers.
    pub plan_id: u16,
    pub label: String,
    pub country_code: String,
    /// Display quota string, e.g. "5 GB".
    pub quota: String,
    pub duration_days: i64,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    plans: Vec<PlanDef>,
}

#[derive(Debug, Clone)]
pub struct PlanCatalog {
    plans: Vec<PlanDef>,
}

impl PlanCatalog {
    /// Builtin plans used when no catalog file is configured.
    pub fn builtin() -> Self {
        let plan = |plan_id, label: &str, country_code: &str, quota: &str, duration_days| PlanDef {
            plan_id,
            label: label.to_string(),
            country_code: country_code.to_string(),
            quota: quota.to_string(),
            duration_days,
        };
        Self {
            plans: vec![
                plan(1, "Traveler 1GB", "US", "1 GB", 7),
                plan(2, "Traveler 5GB", "US", "5 GB", 30),
                plan(3, "Island Hopper 3GB", "JP", "3 GB", 15),
                plan(4, "Euro Roam 10GB", "FR", "10 GB", 30),
                plan(5, "Global 5GB", "WW", "5 GB", 30),
            ],
        }
    }

    /// Load a catalog from YAML text. An empty catalog is an error; a store
    /// without plans cannot honor an add. Plan validity must fall in
    /// `1..=MAX_PLAN_DURATION_DAYS` so downstream expiry arithmetic stays
    /// in range.
    pub fn from_yaml(text: &str) -> Result<Self, EsimError> {
        let file: CatalogFile =
            serde_yaml::from_str(text).map_err(|e| EsimError::Catalog(e.to_string()))?;
        if file.plans.is_empty() {
            return Err(EsimError::Catalog("catalog has no plans".to_string()));
        }
        for plan in &file.plans {
            if !(1..=MAX_PLAN_DURATION_DAYS).contains(&plan.duration_days) {
                return Err(EsimError::Catalog(format!(
                    "plan {} has invalid duration_days {}",
                    plan.plan_id, plan.duration_days
                )));
            }
        }
        Ok(Self { plans: file.plans })
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self, EsimError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| EsimError::Catalog(format!("{}: {e}", path.display())))?;
        Self::from_yaml(&text)
    }

    pub fn find(&self, plan_id: u16) -> Option<&PlanDef> {
        self.plans.iter().find(|p| p.plan_id == plan_id)
    }

    /// Plans sold for a country, matched case-insensitively.
    pub fn for_country(&self, country_code: &str) -> Vec<&PlanDef> {
        let wanted = country_code.trim();
        self.plans
            .iter()
            .filter(|p| p.country_code.eq_ignore_ascii_case(wanted))
            .collect()
    }

    pub fn plans(&self) -> &[PlanDef] {
        &self.plans
    }
}

impl Default for PlanCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
