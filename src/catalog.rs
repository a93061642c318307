// SPDX-License-Identifier: MIT
//
// GLAZE-CORE — Material / Recipe / Constraint Catalog
// Plain data structures plus JSON hydration. The chemistry and solver
// modules consume these; they never read files or strings themselves.

use crate::chemistry::oxides::canonicalize;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A raw ceramic material: weight-percent oxide analysis plus loss on
/// ignition. Identified by the key it sits under in the catalog map.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Material {
    #[serde(default)]
    pub name: String,
    /// Weight percent lost on firing.
    #[serde(default)]
    pub loi: f64,
    #[serde(default)]
    pub analysis: BTreeMap<String, f64>,
}

/// Material catalog keyed by id. BTreeMap keeps iteration deterministic,
/// which in turn keeps solves reproducible for identical inputs.
pub type MaterialCatalog = BTreeMap<String, Material>;

/// One entry of a recipe: either bare parts, or the structured form
/// carrying an "additional" flag (for colorants added on top of 100).
/// The core consumes only the numeric amount.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecipeEntry {
    Parts(f64),
    Detailed {
        amount: f64,
        #[serde(default, rename = "add")]
        additional: bool,
    },
}

impl RecipeEntry {
    pub fn amount(&self) -> f64 {
        match self {
            RecipeEntry::Parts(p) => *p,
            RecipeEntry::Detailed { amount, .. } => *amount,
        }
    }
}

/// A named recipe as stored in a recipe document, with an optional
/// precomputed UMF.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RecipeDoc {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub materials: BTreeMap<String, RecipeEntry>,
    #[serde(default)]
    pub umf: Option<crate::chemistry::umf::Umf>,
}

impl RecipeDoc {
    /// Flatten entries down to plain parts, the only shape the core uses.
    pub fn parts(&self) -> BTreeMap<String, f64> {
        self.materials
            .iter()
            .map(|(id, entry)| (id.clone(), entry.amount()))
            .collect()
    }
}

/// Per-material percentage bounds, in [0, 100].
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct MaterialBounds {
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

impl MaterialBounds {
    /// A material is pinned to an exact percentage iff `min` is present
    /// and equals `max` (with `max` defaulting to 100 when absent).
    pub fn is_fixed(&self) -> bool {
        matches!(self.min, Some(m) if m == self.max.unwrap_or(100.0))
    }
}

pub type ConstraintMap = BTreeMap<String, MaterialBounds>;

/// Hydrate a material catalog from JSON. Accepts either a bare id→material
/// map or a document wrapped in a top-level `materials` key. Oxide symbols
/// in each analysis are canonicalized; names default to the material id.
pub fn materials_from_json(json: &str) -> Result<MaterialCatalog, serde_json::Error> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    let body = match value.get("materials") {
        Some(inner) => inner.clone(),
        None => value,
    };
    let raw: BTreeMap<String, Material> = serde_json::from_value(body)?;

    let mut catalog = MaterialCatalog::new();
    for (id, mut mat) in raw {
        if mat.name.is_empty() {
            mat.name = id.clone();
        }
        mat.analysis = mat
            .analysis
            .iter()
            .map(|(ox, wt)| (canonicalize(ox), *wt))
            .collect();
        catalog.insert(id, mat);
    }
    Ok(catalog)
}

/// Hydrate recipes from JSON (a document with a top-level `recipes` key,
/// or a bare id→recipe map). UMF oxide symbols are canonicalized.
pub fn recipes_from_json(json: &str) -> Result<BTreeMap<String, RecipeDoc>, serde_json::Error> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    let body = match value.get("recipes") {
        Some(inner) => inner.clone(),
        None => value,
    };
    let raw: BTreeMap<String, RecipeDoc> = serde_json::from_value(body)?;

    let mut recipes = BTreeMap::new();
    for (id, mut doc) in raw {
        if doc.name.is_empty() {
            doc.name = id.clone();
        }
        if let Some(umf) = doc.umf.take() {
            doc.umf = Some(umf.canonicalized());
        }
        recipes.insert(id, doc);
    }
    Ok(recipes)
}

/// Hydrate a constraint map from JSON (bare id→{min,max} map).
pub fn constraints_from_json(json: &str) -> Result<ConstraintMap, serde_json::Error> {
    serde_json::from_str(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_materials_hydration_canonicalizes_and_defaults() {
        let doc = json!({
            "materials": {
                "custer_feldspar": {
                    "name": "Custer Feldspar",
                    "loi": 0.15,
                    "analysis": { "sio2": 68.5, "al2o3": 18.2, "K2O": 10.0 }
                },
                "silica": { "analysis": { "SiO2": 100.0 } }
            }
        });
        let catalog = materials_from_json(&doc.to_string()).unwrap();
        assert_eq!(catalog.len(), 2);
        let feldspar = &catalog["custer_feldspar"];
        assert_eq!(feldspar.name, "Custer Feldspar");
        assert_eq!(feldspar.analysis["SiO2"], 68.5);
        assert_eq!(feldspar.analysis["Al2O3"], 18.2);
        // Name defaults to the id, loi defaults to zero
        let silica = &catalog["silica"];
        assert_eq!(silica.name, "silica");
        assert_eq!(silica.loi, 0.0);
    }

    #[test]
    fn test_materials_hydration_bare_map() {
        let doc = json!({ "whiting": { "analysis": { "cao": 56.0 } } });
        let catalog = materials_from_json(&doc.to_string()).unwrap();
        assert_eq!(catalog["whiting"].analysis["CaO"], 56.0);
    }

    #[test]
    fn test_recipe_entry_both_shapes() {
        let doc = json!({
            "recipes": {
                "clear": {
                    "materials": {
                        "silica": 30,
                        "cobalt_carb": { "amount": 1.5, "add": true }
                    }
                }
            }
        });
        let recipes = recipes_from_json(&doc.to_string()).unwrap();
        let parts = recipes["clear"].parts();
        assert_eq!(parts["silica"], 30.0);
        assert_eq!(parts["cobalt_carb"], 1.5);
    }

    #[test]
    fn test_bounds_fixed_detection() {
        let pinned = MaterialBounds { min: Some(50.0), max: Some(50.0) };
        assert!(pinned.is_fixed());
        // min present, max absent: max defaults to 100
        let pinned_full = MaterialBounds { min: Some(100.0), max: None };
        assert!(pinned_full.is_fixed());
        let ranged = MaterialBounds { min: Some(20.0), max: Some(50.0) };
        assert!(!ranged.is_fixed());
        assert!(!MaterialBounds::default().is_fixed());
    }
}
