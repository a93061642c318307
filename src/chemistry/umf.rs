// SPDX-License-Identifier: MIT
//
// GLAZE-CORE — UMF Converter
// Weight-percent analyses → unity molecular formula (flux moles sum to 1).

use crate::catalog::{Material, MaterialCatalog};
use crate::chemistry::oxides::{canonicalize, molecular_weight, FluxPreset};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Unity Molecular Formula: molar oxide ratios normalized so the flux
/// group sums to 1. Zero-ratio oxides are omitted from both groups.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Umf {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub flux: BTreeMap<String, f64>,
    #[serde(default)]
    pub other: BTreeMap<String, f64>,
}

impl Umf {
    /// Merge flux and other into a single oxide→ratio map. Flux entries
    /// are applied first, so "other" wins if both groups define an oxide.
    pub fn flattened(&self) -> BTreeMap<String, f64> {
        let mut flat = BTreeMap::new();
        for (ox, val) in &self.flux {
            flat.insert(ox.clone(), *val);
        }
        for (ox, val) in &self.other {
            flat.insert(ox.clone(), *val);
        }
        flat
    }

    /// Rebuild with canonical oxide symbols in both groups.
    pub fn canonicalized(&self) -> Umf {
        Umf {
            name: self.name.clone(),
            flux: self
                .flux
                .iter()
                .map(|(ox, v)| (canonicalize(ox), *v))
                .collect(),
            other: self
                .other
                .iter()
                .map(|(ox, v)| (canonicalize(ox), *v))
                .collect(),
        }
    }

    pub fn from_json(json: &str) -> Result<Umf, serde_json::Error> {
        let umf: Umf = serde_json::from_str(json)?;
        Ok(umf.canonicalized())
    }
}

/// Moles of each oxide per 100 g of raw material. Oxide symbols are
/// canonicalized; oxides outside the molecular-weight table are skipped.
pub fn material_moles(material: &Material) -> BTreeMap<String, f64> {
    let mut moles = BTreeMap::new();
    for (oxide, weight_pct) in &material.analysis {
        let oxide = canonicalize(oxide);
        if let Some(mw) = molecular_weight(&oxide) {
            *moles.entry(oxide).or_insert(0.0) += weight_pct / mw;
        }
    }
    moles
}

/// Compute the UMF of a recipe (material id → parts) against a catalog.
///
/// Parts are unitless relative weights; the result is invariant to
/// uniform rescaling of all parts. When the flux-group mole total is
/// zero, 1.0 is substituted as the divisor: a convention that yields
/// zero flux ratios instead of a division failure, not a real
/// normalization.
///
/// # Panics
/// If the recipe references a material id absent from the catalog. That
/// is upstream data corruption, not a search outcome.
pub fn recipe_to_umf(
    recipe: &BTreeMap<String, f64>,
    materials: &MaterialCatalog,
    flux_oxides: FluxPreset,
) -> Umf {
    let mut total_moles: BTreeMap<String, f64> = BTreeMap::new();

    for (mat_id, parts) in recipe {
        let mat = materials
            .get(mat_id)
            .unwrap_or_else(|| panic!("material '{}' referenced by recipe is not in the catalog", mat_id));
        for (oxide, moles) in material_moles(mat) {
            *total_moles.entry(oxide).or_insert(0.0) += moles * parts / 100.0;
        }
    }

    let mut flux_total: f64 = flux_oxides
        .oxides()
        .iter()
        .map(|ox| total_moles.get(*ox).copied().unwrap_or(0.0))
        .sum();
    if flux_total == 0.0 {
        flux_total = 1.0; // degenerate-case convention, see doc comment
    }

    let mut flux = BTreeMap::new();
    let mut other = BTreeMap::new();
    for (oxide, moles) in &total_moles {
        let ratio = moles / flux_total;
        if ratio > 0.0 {
            if flux_oxides.contains(oxide) {
                flux.insert(oxide.clone(), ratio);
            } else {
                other.insert(oxide.clone(), ratio);
            }
        }
    }

    Umf { name: None, flux, other }
}
