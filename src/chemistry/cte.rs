// SPDX-License-Identifier: MIT
//
// GLAZE-CORE — Thermal Expansion
// Weighted-sum CTE estimate from fired oxide weight percentages.
// Coefficients from West & Gerrow, "Ceramic Science for the Potter",
// as used by Digitalfire and Glazy. Result in 1e-6/°C.

use crate::catalog::MaterialCatalog;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// CTE coefficient on a weight-percent basis, or `None` for oxides with
/// no published factor (they contribute nothing).
pub fn cte_coefficient(oxide: &str) -> Option<f64> {
    let coef = match oxide {
        // Primary oxides - West & Gerrow
        "SiO2" => 0.035,
        "Al2O3" => 0.063,
        "Na2O" => 0.390,
        "K2O" => 0.331,
        "CaO" => 0.148,
        "MgO" => 0.030,
        "Fe2O3" => 0.130,
        "TiO2" => 0.140,
        "ZrO2" => 0.020,
        // Boron reduces expansion
        "B2O3" => -0.065,
        // Lithium, derived from Appen molar factors
        "Li2O" => 0.320,
        // Estimated from Appen and other sources
        "ZnO" => 0.070,
        "BaO" => 0.100,
        "SrO" => 0.120,
        "PbO" => 0.130,
        "MnO" => 0.100,
        "CoO" => 0.050,
        "CuO" => 0.030,
        "NiO" => 0.050,
        "SnO2" => 0.020,
        "Bi2O3" => 0.100,
        _ => return None,
    };
    Some(coef)
}

/// One oxide's share of the total expansion.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CteContribution {
    pub oxide: String,
    pub weight_pct: f64,
    pub coefficient: f64,
    pub contribution: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CteResult {
    /// Total CTE in 1e-6/°C.
    pub cte: f64,
    /// Per-oxide breakdown, sorted by |contribution| descending.
    pub contributions: Vec<CteContribution>,
}

/// Fired-basis oxide weight percentages of a recipe, normalized to 100.
/// LOI leaves the fired body, so only oxide contributions are counted.
/// Returns an empty map when the fired weight is zero.
///
/// # Panics
/// If the recipe references a material id absent from the catalog.
pub fn recipe_to_oxide_pct(
    recipe: &BTreeMap<String, f64>,
    materials: &MaterialCatalog,
) -> BTreeMap<String, f64> {
    let mut total_oxides: BTreeMap<String, f64> = BTreeMap::new();

    for (mat_id, parts) in recipe {
        let mat = materials
            .get(mat_id)
            .unwrap_or_else(|| panic!("material '{}' referenced by recipe is not in the catalog", mat_id));
        for (oxide, pct) in &mat.analysis {
            *total_oxides.entry(oxide.clone()).or_insert(0.0) += parts * pct / 100.0;
        }
    }

    let fired_weight: f64 = total_oxides.values().sum();
    if fired_weight == 0.0 {
        return BTreeMap::new();
    }

    total_oxides
        .into_iter()
        .map(|(ox, val)| (ox, val / fired_weight * 100.0))
        .collect()
}

/// Calculate the coefficient of thermal expansion for a glaze recipe.
pub fn calculate_cte(recipe: &BTreeMap<String, f64>, materials: &MaterialCatalog) -> CteResult {
    let oxide_pct = recipe_to_oxide_pct(recipe, materials);

    let mut contributions = Vec::new();
    let mut total_cte = 0.0;

    for (oxide, pct) in oxide_pct {
        if let Some(coefficient) = cte_coefficient(&oxide) {
            let contribution = pct * coefficient;
            total_cte += contribution;
            contributions.push(CteContribution {
                oxide,
                weight_pct: pct,
                coefficient,
                contribution,
            });
        }
    }

    contributions.sort_by(|a, b| {
        b.contribution
            .abs()
            .partial_cmp(&a.contribution.abs())
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    CteResult {
        cte: total_cte,
        contributions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Material;

    fn catalog() -> MaterialCatalog {
        let mut materials = MaterialCatalog::new();
        materials.insert(
            "silica".to_string(),
            Material {
                name: "Silica".to_string(),
                loi: 0.0,
                analysis: [("SiO2".to_string(), 100.0)].into(),
            },
        );
        materials.insert(
            "soda_frit".to_string(),
            Material {
                name: "Soda Frit".to_string(),
                loi: 0.0,
                analysis: [("Na2O".to_string(), 30.0), ("SiO2".to_string(), 70.0)].into(),
            },
        );
        materials
    }

    #[test]
    fn test_pure_silica_cte() {
        // 100% SiO2 → CTE = 100 * 0.035 = 3.5
        let recipe = [("silica".to_string(), 100.0)].into();
        let result = calculate_cte(&recipe, &catalog());
        assert!((result.cte - 3.5).abs() < 1e-9, "got {}", result.cte);
        assert_eq!(result.contributions.len(), 1);
    }

    #[test]
    fn test_oxide_pct_normalizes_to_fired_basis() {
        // Equal parts: oxides blend to 15% Na2O / 85% SiO2 of fired weight
        let recipe = [("silica".to_string(), 50.0), ("soda_frit".to_string(), 50.0)].into();
        let pct = recipe_to_oxide_pct(&recipe, &catalog());
        assert!((pct["Na2O"] - 15.0).abs() < 1e-9);
        assert!((pct["SiO2"] - 85.0).abs() < 1e-9);
        assert!((pct.values().sum::<f64>() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_contributions_sorted_by_magnitude() {
        // Na2O: 15 * 0.390 = 5.85 dominates SiO2: 85 * 0.035 = 2.975
        let recipe = [("silica".to_string(), 50.0), ("soda_frit".to_string(), 50.0)].into();
        let result = calculate_cte(&recipe, &catalog());
        assert_eq!(result.contributions[0].oxide, "Na2O");
        assert!((result.cte - (5.85 + 2.975)).abs() < 1e-9);
    }

    #[test]
    fn test_empty_recipe_zero_cte() {
        let recipe = BTreeMap::new();
        let result = calculate_cte(&recipe, &catalog());
        assert_eq!(result.cte, 0.0);
        assert!(result.contributions.is_empty());
    }
}
