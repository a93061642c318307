// SPDX-License-Identifier: MIT
//
// GLAZE-CORE — GlazeKernel: Unified Rust/WASM Chemistry Orchestrator
//
// This module centralizes ALL glaze chemistry computation.
// TypeScript should call ONLY this module, not individual engines.
// All marshalling happens in Rust: JSON strings in, JSON strings out.

use crate::blend::{generate_blends, BlendPoint};
use crate::catalog::{
    constraints_from_json, materials_from_json, MaterialCatalog, RecipeDoc, RecipeEntry,
};
use crate::chemistry::cte::calculate_cte;
use crate::chemistry::oxides::FluxPreset;
use crate::chemistry::umf::{recipe_to_umf, Umf};
use crate::solver::{solve_umf_match, Solution};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use wasm_bindgen::prelude::*;

#[derive(Serialize, Deserialize)]
pub struct SolveResponse {
    /// `None` when the target is unreachable under the given constraints.
    pub result: Option<Solution>,
    pub compute_time_ms: f64,
}

#[derive(Serialize, Deserialize)]
pub struct BlendResponse {
    pub blends: Vec<BlendPoint>,
    pub compute_time_ms: f64,
}

#[wasm_bindgen]
pub struct GlazeKernel;

#[wasm_bindgen]
impl GlazeKernel {
    /// Compute the UMF of a recipe against a material catalog.
    ///
    /// # Arguments
    /// * `recipe_json` - bare id→parts map, or a document with a
    ///   `materials` key (entries may be plain numbers or
    ///   `{"amount": n, "add": bool}`)
    /// * `materials_json` - material catalog (bare map or wrapped in
    ///   `materials`)
    /// * `extended_flux` - include colorant fluxes in the unity group
    ///
    /// # Returns
    /// JSON UMF `{"flux": {...}, "other": {...}}`, or a JSON error object
    /// if parsing fails.
    #[wasm_bindgen]
    pub fn recipe_umf(recipe_json: &str, materials_json: &str, extended_flux: bool) -> String {
        let (recipe, materials) = match Self::hydrate(recipe_json, materials_json) {
            Ok(pair) => pair,
            Err(e) => return Self::error_json(&e),
        };

        let umf = recipe_to_umf(&recipe, &materials, Self::preset(extended_flux));
        serde_json::to_string(&umf).unwrap_or_default()
    }

    /// Main entry point: find a recipe matching a target UMF.
    ///
    /// The target may be a UMF document (`flux`/`other` keys) or a recipe
    /// document (`materials` key), in which case its UMF is computed
    /// first. `constraints_json` is a per-material `{"min": %, "max": %}`
    /// map; pass an empty string for unconstrained solves.
    ///
    /// # Returns
    /// JSON `{"result": Solution|null, "compute_time_ms": f64}`. A null
    /// result means no recipe satisfies the target and constraints; that
    /// is an answer, not an error. A JSON error object is returned only
    /// when an input fails to parse.
    #[wasm_bindgen]
    pub fn solve(
        target_json: &str,
        materials_json: &str,
        constraints_json: &str,
        extended_flux: bool,
    ) -> String {
        let materials = match materials_from_json(materials_json) {
            Ok(m) => m,
            Err(e) => return Self::error_json(&format!("failed to hydrate materials: {}", e)),
        };
        let preset = Self::preset(extended_flux);
        let target = match Self::load_target_umf(target_json, &materials, preset) {
            Ok(t) => t,
            Err(e) => return Self::error_json(&e),
        };
        let constraints = if constraints_json.trim().is_empty() {
            None
        } else {
            match constraints_from_json(constraints_json) {
                Ok(c) => Some(c),
                Err(e) => {
                    return Self::error_json(&format!("failed to hydrate constraints: {}", e))
                }
            }
        };

        let start = instant::Instant::now();
        let result = solve_umf_match(&target, &materials, constraints.as_ref(), preset);
        let response = SolveResponse {
            result,
            compute_time_ms: start.elapsed().as_secs_f64() * 1000.0,
        };

        serde_json::to_string(&response).unwrap_or_default()
    }

    /// Estimate the thermal expansion of a recipe.
    ///
    /// # Returns
    /// JSON `{"cte": f64, "contributions": [...]}` with the per-oxide
    /// breakdown sorted by magnitude, or a JSON error object.
    #[wasm_bindgen]
    pub fn cte(recipe_json: &str, materials_json: &str) -> String {
        let (recipe, materials) = match Self::hydrate(recipe_json, materials_json) {
            Ok(pair) => pair,
            Err(e) => return Self::error_json(&e),
        };

        let result = calculate_cte(&recipe, &materials);
        serde_json::to_string(&result).unwrap_or_default()
    }

    /// Generate an n-axial blend grid from corner recipes.
    ///
    /// # Arguments
    /// * `corners_json` - JSON array of recipe documents (`name` +
    ///   `materials`), 2 for a line blend, 3 for triaxial, and so on
    /// * `steps` - divisions along each edge (floored at 2)
    #[wasm_bindgen]
    pub fn blends(
        corners_json: &str,
        materials_json: &str,
        steps: usize,
        extended_flux: bool,
    ) -> String {
        let materials = match materials_from_json(materials_json) {
            Ok(m) => m,
            Err(e) => return Self::error_json(&format!("failed to hydrate materials: {}", e)),
        };
        let corners: Vec<RecipeDoc> = match serde_json::from_str(corners_json) {
            Ok(c) => c,
            Err(e) => return Self::error_json(&format!("failed to hydrate corners: {}", e)),
        };

        let corner_recipes: Vec<BTreeMap<String, f64>> =
            corners.iter().map(|c| c.parts()).collect();
        let corner_names: Vec<String> = corners.iter().map(|c| c.name.clone()).collect();

        let start = instant::Instant::now();
        let blends = generate_blends(
            &corner_recipes,
            &corner_names,
            steps,
            &materials,
            Self::preset(extended_flux),
        );
        let response = BlendResponse {
            blends,
            compute_time_ms: start.elapsed().as_secs_f64() * 1000.0,
        };

        serde_json::to_string(&response).unwrap_or_default()
    }
}

/// Pure Rust Implementation (Non-WASM-Bindgen)
impl GlazeKernel {
    fn preset(extended_flux: bool) -> FluxPreset {
        if extended_flux {
            FluxPreset::Extended
        } else {
            FluxPreset::Traditional
        }
    }

    fn error_json(message: &str) -> String {
        serde_json::to_string(&serde_json::json!({ "error": message })).unwrap_or_default()
    }

    /// Hydrate a recipe plus catalog pair, the common prelude of the
    /// per-recipe endpoints.
    fn hydrate(
        recipe_json: &str,
        materials_json: &str,
    ) -> Result<(BTreeMap<String, f64>, MaterialCatalog), String> {
        let recipe = Self::parse_recipe(recipe_json)
            .map_err(|e| format!("failed to hydrate recipe: {}", e))?;
        let materials = materials_from_json(materials_json)
            .map_err(|e| format!("failed to hydrate materials: {}", e))?;
        Ok((recipe, materials))
    }

    /// A recipe document (`materials` key) or a bare id→entry map, flattened
    /// to plain parts.
    fn parse_recipe(json: &str) -> Result<BTreeMap<String, f64>, serde_json::Error> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        if value.get("materials").is_some() {
            let doc: RecipeDoc = serde_json::from_value(value)?;
            return Ok(doc.parts());
        }
        let entries: BTreeMap<String, RecipeEntry> = serde_json::from_value(value)?;
        Ok(entries
            .iter()
            .map(|(id, entry)| (id.clone(), entry.amount()))
            .collect())
    }

    /// The solve target may arrive as a UMF document or as a recipe whose
    /// UMF becomes the target.
    fn load_target_umf(
        target_json: &str,
        materials: &MaterialCatalog,
        preset: FluxPreset,
    ) -> Result<Umf, String> {
        let value: serde_json::Value = serde_json::from_str(target_json)
            .map_err(|e| format!("failed to hydrate target: {}", e))?;

        if value.get("materials").is_some() {
            let doc: RecipeDoc = serde_json::from_value(value)
                .map_err(|e| format!("failed to hydrate target recipe: {}", e))?;
            return Ok(recipe_to_umf(&doc.parts(), materials, preset));
        }

        Umf::from_json(target_json).map_err(|e| format!("failed to hydrate target UMF: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn materials_json() -> String {
        json!({
            "custer_feldspar": {
                "name": "Custer Feldspar",
                "loi": 0.15,
                "analysis": { "SiO2": 68.5, "Al2O3": 18.2, "K2O": 10.0 }
            },
            "silica": { "analysis": { "SiO2": 100.0 } },
            "whiting": { "loi": 44.0, "analysis": { "CaO": 56.0 } }
        })
        .to_string()
    }

    #[test]
    fn test_recipe_umf_roundtrip() {
        let recipe = json!({ "custer_feldspar": 40, "silica": 30, "whiting": 20 }).to_string();
        let out = GlazeKernel::recipe_umf(&recipe, &materials_json(), false);
        let umf: Umf = serde_json::from_str(&out).unwrap();
        let flux_sum: f64 = umf.flux.values().sum();
        assert!((flux_sum - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_recipe_umf_accepts_document_form() {
        let recipe = json!({
            "name": "Clear Base",
            "materials": {
                "silica": 30,
                "whiting": { "amount": 20.0 }
            }
        })
        .to_string();
        let out = GlazeKernel::recipe_umf(&recipe, &materials_json(), false);
        let umf: Umf = serde_json::from_str(&out).unwrap();
        assert!(umf.flux.contains_key("CaO"));
    }

    #[test]
    fn test_solve_returns_result_and_timing() {
        let target = json!({
            "flux": { "K2O": 0.26, "CaO": 0.74 },
            "other": { "SiO2": 3.70, "Al2O3": 0.35 }
        })
        .to_string();
        let out = GlazeKernel::solve(&target, &materials_json(), "", false);
        let response: SolveResponse = serde_json::from_str(&out).unwrap();
        let solution = response.result.expect("scenario is solvable");
        assert!(!solution.recipe.is_empty());
        assert!(response.compute_time_ms >= 0.0);
    }

    #[test]
    fn test_solve_recipe_target_self_match() {
        // Using a recipe as target, the solver should land on a recipe
        // whose UMF matches that recipe's own UMF
        let target = json!({
            "materials": { "custer_feldspar": 40, "silica": 35, "whiting": 25 }
        })
        .to_string();
        let out = GlazeKernel::solve(&target, &materials_json(), "", false);
        let response: SolveResponse = serde_json::from_str(&out).unwrap();
        let solution = response.result.expect("self-match is solvable");
        for err in solution.error.values() {
            assert!(err.abs() < 0.05, "residual {}", err);
        }
    }

    #[test]
    fn test_solve_infeasible_constraints_null_result() {
        let target = json!({
            "flux": { "K2O": 0.26, "CaO": 0.74 },
            "other": { "SiO2": 3.70 }
        })
        .to_string();
        let constraints = json!({
            "custer_feldspar": { "min": 60.0, "max": 60.0 },
            "whiting": { "min": 50.0, "max": 50.0 }
        })
        .to_string();
        let out = GlazeKernel::solve(&target, &materials_json(), &constraints, false);
        let response: SolveResponse = serde_json::from_str(&out).unwrap();
        assert!(response.result.is_none());
    }

    #[test]
    fn test_malformed_input_yields_error_object() {
        let out = GlazeKernel::recipe_umf("not json", &materials_json(), false);
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert!(value.get("error").is_some());

        let out = GlazeKernel::solve("{\"flux\": {}}", "also not json", "", false);
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert!(value.get("error").is_some());
    }

    #[test]
    fn test_cte_endpoint() {
        let recipe = json!({ "silica": 100 }).to_string();
        let out = GlazeKernel::cte(&recipe, &materials_json());
        let result: crate::chemistry::cte::CteResult = serde_json::from_str(&out).unwrap();
        assert!((result.cte - 3.5).abs() < 1e-9);
    }

    #[test]
    fn test_blends_endpoint_line_blend() {
        let corners = json!([
            { "name": "A", "materials": { "silica": 100 } },
            { "name": "B", "materials": { "whiting": 100 } }
        ])
        .to_string();
        let out = GlazeKernel::blends(&corners, &materials_json(), 3, false);
        let response: BlendResponse = serde_json::from_str(&out).unwrap();
        assert_eq!(response.blends.len(), 3);
        let midpoint = response
            .blends
            .iter()
            .find(|b| b.name == "2")
            .expect("midpoint present");
        assert!((midpoint.recipe["silica"] - 50.0).abs() < 1e-9);
        assert!((midpoint.recipe["whiting"] - 50.0).abs() < 1e-9);
    }
}
