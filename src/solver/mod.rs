// SPDX-License-Identifier: MIT
//
// GLAZE-CORE — Recipe Matcher
// Given a target UMF and a catalog of candidate materials, find blend
// proportions whose UMF approximates the target under per-material
// percentage constraints. Feasibility failures and non-convergence are
// both reported as `None`; callers branch on presence, not on errors.

pub mod engine;

use crate::catalog::{ConstraintMap, MaterialBounds, MaterialCatalog};
use crate::chemistry::oxides::{canonicalize, FluxPreset};
use crate::chemistry::umf::{material_moles, recipe_to_umf, Umf};
use engine::{EngineConfig, UmfProblem};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Variable fractions below this are dropped from the final recipe
/// (noise allocations under 0.1 parts per 100).
const DROP_THRESHOLD: f64 = 0.001;

/// A matched recipe with its recomputed UMF and per-oxide error.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Solution {
    /// Material id → parts, summing to 100 (less any dropped noise
    /// allocations).
    pub recipe: BTreeMap<String, f64>,
    pub umf: Umf,
    /// Signed difference result − target, over the union of oxides
    /// appearing in either.
    pub error: BTreeMap<String, f64>,
    pub selected: Vec<String>,
}

/// How a constraint resolves for one material: pinned to an exact
/// fraction, or free within a bounded range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MaterialRole {
    Fixed(f64),
    Variable { lo: f64, hi: f64 },
}

impl MaterialRole {
    pub fn from_bounds(bounds: Option<&MaterialBounds>) -> MaterialRole {
        match bounds {
            Some(b) if b.is_fixed() => MaterialRole::Fixed(b.min.unwrap_or(0.0) / 100.0),
            Some(b) => MaterialRole::Variable {
                lo: b.min.unwrap_or(0.0) / 100.0,
                hi: b.max.unwrap_or(100.0) / 100.0,
            },
            None => MaterialRole::Variable { lo: 0.0, hi: 1.0 },
        }
    }
}

/// Materials whose analysis shares at least one oxide with the target's
/// nonzero oxides. Empty means no solution is possible.
pub fn select_candidates(target_umf: &Umf, candidates: &MaterialCatalog) -> Vec<String> {
    let target_oxides: BTreeSet<&String> = target_umf
        .flux
        .iter()
        .chain(target_umf.other.iter())
        .filter(|(_, ratio)| **ratio != 0.0)
        .map(|(ox, _)| ox)
        .collect();

    candidates
        .iter()
        .filter(|(_, mat)| {
            mat.analysis
                .keys()
                .any(|ox| target_oxides.contains(&canonicalize(ox)))
        })
        .map(|(id, _)| id.clone())
        .collect()
}

/// Find proportions of candidate materials matching the target UMF.
///
/// Returns `None` when no candidate contributes a needed oxide, fixed
/// allocations exceed 100%, the constraint box is infeasible, the search
/// fails to converge within its budget, or the assembled recipe is empty.
pub fn solve_umf_match(
    target_umf: &Umf,
    candidates: &MaterialCatalog,
    constraints: Option<&ConstraintMap>,
    flux_oxides: FluxPreset,
) -> Option<Solution> {
    let target_flat = target_umf.flattened();

    let selected = select_candidates(target_umf, candidates);
    if selected.is_empty() {
        return None;
    }

    // Resolve each candidate's role once, up front
    let mut fixed: BTreeMap<String, f64> = BTreeMap::new();
    let mut variable: Vec<(String, f64, f64)> = Vec::new();
    for id in &selected {
        match MaterialRole::from_bounds(constraints.and_then(|c| c.get(id))) {
            MaterialRole::Fixed(frac) => {
                fixed.insert(id.clone(), frac);
            }
            MaterialRole::Variable { lo, hi } => variable.push((id.clone(), lo, hi)),
        }
    }

    let fixed_sum: f64 = fixed.values().sum();
    if fixed_sum > 1.0 {
        return None; // pinned allocations exceed 100%
    }

    if variable.is_empty() {
        // Degenerate single-point case: the recipe is fully determined
        let recipe: BTreeMap<String, f64> =
            fixed.iter().map(|(id, frac)| (id.clone(), frac * 100.0)).collect();
        return Some(assemble(recipe, candidates, flux_oxides, &target_flat));
    }

    // Dense oxide index: sorted union of the flattened target's oxides
    let all_oxides: Vec<String> = target_flat.keys().cloned().collect();
    let n_oxides = all_oxides.len();
    let flux_indices: Vec<usize> = all_oxides
        .iter()
        .enumerate()
        .filter(|(_, ox)| flux_oxides.contains(ox))
        .map(|(i, _)| i)
        .collect();

    let mut fixed_moles: DVector<f64> = DVector::zeros(n_oxides);
    for (id, frac) in &fixed {
        let moles = material_moles(&candidates[id]);
        for (i, ox) in all_oxides.iter().enumerate() {
            fixed_moles[i] += moles.get(ox).copied().unwrap_or(0.0) * frac;
        }
    }

    let mut contributions: DMatrix<f64> = DMatrix::zeros(n_oxides, variable.len());
    for (j, (id, _, _)) in variable.iter().enumerate() {
        let moles = material_moles(&candidates[id]);
        for (i, ox) in all_oxides.iter().enumerate() {
            contributions[(i, j)] = moles.get(ox).copied().unwrap_or(0.0);
        }
    }

    let target = DVector::from_iterator(n_oxides, all_oxides.iter().map(|ox| target_flat[ox]));

    // No single variable material may exceed the unallocated share
    let remaining = 1.0 - fixed_sum;
    let lower: Vec<f64> = variable.iter().map(|(_, lo, _)| *lo).collect();
    let upper: Vec<f64> = variable.iter().map(|(_, _, hi)| hi.min(remaining)).collect();

    let problem = UmfProblem {
        contributions,
        fixed_moles,
        target,
        flux_indices,
        lower,
        upper,
        remaining,
    };
    let x = engine::optimize(&problem, &EngineConfig::default())?;

    let mut recipe: BTreeMap<String, f64> =
        fixed.iter().map(|(id, frac)| (id.clone(), frac * 100.0)).collect();
    for (j, (id, _, _)) in variable.iter().enumerate() {
        if x[j] > DROP_THRESHOLD {
            recipe.insert(id.clone(), x[j] * 100.0);
        }
    }
    if recipe.is_empty() {
        return None;
    }

    Some(assemble(recipe, candidates, flux_oxides, &target_flat))
}

/// Package a recipe into a `Solution`. The UMF is recomputed from the
/// recipe via the converter rather than trusted from the engine's
/// internal normalized vector.
fn assemble(
    recipe: BTreeMap<String, f64>,
    materials: &MaterialCatalog,
    flux_oxides: FluxPreset,
    target_flat: &BTreeMap<String, f64>,
) -> Solution {
    let umf = recipe_to_umf(&recipe, materials, flux_oxides);
    let result_flat = umf.flattened();

    let mut error = BTreeMap::new();
    for oxide in result_flat.keys().chain(target_flat.keys()) {
        let result_val = result_flat.get(oxide).copied().unwrap_or(0.0);
        let target_val = target_flat.get(oxide).copied().unwrap_or(0.0);
        error.insert(oxide.clone(), result_val - target_val);
    }

    let selected = recipe.keys().cloned().collect();
    Solution {
        recipe,
        umf,
        error,
        selected,
    }
}
