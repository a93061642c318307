// SPDX-License-Identifier: MIT
//
// GLAZE-CORE — N-Axial Blends
// Simplex-lattice blend points across recipe corners: line blends (2),
// triaxial (3), quadraxial (4), and beyond.

use crate::catalog::MaterialCatalog;
use crate::chemistry::oxides::FluxPreset;
use crate::chemistry::umf::{recipe_to_umf, Umf};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One point of a blend grid.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BlendPoint {
    /// Grid coordinate name, e.g. "3" (line) or "1-2-3" (quadraxial).
    pub name: String,
    pub fractions: Vec<f64>,
    pub corner_names: Vec<String>,
    pub recipe: BTreeMap<String, f64>,
    pub umf: Umf,
}

/// All blend points for `n_corners` corners with `steps` divisions along
/// each edge. Fractions of every point sum to 1.0; the first corner
/// starts at 100%. `steps` below 2 is coerced to 2.
///
/// `simplex_lattice(2, 3)` → `[[1.0, 0.0], [0.5, 0.5], [0.0, 1.0]]`.
pub fn simplex_lattice(n_corners: usize, steps: usize) -> Vec<Vec<f64>> {
    let steps = steps.max(2);
    let divisions = steps - 1;

    let mut partitions = Vec::new();
    let mut current = Vec::with_capacity(n_corners);
    collect_partitions(divisions, n_corners, &mut current, &mut partitions);

    partitions
        .into_iter()
        .map(|p| {
            p.iter()
                .rev()
                .map(|&count| count as f64 / divisions as f64)
                .collect()
        })
        .collect()
}

// All compositions of `total` into `parts` non-negative integers.
fn collect_partitions(
    total: usize,
    parts: usize,
    current: &mut Vec<usize>,
    out: &mut Vec<Vec<usize>>,
) {
    if parts == 1 {
        current.push(total);
        out.push(current.clone());
        current.pop();
        return;
    }
    for i in 0..=total {
        current.push(i);
        collect_partitions(total - i, parts - 1, current, out);
        current.pop();
    }
}

/// Grid coordinate name for a blend point. Line blends count positions
/// from the first corner (1 = 100% first, `steps` = 100% second);
/// multi-axial blends join per-corner indices with dashes.
pub fn blend_point_name(fractions: &[f64], steps: usize) -> String {
    let divisions = (steps.max(2) - 1) as f64;

    if fractions.len() == 2 {
        let position = ((1.0 - fractions[0]) * divisions).round() as usize + 1;
        position.to_string()
    } else {
        fractions
            .iter()
            .map(|f| ((f * divisions).round() as usize + 1).to_string())
            .collect::<Vec<_>>()
            .join("-")
    }
}

/// Blend corner recipes by fraction. Each corner is normalized to 100
/// parts first; corners with zero total are skipped.
pub fn blend_recipes(
    corner_recipes: &[BTreeMap<String, f64>],
    fractions: &[f64],
) -> BTreeMap<String, f64> {
    let mut blended: BTreeMap<String, f64> = BTreeMap::new();

    for (recipe, fraction) in corner_recipes.iter().zip(fractions) {
        let total: f64 = recipe.values().sum();
        if total == 0.0 {
            continue;
        }
        for (mat_id, parts) in recipe {
            let contribution = parts / total * 100.0 * fraction;
            if contribution > 0.0 {
                *blended.entry(mat_id.clone()).or_insert(0.0) += contribution;
            }
        }
    }

    blended
}

/// Generate every blend point with its recipe and UMF.
pub fn generate_blends(
    corner_recipes: &[BTreeMap<String, f64>],
    corner_names: &[String],
    steps: usize,
    materials: &MaterialCatalog,
    flux_oxides: FluxPreset,
) -> Vec<BlendPoint> {
    let points = simplex_lattice(corner_recipes.len(), steps);

    points
        .into_iter()
        .map(|fractions| {
            let name = blend_point_name(&fractions, steps);
            let recipe = blend_recipes(corner_recipes, &fractions);
            let umf = recipe_to_umf(&recipe, materials, flux_oxides);
            BlendPoint {
                name,
                fractions,
                corner_names: corner_names.to_vec(),
                recipe,
                umf,
            }
        })
        .collect()
}
