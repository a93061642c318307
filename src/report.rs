// SPDX-License-Identifier: MIT
//
// GLAZE-CORE — Plain-Text Reports
// Readable tables for UMF, solutions, CTE, and blend grids. Display
// ordering is decided here, never by the computation modules.

use crate::blend::BlendPoint;
use crate::catalog::MaterialCatalog;
use crate::chemistry::cte::CteResult;
use crate::chemistry::umf::Umf;
use crate::solver::Solution;

/// Format a UMF as a flux/other table with a flux total row.
pub fn format_umf_table(umf: &Umf) -> String {
    let mut lines = Vec::new();

    if let Some(name) = &umf.name {
        lines.push(format!("UMF: {}", name));
        lines.push("-".repeat(30));
    }

    let flux_sum: f64 = umf.flux.values().sum();
    lines.push("Flux:".to_string());
    for (oxide, value) in &umf.flux {
        lines.push(format!("  {:8} {:.3}", oxide, value));
    }
    lines.push(format!("  {:8} {:.3}", "TOTAL", flux_sum));
    lines.push(String::new());
    lines.push("Other:".to_string());
    for (oxide, value) in &umf.other {
        lines.push(format!("  {:8} {:.3}", oxide, value));
    }

    lines.join("\n")
}

/// Format a solver solution: recipe sorted by parts descending, the
/// resulting UMF, and an error section when any oxide misses the target
/// by more than 0.01.
pub fn format_solution(solution: &Solution, materials: &MaterialCatalog) -> String {
    let mut lines = Vec::new();

    lines.push("Recipe:".to_string());
    lines.push("-".repeat(30));
    let mut entries: Vec<(&String, &f64)> = solution.recipe.iter().collect();
    entries.sort_by(|a, b| b.1.partial_cmp(a.1).unwrap_or(std::cmp::Ordering::Equal));
    for (mat_id, parts) in &entries {
        let name = materials
            .get(*mat_id)
            .map(|m| m.name.as_str())
            .unwrap_or(mat_id.as_str());
        lines.push(format!("  {:20} {:6.1}", name, parts));
    }
    let total: f64 = solution.recipe.values().sum();
    lines.push(format!("  {:20} {:6.1}", "TOTAL", total));

    lines.push(String::new());
    lines.push("Resulting UMF:".to_string());
    lines.push("-".repeat(30));
    lines.push(format_umf_table(&solution.umf));

    let max_error = solution
        .error
        .values()
        .fold(0.0f64, |acc, e| acc.max(e.abs()));
    if max_error > 0.01 {
        lines.push(String::new());
        lines.push("Error (result - target):".to_string());
        lines.push("-".repeat(30));
        for (oxide, err) in &solution.error {
            if err.abs() > 0.001 {
                lines.push(format!("  {:8} {:+.3}", oxide, err));
            }
        }
    }

    lines.join("\n")
}

/// Format a CTE result, optionally with the per-oxide breakdown.
pub fn format_cte(result: &CteResult, verbose: bool) -> String {
    let mut lines = vec![format!("CTE: {:.1}", result.cte)];

    if verbose && !result.contributions.is_empty() {
        lines.push(String::new());
        lines.push("Contributions:".to_string());
        for c in &result.contributions {
            lines.push(format!(
                "  {:8} {:5.1}%  x {:+.3}  = {:+5.2}",
                c.oxide, c.weight_pct, c.coefficient, c.contribution
            ));
        }
    }

    lines.join("\n")
}

/// Format a single blend point: corner shares, recipe (parts ≥ 0.1,
/// descending), and UMF.
pub fn format_blend(blend: &BlendPoint, materials: &MaterialCatalog) -> String {
    let mut lines = Vec::new();

    let corner_parts: Vec<String> = blend
        .corner_names
        .iter()
        .zip(&blend.fractions)
        .filter(|(_, frac)| **frac > 0.0)
        .map(|(name, frac)| format!("{}:{:.0}%", name, frac * 100.0))
        .collect();
    lines.push(format!("Blend {} ({})", blend.name, corner_parts.join(", ")));
    lines.push("-".repeat(40));

    lines.push("Recipe:".to_string());
    let mut entries: Vec<(&String, &f64)> = blend.recipe.iter().collect();
    entries.sort_by(|a, b| b.1.partial_cmp(a.1).unwrap_or(std::cmp::Ordering::Equal));
    for (mat_id, parts) in entries {
        if *parts >= 0.1 {
            let name = materials
                .get(mat_id)
                .map(|m| m.name.as_str())
                .unwrap_or(mat_id.as_str());
            lines.push(format!("  {:20} {:6.1}", name, parts));
        }
    }

    lines.push(String::new());
    lines.push("UMF:".to_string());
    lines.push(format_umf_table(&blend.umf));

    lines.join("\n")
}

/// Format all blend points, sorted by grid name for stable output.
pub fn format_blends(blends: &[BlendPoint], materials: &MaterialCatalog) -> String {
    let mut sorted: Vec<&BlendPoint> = blends.iter().collect();
    sorted.sort_by(|a, b| a.name.cmp(&b.name));

    sorted
        .iter()
        .map(|b| format_blend(b, materials))
        .collect::<Vec<_>>()
        .join("\n\n")
}
