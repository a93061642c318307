// SPDX-License-Identifier: MIT
//
// GLAZE-CORE — Ceramic Glaze Chemistry Engine
// Core profile: UMF conversion + constrained recipe matching
//

pub mod blend;
pub mod bridge;
pub mod catalog;
pub mod chemistry;
pub mod report;
pub mod solver;
#[cfg(test)]
pub mod tests_solver;

// Re-export core types
pub use bridge::GlazeKernel;
pub use catalog::{Material, MaterialBounds, MaterialCatalog, RecipeEntry};
pub use chemistry::oxides::FluxPreset;
pub use chemistry::umf::{recipe_to_umf, Umf};
pub use solver::{select_candidates, solve_umf_match, Solution};
