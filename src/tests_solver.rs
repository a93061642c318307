// SPDX-License-Identifier: MIT

//! GlazeKernel Solver Tests
//!
//! End-to-end tests through the JSON bridge: catalog in, recipe out.

use crate::bridge::GlazeKernel;
use serde_json::json;

fn cone10_materials() -> String {
    json!({
        "custer_feldspar": {
            "name": "Custer Feldspar",
            "loi": 0.15,
            "analysis": { "SiO2": 68.5, "Al2O3": 18.2, "K2O": 10.0 }
        },
        "silica": {
            "name": "Silica",
            "analysis": { "SiO2": 100.0 }
        },
        "whiting": {
            "name": "Whiting",
            "loi": 44.0,
            "analysis": { "CaO": 56.0 }
        }
    })
    .to_string()
}

#[test]
fn test_cone10_clear_match() {
    println!(" Matching a cone 10 clear target (Native)");

    // Target UMF as would come from TS
    let target = json!({
        "name": "Cone 10 Clear",
        "flux": { "K2O": 0.26, "CaO": 0.74 },
        "other": { "SiO2": 3.70, "Al2O3": 0.35 }
    });

    let start = instant::Instant::now();
    let result_json = GlazeKernel::solve(&target.to_string(), &cone10_materials(), "", false);
    let _duration = start.elapsed();

    let response: serde_json::Value = serde_json::from_str(&result_json).unwrap();
    let res = &response["result"];
    assert!(!res.is_null(), "target should be reachable");

    println!(" Result: {:#?}", res);

    // 1. Recipe parts add up to a 100-part batch
    let recipe = res["recipe"].as_object().unwrap();
    let total: f64 = recipe.values().map(|v| v.as_f64().unwrap()).sum();
    assert!((total - 100.0).abs() < 0.5, "parts total check: {}", total);
    println!(" Batch Total Safe: {}", total);

    // 2. Flux unity holds on the recomputed UMF
    let flux = res["umf"]["flux"].as_object().unwrap();
    let flux_sum: f64 = flux.values().map(|v| v.as_f64().unwrap()).sum();
    assert!((flux_sum - 1.0).abs() < 1e-6, "flux unity check: {}", flux_sum);

    // 3. Flux ratios land near the target
    let k2o = flux["K2O"].as_f64().unwrap();
    let cao = flux["CaO"].as_f64().unwrap();
    assert!((k2o - 0.26).abs() < 0.05, "K2O ratio check: {}", k2o);
    assert!((cao - 0.74).abs() < 0.05, "CaO ratio check: {}", cao);
    println!(" Flux Ratios Safe: K2O {} / CaO {}", k2o, cao);

    // 4. Timing recorded
    let ms = response["compute_time_ms"].as_f64().unwrap();
    assert!(ms >= 0.0);
    println!(" Compute Time: {} ms", ms);
}

#[test]
fn test_pinned_material_survives_to_recipe() {
    println!(" Checking pinned-material constraint flow");

    let target = json!({
        "flux": { "K2O": 0.26, "CaO": 0.74 },
        "other": { "SiO2": 3.70, "Al2O3": 0.35 }
    });
    let constraints = json!({
        "silica": { "min": 30.0, "max": 30.0 }
    });

    let result_json = GlazeKernel::solve(
        &target.to_string(),
        &cone10_materials(),
        &constraints.to_string(),
        false,
    );
    let response: serde_json::Value = serde_json::from_str(&result_json).unwrap();
    let res = &response["result"];
    assert!(!res.is_null(), "pinning 30% silica stays feasible");

    let silica = res["recipe"]["silica"].as_f64().unwrap();
    assert_eq!(silica, 30.0, "pinned allocation check: {}", silica);
    println!(" Pinned Silica Safe: {}", silica);
}

#[test]
fn test_recipe_umf_solve_round_trip() {
    println!(" Checking recipe → UMF → solve round trip");

    // Compute a UMF from a known recipe
    let recipe = json!({ "custer_feldspar": 45, "silica": 30, "whiting": 25 });
    let umf_json = GlazeKernel::recipe_umf(&recipe.to_string(), &cone10_materials(), false);
    let umf: serde_json::Value = serde_json::from_str(&umf_json).unwrap();
    assert!(umf.get("error").is_none(), "UMF conversion: {}", umf_json);

    // Feed it straight back as a solve target
    let result_json = GlazeKernel::solve(&umf_json, &cone10_materials(), "", false);
    let response: serde_json::Value = serde_json::from_str(&result_json).unwrap();
    let res = &response["result"];
    assert!(!res.is_null(), "own UMF must be reachable");

    // Residuals should be near zero: the target is exactly representable
    let error = res["error"].as_object().unwrap();
    for (oxide, err) in error {
        let err = err.as_f64().unwrap();
        assert!(err.abs() < 0.02, "residual check {}: {}", oxide, err);
    }
    println!(" Round Trip Residuals Safe");
}

#[test]
fn test_blend_grid_umf_consistency() {
    println!(" Checking blend grid UMF consistency");

    let corners = json!([
        { "name": "Feldspar Corner", "materials": { "custer_feldspar": 80, "whiting": 20 } },
        { "name": "Silica Corner", "materials": { "silica": 70, "whiting": 30 } }
    ]);

    let result_json = GlazeKernel::blends(&corners.to_string(), &cone10_materials(), 5, false);
    let response: serde_json::Value = serde_json::from_str(&result_json).unwrap();
    let blends = response["blends"].as_array().unwrap();
    assert_eq!(blends.len(), 5);

    for blend in blends {
        // Every point is a 100-part batch with flux unity
        let recipe = blend["recipe"].as_object().unwrap();
        let total: f64 = recipe.values().map(|v| v.as_f64().unwrap()).sum();
        assert!((total - 100.0).abs() < 1e-9, "blend total check: {}", total);

        let flux = blend["umf"]["flux"].as_object().unwrap();
        let flux_sum: f64 = flux.values().map(|v| v.as_f64().unwrap()).sum();
        assert!((flux_sum - 1.0).abs() < 1e-6, "blend flux check: {}", flux_sum);
    }
    println!(" Blend Grid Safe: {} points", blends.len());
}
