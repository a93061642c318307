// SPDX-License-Identifier: MIT
//
// GLAZE-CORE — Oxide Registry
// Molecular weights, symbol canonicalization, and flux groupings.

/// Oxides treated as network-modifying fluxes in the classic Seger formula.
pub const FLUX_TRADITIONAL: &[&str] = &[
    "Li2O", "Na2O", "K2O", "CaO", "MgO", "SrO", "BaO", "ZnO",
];

/// Extended flux grouping (Katz): traditional fluxes plus the minor
/// colorant/opacifier oxides that act as melters at high temperature.
pub const FLUX_EXTENDED: &[&str] = &[
    "Li2O", "Na2O", "K2O", "CaO", "MgO", "SrO", "BaO", "ZnO", "CoO", "CuO", "Fe2O3", "MnO2",
    "SnO2", "Bi2O3",
];

/// Which oxides count as fluxes during UMF normalization.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FluxPreset {
    #[default]
    Traditional,
    Extended,
}

impl FluxPreset {
    pub fn oxides(self) -> &'static [&'static str] {
        match self {
            FluxPreset::Traditional => FLUX_TRADITIONAL,
            FluxPreset::Extended => FLUX_EXTENDED,
        }
    }

    pub fn contains(self, oxide: &str) -> bool {
        self.oxides().contains(&oxide)
    }
}

/// Molecular weight in g/mol, or `None` for oxides outside the table.
///
/// An oxide missing from this table is deliberately excluded from molar
/// conversion: it keeps its weight-percent presence in an analysis but
/// contributes no moles to a formula.
pub fn molecular_weight(oxide: &str) -> Option<f64> {
    let mw = match oxide {
        "SiO2" => 60.085,
        "Al2O3" => 101.961,
        "B2O3" => 69.620,
        "TiO2" => 79.866,
        "Li2O" => 29.881,
        "Na2O" => 61.979,
        "K2O" => 94.196,
        "MgO" => 40.304,
        "CaO" => 56.077,
        "SrO" => 103.619,
        "BaO" => 153.326,
        "ZnO" => 81.379,
        "Fe2O3" => 159.688,
        "MnO" => 70.937,
        "P2O5" => 141.945,
        "ZrO2" => 123.223,
        // Extended flux oxides
        "CoO" => 74.932,
        "CuO" => 79.545,
        "MnO2" => 86.937,
        "SnO2" => 150.71,
        "Bi2O3" => 465.96,
        _ => return None,
    };
    Some(mw)
}

/// Resolve an oxide symbol to its standard capitalization.
/// Unknown symbols pass through unchanged.
pub fn canonicalize(symbol: &str) -> String {
    let canonical = match symbol.to_lowercase().as_str() {
        "sio2" => "SiO2",
        "al2o3" => "Al2O3",
        "b2o3" => "B2O3",
        "na2o" => "Na2O",
        "k2o" => "K2O",
        "li2o" => "Li2O",
        "cao" => "CaO",
        "mgo" => "MgO",
        "bao" => "BaO",
        "sro" => "SrO",
        "zno" => "ZnO",
        "pbo" => "PbO",
        "mno" => "MnO",
        "fe2o3" => "Fe2O3",
        "feo" => "FeO",
        "tio2" => "TiO2",
        "zro2" => "ZrO2",
        "sno2" => "SnO2",
        "cuo" => "CuO",
        "cu2o" => "Cu2O",
        "coo" => "CoO",
        "nio" => "NiO",
        "cr2o3" => "Cr2O3",
        "mno2" => "MnO2",
        "p2o5" => "P2O5",
        "v2o5" => "V2O5",
        "bi2o3" => "Bi2O3",
        "ceo2" => "CeO2",
        "la2o3" => "La2O3",
        "nd2o3" => "Nd2O3",
        "pr2o3" => "Pr2O3",
        "er2o3" => "Er2O3",
        "y2o3" => "Y2O3",
        "f" => "F",
        _ => return symbol.to_string(),
    };
    canonical.to_string()
}
