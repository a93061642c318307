// SPDX-License-Identifier: MIT
//
// GLAZE-CORE — Optimization Engine
// Seeded differential evolution over box-bounded material fractions with
// a mass-balance equality (fractions sum to the unallocated share),
// followed by a pairwise-transfer polish.

use nalgebra::{DMatrix, DVector};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Below this flux-mole sum the formula is degenerate; the objective
/// returns a large penalty instead of dividing by near-zero.
const FLUX_SUM_FLOOR: f64 = 1e-10;
const DEGENERATE_PENALTY: f64 = 1e10;
const FEASIBILITY_EPS: f64 = 1e-9;

/// Search configuration. The fixed seed and generation cap make solves
/// reproducible for identical inputs.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub population_size: usize,
    pub generations: usize,
    /// Differential weight (mutation scale factor).
    pub f: f64,
    /// Crossover probability.
    pub cr: f64,
    /// Relative convergence tolerance on the population energy spread.
    pub tol: f64,
    /// Absolute convergence tolerance.
    pub atol: f64,
    pub seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            population_size: 60,
            generations: 2000,
            f: 0.8,
            cr: 0.9,
            tol: 1e-7,
            atol: 1e-10,
            seed: 42,
        }
    }
}

/// The linearized matching problem: moles are linear in material
/// fractions, the objective is squared UMF error after flux
/// normalization (the one nonlinearity).
pub struct UmfProblem {
    /// `contributions[(i, j)]` = moles of oxide i per 1.0 fraction of
    /// variable material j.
    pub contributions: DMatrix<f64>,
    /// Molar offset from fixed-fraction materials, per oxide.
    pub fixed_moles: DVector<f64>,
    /// Target molar ratio per tracked oxide.
    pub target: DVector<f64>,
    /// Row indices of flux oxides within the tracked-oxide list.
    pub flux_indices: Vec<usize>,
    /// Per-variable lower bounds (fractions in [0, 1]).
    pub lower: Vec<f64>,
    /// Per-variable upper bounds, already capped at `remaining`.
    pub upper: Vec<f64>,
    /// Unallocated share of the recipe: 1 − Σ fixed fractions.
    pub remaining: f64,
}

impl UmfProblem {
    /// Squared UMF error of a fraction vector against the target.
    pub fn objective(&self, x: &DVector<f64>) -> f64 {
        let total = &self.fixed_moles + &self.contributions * x;
        let flux_sum: f64 = self.flux_indices.iter().map(|&i| total[i]).sum();
        if flux_sum < FLUX_SUM_FLOOR {
            return DEGENERATE_PENALTY;
        }
        let mut err = 0.0;
        for i in 0..total.len() {
            let d = total[i] / flux_sum - self.target[i];
            err += d * d;
        }
        err
    }

    fn is_feasible(&self) -> bool {
        let mut lo_sum = 0.0;
        let mut hi_sum = 0.0;
        for (lo, hi) in self.lower.iter().zip(&self.upper) {
            if lo > &(hi + FEASIBILITY_EPS) {
                return false;
            }
            lo_sum += lo;
            hi_sum += hi;
        }
        lo_sum <= self.remaining + FEASIBILITY_EPS && hi_sum >= self.remaining - FEASIBILITY_EPS
    }
}

/// Clamp into the box, then redistribute the mass-balance deficit over
/// coordinates with slack so the vector sums exactly to `remaining`.
/// One redistribution pass closes the gap when slack suffices; the loop
/// only mops up clamping interactions.
pub fn repair(x: &mut DVector<f64>, lower: &[f64], upper: &[f64], remaining: f64) {
    let n = x.len();
    for i in 0..n {
        x[i] = x[i].clamp(lower[i], upper[i]);
    }
    for _ in 0..32 {
        let sum: f64 = x.iter().sum();
        let delta = remaining - sum;
        if delta.abs() < 1e-12 {
            break;
        }
        if delta > 0.0 {
            let slack: f64 = (0..n).map(|i| upper[i] - x[i]).sum();
            if slack <= 0.0 {
                break;
            }
            let scale = (delta / slack).min(1.0);
            for i in 0..n {
                x[i] += (upper[i] - x[i]) * scale;
            }
        } else {
            let slack: f64 = (0..n).map(|i| x[i] - lower[i]).sum();
            if slack <= 0.0 {
                break;
            }
            let scale = ((-delta) / slack).min(1.0);
            for i in 0..n {
                x[i] -= (x[i] - lower[i]) * scale;
            }
        }
    }
}

/// Minimize the problem objective. Returns the best feasible fraction
/// vector, or `None` when the constraint set is empty or the search
/// exhausts its budget without converging.
pub fn optimize(problem: &UmfProblem, config: &EngineConfig) -> Option<DVector<f64>> {
    let dims = problem.lower.len();
    if dims == 0 || !problem.is_feasible() {
        return None;
    }
    // With one variable material the equality constraint pins it.
    if dims == 1 {
        return Some(DVector::from_element(1, problem.remaining));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let pop = config.population_size.max(4);

    let mut population: Vec<DVector<f64>> = (0..pop)
        .map(|_| {
            let mut x = DVector::zeros(dims);
            for d in 0..dims {
                x[d] = rng.gen_range(problem.lower[d]..=problem.upper[d]);
            }
            repair(&mut x, &problem.lower, &problem.upper, problem.remaining);
            x
        })
        .collect();
    let mut energies: Vec<f64> = population.iter().map(|x| problem.objective(x)).collect();

    let mut best_idx = 0;
    for i in 1..pop {
        if energies[i] < energies[best_idx] {
            best_idx = i;
        }
    }
    let mut best_x = population[best_idx].clone();
    let mut best_e = energies[best_idx];

    let mut converged = false;
    for _gen in 0..config.generations {
        for i in 0..pop {
            // rand/1/bin mutation: three distinct donors, none equal to i
            let a = loop {
                let k = rng.gen_range(0..pop);
                if k != i {
                    break k;
                }
            };
            let b = loop {
                let k = rng.gen_range(0..pop);
                if k != i && k != a {
                    break k;
                }
            };
            let c = loop {
                let k = rng.gen_range(0..pop);
                if k != i && k != a && k != b {
                    break k;
                }
            };

            let mut trial = population[i].clone();
            let forced = rng.gen_range(0..dims);
            for d in 0..dims {
                if d == forced || rng.gen::<f64>() < config.cr {
                    trial[d] = population[a][d] + config.f * (population[b][d] - population[c][d]);
                }
            }
            repair(&mut trial, &problem.lower, &problem.upper, problem.remaining);

            let e = problem.objective(&trial);
            if e <= energies[i] {
                population[i] = trial;
                energies[i] = e;
                if e < best_e {
                    best_e = e;
                    best_x = population[i].clone();
                }
            }
        }

        let mean = energies.iter().sum::<f64>() / pop as f64;
        let var = energies.iter().map(|e| (e - mean) * (e - mean)).sum::<f64>() / pop as f64;
        if var.sqrt() <= config.atol + config.tol * mean.abs() || best_e < 1e-15 {
            converged = true;
            break;
        }
    }

    if !converged {
        return None;
    }

    polish(problem, &mut best_x);
    Some(best_x)
}

/// Local refinement that preserves the equality constraint exactly:
/// golden-section line search on mass transfers between material pairs,
/// sweeping until no pair improves.
fn polish(problem: &UmfProblem, x: &mut DVector<f64>) {
    let n = x.len();
    if n < 2 {
        return;
    }
    let mut fx = problem.objective(x);
    for _sweep in 0..25 {
        let mut improved = false;
        for i in 0..n {
            for j in (i + 1)..n {
                // transfer t from j to i keeps the sum fixed
                let t_hi = (problem.upper[i] - x[i]).min(x[j] - problem.lower[j]);
                let t_lo = -((x[i] - problem.lower[i]).min(problem.upper[j] - x[j]));
                if t_hi - t_lo < 1e-14 {
                    continue;
                }
                let eval = |t: f64| {
                    let mut y = x.clone();
                    y[i] += t;
                    y[j] -= t;
                    problem.objective(&y)
                };
                let (t_best, f_best) = golden_section(&eval, t_lo, t_hi);
                if f_best + 1e-15 < fx {
                    x[i] += t_best;
                    x[j] -= t_best;
                    fx = f_best;
                    improved = true;
                }
            }
        }
        if !improved {
            break;
        }
    }
}

fn golden_section<F: Fn(f64) -> f64>(f: &F, mut a: f64, mut b: f64) -> (f64, f64) {
    const INVPHI: f64 = 0.618_033_988_749_894_8;
    let mut c = b - INVPHI * (b - a);
    let mut d = a + INVPHI * (b - a);
    let mut fc = f(c);
    let mut fd = f(d);
    for _ in 0..60 {
        if fc < fd {
            b = d;
            d = c;
            fd = fc;
            c = b - INVPHI * (b - a);
            fc = f(c);
        } else {
            a = c;
            c = d;
            fc = fd;
            d = a + INVPHI * (b - a);
            fd = f(d);
        }
        if (b - a).abs() < 1e-14 {
            break;
        }
    }
    let t = 0.5 * (a + b);
    (t, f(t))
}
