//! Nelder–Mead simplex minimizer.
//!
//! A derivative-free method that maintains a simplex of n+1 points and
//! replaces the worst vertex each iteration by reflection, expansion, or
//! contraction, shrinking the whole simplex towards the best vertex when
//! nothing else helps.
//!
//! The state produced each iteration carries the full simplex in its point
//! matrix, ordered best-first, with the best vertex as the representative
//! point. This is the one shipped algorithm that tracks more than one
//! candidate at a time.
//!
//! # Classification thresholds
//!
//! This algorithm carries its own stopping criterion:
//!
//! - `Success`: the simplex diameter (component-wise distance from the best
//!   vertex) is below `x_tolerance` and the value spread across vertices is
//!   below `f_tolerance`
//! - `NoProgress`: the best value has not improved for
//!   `max_stagnant_iterations` consecutive iterations
//! - `OutOfControl`: the engine's divergence guard

use localopt_core::{
    constraints::Constraints,
    error::{Result, SolverError},
    function::{CountedFunction, ObjectiveFunction},
    solver::{Algorithm, IterationStatus},
    state::SolverState,
    types::{DMatrix, DVector, Scalar},
};
use num_traits::Float;
use std::cmp::Ordering;

// Initial simplex perturbations, relative and absolute.
const NONZERO_DELTA: f64 = 0.05;
const ZERO_DELTA: f64 = 0.00025;

/// Configuration for the Nelder–Mead minimizer.
#[derive(Debug, Clone)]
pub struct NelderMeadConfig<T: Scalar> {
    /// Reflection coefficient ρ.
    pub reflection: T,

    /// Expansion coefficient χ.
    pub expansion: T,

    /// Contraction coefficient ψ.
    pub contraction: T,

    /// Shrink coefficient σ.
    pub shrink: T,

    /// Simplex diameter below which the iteration reports success.
    pub x_tolerance: T,

    /// Vertex value spread below which the iteration reports success.
    pub f_tolerance: T,

    /// Consecutive non-improving iterations before reporting stagnation.
    pub max_stagnant_iterations: usize,
}

impl<T: Scalar> Default for NelderMeadConfig<T> {
    fn default() -> Self {
        Self {
            reflection: T::one(),
            expansion: <T as Scalar>::from_f64(2.0),
            contraction: <T as Scalar>::from_f64(0.5),
            shrink: <T as Scalar>::from_f64(0.5),
            x_tolerance: <T as Scalar>::from_f64(1e-4),
            f_tolerance: <T as Scalar>::from_f64(1e-4),
            max_stagnant_iterations: 100,
        }
    }
}

impl<T: Scalar> NelderMeadConfig<T> {
    /// Creates a new configuration with default parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the simplex diameter tolerance.
    pub fn with_x_tolerance(mut self, tolerance: T) -> Self {
        self.x_tolerance = tolerance;
        self
    }

    /// Sets the value spread tolerance.
    pub fn with_f_tolerance(mut self, tolerance: T) -> Self {
        self.f_tolerance = tolerance;
        self
    }

    /// Sets the stagnation limit.
    pub fn with_max_stagnant_iterations(mut self, limit: usize) -> Self {
        self.max_stagnant_iterations = limit;
        self
    }
}

/// Nelder–Mead simplex minimizer.
///
/// # Examples
///
/// ```
/// use localopt_solvers::{NelderMead, NelderMeadConfig};
///
/// let simplex = NelderMead::<f64>::new(NelderMeadConfig::new().with_x_tolerance(1e-6));
/// ```
#[derive(Debug)]
pub struct NelderMead<T: Scalar> {
    config: NelderMeadConfig<T>,
    values: Vec<T>,
    stagnant_iterations: usize,
}

impl<T: Scalar> NelderMead<T> {
    /// Creates a Nelder–Mead minimizer with the given configuration.
    pub fn new(config: NelderMeadConfig<T>) -> Self {
        Self {
            config,
            values: Vec::new(),
            stagnant_iterations: 0,
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &NelderMeadConfig<T> {
        &self.config
    }

    fn validate(&self) -> Result<()> {
        let c = &self.config;
        if c.reflection <= T::zero() {
            return Err(SolverError::invalid_configuration(
                "reflection coefficient must be positive",
                "reflection",
                c.reflection.to_string(),
            ));
        }
        if c.expansion <= T::one() {
            return Err(SolverError::invalid_configuration(
                "expansion coefficient must exceed 1",
                "expansion",
                c.expansion.to_string(),
            ));
        }
        if c.contraction <= T::zero() || c.contraction >= T::one() {
            return Err(SolverError::invalid_configuration(
                "contraction coefficient must lie in (0, 1)",
                "contraction",
                c.contraction.to_string(),
            ));
        }
        if c.shrink <= T::zero() || c.shrink >= T::one() {
            return Err(SolverError::invalid_configuration(
                "shrink coefficient must lie in (0, 1)",
                "shrink",
                c.shrink.to_string(),
            ));
        }
        if c.x_tolerance <= T::zero() || c.f_tolerance <= T::zero() {
            return Err(SolverError::invalid_configuration(
                "tolerances must be positive",
                "x_tolerance/f_tolerance",
                format!("{}/{}", c.x_tolerance, c.f_tolerance),
            ));
        }
        if c.max_stagnant_iterations == 0 {
            return Err(SolverError::invalid_configuration(
                "stagnation limit must be at least 1",
                "max_stagnant_iterations",
                "0".to_string(),
            ));
        }
        Ok(())
    }

    fn sort_simplex(vertices: &mut Vec<DVector<T>>, values: &mut Vec<T>) {
        let mut order: Vec<usize> = (0..values.len()).collect();
        order.sort_by(|&a, &b| {
            values[a]
                .partial_cmp(&values[b])
                .unwrap_or(Ordering::Equal)
        });
        *vertices = order.iter().map(|&i| vertices[i].clone()).collect();
        *values = order.iter().map(|&i| values[i]).collect();
    }

    fn classify(&self, vertices: &[DVector<T>], values: &[T]) -> IterationStatus {
        let mut diameter = T::zero();
        for v in &vertices[1..] {
            for i in 0..v.len() {
                let d = <T as Float>::abs(v[i] - vertices[0][i]);
                if d > diameter {
                    diameter = d;
                }
            }
        }
        let spread = <T as Float>::abs(values[values.len() - 1] - values[0]);
        if diameter < self.config.x_tolerance && spread < self.config.f_tolerance {
            IterationStatus::Success
        } else if self.stagnant_iterations >= self.config.max_stagnant_iterations {
            IterationStatus::NoProgress
        } else {
            IterationStatus::Continue
        }
    }
}

impl<T: Scalar> Algorithm<T> for NelderMead<T> {
    fn name(&self) -> &str {
        "Nelder-Mead"
    }

    fn initialize(
        &mut self,
        func: &CountedFunction<'_, T>,
        x0: &DVector<T>,
        constraints: &dyn Constraints<T>,
    ) -> Result<SolverState<T>> {
        self.validate()?;
        let x0 = constraints.project(x0);
        let n = x0.len();
        if n == 0 {
            return Err(SolverError::invalid_configuration(
                "initial point must be non-empty",
                "x0",
                "length 0",
            ));
        }

        let nonzero_delta = <T as Scalar>::from_f64(NONZERO_DELTA);
        let zero_delta = <T as Scalar>::from_f64(ZERO_DELTA);
        let mut vertices = Vec::with_capacity(n + 1);
        vertices.push(x0.clone());
        for k in 0..n {
            let mut y = x0.clone();
            y[k] = if y[k] == T::zero() {
                zero_delta
            } else {
                (T::one() + nonzero_delta) * y[k]
            };
            vertices.push(constraints.project(&y));
        }

        let mut values = Vec::with_capacity(n + 1);
        for v in &vertices {
            values.push(func.evaluate(v)?);
        }
        Self::sort_simplex(&mut vertices, &mut values);

        let state = SolverState::from_points(DMatrix::from_columns(&vertices), values[0])?;
        self.values = values;
        self.stagnant_iterations = 0;
        Ok(state)
    }

    fn step(
        &mut self,
        func: &CountedFunction<'_, T>,
        constraints: &dyn Constraints<T>,
        state: &SolverState<T>,
    ) -> Result<(SolverState<T>, IterationStatus)> {
        let n = state.dimension();
        let m = state.num_points();
        if m != n + 1 {
            return Err(SolverError::invalid_state(format!(
                "Nelder-Mead needs a simplex of {} points, found {}",
                n + 1,
                m
            )));
        }

        let mut vertices: Vec<DVector<T>> =
            (0..m).map(|j| state.points().column(j).into_owned()).collect();
        let mut values = if self.values.len() == m {
            self.values.clone()
        } else {
            // Resynchronize with a state that was not produced by this run.
            let mut values = Vec::with_capacity(m);
            for v in &vertices {
                values.push(func.evaluate(v)?);
            }
            values
        };

        let rho = self.config.reflection;
        let chi = self.config.expansion;
        let psi = self.config.contraction;
        let sigma = self.config.shrink;
        let one = T::one();

        let mut centroid = DVector::zeros(n);
        for v in &vertices[..m - 1] {
            centroid += v;
        }
        centroid *= one / <T as Scalar>::from_usize(n);

        let worst = vertices[m - 1].clone();
        let f_best = values[0];
        let f_second_worst = values[m - 2];
        let f_worst = values[m - 1];

        let reflected = constraints.project(&(&centroid * (one + rho) - &worst * rho));
        let f_reflected = func.evaluate(&reflected)?;

        let mut shrink_needed = false;
        if f_reflected < f_best {
            let expanded =
                constraints.project(&(&centroid * (one + rho * chi) - &worst * (rho * chi)));
            let f_expanded = func.evaluate(&expanded)?;
            if f_expanded < f_reflected {
                vertices[m - 1] = expanded;
                values[m - 1] = f_expanded;
            } else {
                vertices[m - 1] = reflected;
                values[m - 1] = f_reflected;
            }
        } else if f_reflected < f_second_worst {
            vertices[m - 1] = reflected;
            values[m - 1] = f_reflected;
        } else if f_reflected < f_worst {
            let contracted =
                constraints.project(&(&centroid * (one + psi * rho) - &worst * (psi * rho)));
            let f_contracted = func.evaluate(&contracted)?;
            if f_contracted <= f_reflected {
                vertices[m - 1] = contracted;
                values[m - 1] = f_contracted;
            } else {
                shrink_needed = true;
            }
        } else {
            let contracted = constraints.project(&(&centroid * (one - psi) + &worst * psi));
            let f_contracted = func.evaluate(&contracted)?;
            if f_contracted < f_worst {
                vertices[m - 1] = contracted;
                values[m - 1] = f_contracted;
            } else {
                shrink_needed = true;
            }
        }

        if shrink_needed {
            let best = vertices[0].clone();
            for j in 1..m {
                let shrunk = constraints.project(&(&best + (&vertices[j] - &best) * sigma));
                values[j] = func.evaluate(&shrunk)?;
                vertices[j] = shrunk;
            }
        }

        Self::sort_simplex(&mut vertices, &mut values);
        if values[0] < f_best {
            self.stagnant_iterations = 0;
        } else {
            self.stagnant_iterations += 1;
        }

        let status = self.classify(&vertices, &values);
        let state = SolverState::from_points(DMatrix::from_columns(&vertices), values[0])?;
        self.values = values;
        Ok((state, status))
    }

    fn has_built_in_stopping_criterion(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use localopt_core::constraints::Unconstrained;
    use localopt_core::function::QuadraticObjective;

    #[test]
    fn test_initial_simplex_shape() {
        let objective = QuadraticObjective::<f64>::simple(2);
        let counted = CountedFunction::new(&objective);
        let mut simplex = NelderMead::new(NelderMeadConfig::default());

        let state = simplex
            .initialize(&counted, &DVector::from_vec(vec![1.0, 1.0]), &Unconstrained)
            .unwrap();

        assert_eq!(state.num_points(), 3);
        assert_eq!(state.dimension(), 2);
        // Best vertex first, and the representative point equals it.
        assert_eq!(state.point(), &DVector::from_vec(vec![1.0, 1.0]));
        assert_eq!(state.value(), 1.0);
        assert_eq!(counted.counts().function, 3);
    }

    #[test]
    fn test_step_never_worsens_best_vertex() {
        let objective = QuadraticObjective::<f64>::simple(2);
        let counted = CountedFunction::new(&objective);
        let mut simplex = NelderMead::new(NelderMeadConfig::default());

        let mut state = simplex
            .initialize(&counted, &DVector::from_vec(vec![2.0, -3.0]), &Unconstrained)
            .unwrap();
        for _ in 0..50 {
            let (next, status) = simplex.step(&counted, &Unconstrained, &state).unwrap();
            assert!(next.value() <= state.value());
            state = next;
            if status.is_terminal() {
                break;
            }
        }
        assert!(state.value() < 1.0);
    }

    #[test]
    fn test_success_on_collapsed_simplex() {
        let objective = QuadraticObjective::<f64>::simple(1);
        let counted = CountedFunction::new(&objective);
        let mut simplex = NelderMead::new(
            NelderMeadConfig::new()
                .with_x_tolerance(1e-3)
                .with_f_tolerance(1e-3),
        );

        let mut state = simplex
            .initialize(&counted, &DVector::from_vec(vec![1.0]), &Unconstrained)
            .unwrap();
        let mut status = IterationStatus::Continue;
        for _ in 0..500 {
            let (next, s) = simplex.step(&counted, &Unconstrained, &state).unwrap();
            state = next;
            status = s;
            if status.is_terminal() {
                break;
            }
        }
        assert_eq!(status, IterationStatus::Success);
        assert!(state.point()[0].abs() < 0.1);
    }

    #[test]
    fn test_zero_expansion_rejected() {
        let objective = QuadraticObjective::<f64>::simple(1);
        let counted = CountedFunction::new(&objective);
        let mut config = NelderMeadConfig::<f64>::default();
        config.expansion = 1.0;
        let mut simplex = NelderMead::new(config);
        assert!(matches!(
            simplex.initialize(&counted, &DVector::from_vec(vec![1.0]), &Unconstrained),
            Err(SolverError::InvalidConfiguration { .. })
        ));
    }
}
