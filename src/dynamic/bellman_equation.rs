//! This module provides synchronous value iteration for a Markov reward
//! process: repeated Bellman expectation backups over the whole value vector
//! until an iteration budget runs out or the values stop moving.

use log::{debug, info, trace};
use num_traits::Float;
use std::fmt::Debug;

use crate::dynamic::reward_process::{as_f64, MarkovRewardProcess};
use crate::error::{Error, Result};

/// Sweep budget used by the bundled program.
pub const DEFAULT_ITERATIONS: usize = 4_000_000;

/// Residual below which a tolerance-gated run is considered converged.
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

/// Configuration options for value iteration.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueIterationConfig<T> {
    /// Maximum number of backup sweeps
    pub max_iterations: usize,
    /// Stop early once a sweep changes no value by `tolerance` or more.
    /// `None` always runs the full budget.
    pub tolerance: Option<T>,
    /// Discount factor (0 <= discount <= 1)
    pub discount: T,
}

impl<T> Default for ValueIterationConfig<T>
where
    T: Float + Debug,
{
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_ITERATIONS,
            tolerance: None,
            discount: T::one(),
        }
    }
}

impl<T> ValueIterationConfig<T>
where
    T: Float + Debug,
{
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_tolerance(mut self, tolerance: T) -> Self {
        self.tolerance = Some(tolerance);
        self
    }

    pub fn with_discount(mut self, discount: T) -> Self {
        self.discount = discount;
        self
    }

    fn validate(&self) -> Result<()> {
        if !(self.discount >= T::zero() && self.discount <= T::one()) {
            return Err(Error::InvalidDiscount(as_f64(self.discount)));
        }
        if let Some(tol) = self.tolerance {
            if !(tol > T::zero() && tol.is_finite()) {
                return Err(Error::InvalidTolerance(as_f64(tol)));
            }
        }
        Ok(())
    }
}

/// Outcome of a value iteration run.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueIterationResult<T> {
    /// Value of every state after the last sweep
    pub values: Vec<T>,
    /// Number of sweeps performed
    pub iterations: usize,
    /// Largest per-state change made by the last sweep, `None` if no sweep ran
    pub residual: Option<T>,
    /// Whether the run stopped because the residual fell below the tolerance
    pub converged: bool,
}

impl<T> ValueIterationResult<T>
where
    T: Float,
{
    /// Value of state 0, `None` only for a hand-built result with no values.
    pub fn root_value(&self) -> Option<T> {
        self.value_of(0)
    }

    pub fn value_of(&self, state: usize) -> Option<T> {
        self.values.get(state).copied()
    }
}

/// Applies one Bellman expectation backup to `values`, returning the next
/// value vector:
///
/// `V'(s) = sum over edges (s -> s') of P(s'|s) * (R(s, s') + discount * V(s'))`
///
/// Absorbing states have no edges and come out as zero.
///
/// # Errors
///
/// Returns [`Error::ValueLength`] if `values` doesn't have one entry per state.
///
/// # Examples
///
/// ```
/// use mrp::dynamic::bellman_equation::backup;
/// use mrp::dynamic::reward_process::MarkovRewardProcess;
///
/// let mrp = MarkovRewardProcess::two_level_tree();
/// let v1 = backup(&mrp, &[0.0; 7], 1.0).unwrap();
/// assert_eq!(v1[0], 0.5);
/// ```
pub fn backup<T>(mrp: &MarkovRewardProcess<T>, values: &[T], discount: T) -> Result<Vec<T>>
where
    T: Float + Debug,
{
    if values.len() != mrp.num_states() {
        return Err(Error::ValueLength {
            expected: mrp.num_states(),
            actual: values.len(),
        });
    }
    let mut next = vec![T::zero(); values.len()];
    sweep(mrp, values, discount, &mut next);
    Ok(next)
}

/// Largest absolute elementwise difference between two value vectors.
/// Extra entries in the longer vector are ignored.
pub fn max_abs_diff<T: Float>(a: &[T], b: &[T]) -> T {
    a.iter()
        .zip(b)
        .fold(T::zero(), |acc, (&x, &y)| acc.max((x - y).abs()))
}

/// Runs value iteration on `mrp`, starting from an all-zero value vector.
///
/// Every sweep computes a fresh vector from the previous one, so all states
/// are updated synchronously. The residual of each sweep is tracked; it only
/// ends the run early when `config.tolerance` is set.
///
/// # Arguments
/// - `mrp`: the Markov reward process
/// - `config`: iteration budget, optional tolerance and discount factor
///
/// # Returns
/// A [`ValueIterationResult`] with the final values and the number of sweeps run.
///
/// # Errors
/// [`Error::InvalidDiscount`] or [`Error::InvalidTolerance`] for a bad config.
///
/// # Examples
///
/// ```
/// use mrp::dynamic::bellman_equation::{value_iteration, ValueIterationConfig};
/// use mrp::dynamic::reward_process::MarkovRewardProcess;
///
/// let mrp = MarkovRewardProcess::two_level_tree();
/// let config = ValueIterationConfig::default().with_max_iterations(100);
/// let result = value_iteration(&mrp, &config).unwrap();
///
/// assert_eq!(result.iterations, 100);
/// assert!((result.root_value().unwrap() - 2.0).abs() < 1e-12);
/// ```
pub fn value_iteration<T>(
    mrp: &MarkovRewardProcess<T>,
    config: &ValueIterationConfig<T>,
) -> Result<ValueIterationResult<T>>
where
    T: Float + Debug,
{
    config.validate()?;
    debug!(
        "value iteration over {} states: budget {}, tolerance {:?}, discount {:?}",
        mrp.num_states(),
        config.max_iterations,
        config.tolerance,
        config.discount
    );

    let n = mrp.num_states();
    let mut values = vec![T::zero(); n];
    let mut next = vec![T::zero(); n];
    let mut residual = None;
    let mut iterations = 0;
    let mut converged = false;

    while iterations < config.max_iterations {
        sweep(mrp, &values, config.discount, &mut next);
        let delta = max_abs_diff(&next, &values);
        std::mem::swap(&mut values, &mut next);
        iterations += 1;
        residual = Some(delta);
        trace!("sweep {}: residual {:?}", iterations, delta);

        if let Some(tol) = config.tolerance {
            if delta < tol {
                converged = true;
                info!(
                    "converged after {} sweeps (residual {:?} < {:?})",
                    iterations, delta, tol
                );
                break;
            }
        }
    }

    debug!(
        "value iteration finished after {} sweeps, residual {:?}",
        iterations, residual
    );

    Ok(ValueIterationResult {
        values,
        iterations,
        residual,
        converged,
    })
}

/// Renders the one-line summary printed by the bundled program.
///
/// The value keeps its fractional part (`2.0`, not `2`). A result without a
/// root state reports `NaN`.
pub fn report<T>(result: &ValueIterationResult<T>) -> String
where
    T: Float + Debug,
{
    format!(
        "Ran {} iterations to get value: {:?}",
        result.iterations,
        result.root_value().unwrap_or_else(T::nan)
    )
}

// `next` is overwritten; `values` and `next` must both have one entry per state.
fn sweep<T>(mrp: &MarkovRewardProcess<T>, values: &[T], discount: T, next: &mut [T])
where
    T: Float + Debug,
{
    next.iter_mut().for_each(|v| *v = T::zero());
    for t in mrp.transitions() {
        next[t.source] =
            next[t.source] + t.probability * (t.reward + discount * values[t.destination]);
    }
}
