//! Markov reward processes: a finite state space plus a table of rewarded,
//! probability-weighted transitions. With a single action per state there is
//! nothing to choose, so a process is fully described by its edges.

use num_traits::Float;
use std::fmt::{self, Debug, Display};

use crate::error::{Error, Result};

/// Label carried by every edge of a single-action process.
pub const DEFAULT_ACTION: &str = "a1";

/// Allowed deviation from 1.0 when summing a state's outgoing probabilities.
const MASS_EPSILON: f64 = 1e-8;

/// Floor on that deviation in units of the float type's epsilon, for `f32`.
const MASS_ULPS: f64 = 16.0;

/// Number of states in [`TWO_LEVEL_TREE`].
pub const TWO_LEVEL_TREE_STATES: usize = 7;

/// A two-level tree rooted at state 0. States 2, 3, 5 and 6 are leaves.
///
/// ```text
/// 0 -(a1,0.5,1.0)-> 1 -(a1,0.8,0.0)-> 2
///                     -(a1,0.2,1.0)-> 3
///   -(a1,0.5,0.0)-> 4 -(a1,0.6,2.0)-> 5
///                     -(a1,0.4,4.0)-> 6
/// ```
pub const TWO_LEVEL_TREE: [Transition<f64>; 6] = [
    Transition::new(0, 1, 1.0, 0.5),
    Transition::new(0, 4, 0.0, 0.5),
    Transition::new(1, 2, 0.0, 0.8),
    Transition::new(1, 3, 1.0, 0.2),
    Transition::new(4, 5, 2.0, 0.6),
    Transition::new(4, 6, 4.0, 0.4),
];

/// One edge `source -> destination` taken with `probability`, paying `reward`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition<T> {
    pub source: usize,
    pub destination: usize,
    pub action: &'static str,
    pub reward: T,
    pub probability: T,
}

impl<T> Transition<T> {
    /// Creates an edge labelled with [`DEFAULT_ACTION`].
    pub const fn new(source: usize, destination: usize, reward: T, probability: T) -> Self {
        Self {
            source,
            destination,
            action: DEFAULT_ACTION,
            reward,
            probability,
        }
    }

    pub fn with_action(mut self, action: &'static str) -> Self {
        self.action = action;
        self
    }
}

impl<T: Display> Display for Transition<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -({},{},{})-> {}",
            self.source, self.action, self.probability, self.reward, self.destination
        )
    }
}

/// A validated Markov reward process.
///
/// Every state that has outgoing edges must distribute exactly one unit of
/// probability over them. States without outgoing edges are absorbing: they
/// collect no reward and keep whatever value they start with.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkovRewardProcess<T> {
    num_states: usize,
    transitions: Vec<Transition<T>>,
}

impl<T> MarkovRewardProcess<T>
where
    T: Float + Debug,
{
    /// Builds a process over states `0..num_states` from its edge table.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyStateSpace`] if `num_states` is zero.
    /// - [`Error::StateOutOfRange`] if an edge names a state `>= num_states`.
    /// - [`Error::InvalidProbability`] for probabilities outside `[0, 1]` or NaN.
    /// - [`Error::NonFiniteReward`] for infinite or NaN rewards.
    /// - [`Error::ProbabilityMass`] if a non-absorbing state's edges don't sum to 1.
    ///
    /// # Examples
    ///
    /// ```
    /// use mrp::dynamic::reward_process::{MarkovRewardProcess, Transition};
    ///
    /// let mrp = MarkovRewardProcess::new(
    ///     3,
    ///     vec![Transition::new(0, 1, 1.0, 0.25), Transition::new(0, 2, 0.0, 0.75)],
    /// )
    /// .unwrap();
    ///
    /// assert!(mrp.is_absorbing(1));
    /// assert!(!mrp.is_absorbing(0));
    /// ```
    pub fn new(num_states: usize, transitions: Vec<Transition<T>>) -> Result<Self> {
        if num_states == 0 {
            return Err(Error::EmptyStateSpace);
        }

        let mut mass = vec![T::zero(); num_states];
        let mut has_outgoing = vec![false; num_states];

        for t in &transitions {
            for state in [t.source, t.destination] {
                if state >= num_states {
                    return Err(Error::StateOutOfRange { state, num_states });
                }
            }
            if t.probability.is_nan() || t.probability < T::zero() || t.probability > T::one() {
                return Err(Error::InvalidProbability {
                    from: t.source,
                    to: t.destination,
                    probability: as_f64(t.probability),
                });
            }
            if !t.reward.is_finite() {
                return Err(Error::NonFiniteReward {
                    from: t.source,
                    to: t.destination,
                });
            }
            mass[t.source] = mass[t.source] + t.probability;
            has_outgoing[t.source] = true;
        }

        let epsilon = T::from(MASS_EPSILON)
            .unwrap_or_else(T::epsilon)
            .max(T::epsilon() * T::from(MASS_ULPS).unwrap_or_else(T::one));
        for (state, &m) in mass.iter().enumerate() {
            if has_outgoing[state] && (m - T::one()).abs() > epsilon {
                return Err(Error::ProbabilityMass {
                    state,
                    mass: as_f64(m),
                });
            }
        }

        Ok(Self {
            num_states,
            transitions,
        })
    }

    pub fn num_states(&self) -> usize {
        self.num_states
    }

    pub fn transitions(&self) -> &[Transition<T>] {
        &self.transitions
    }

    /// Edges leaving `state`, in table order.
    pub fn successors(&self, state: usize) -> impl Iterator<Item = &Transition<T>> + '_ {
        self.transitions.iter().filter(move |t| t.source == state)
    }

    /// Total probability on the edges leaving `state`: 1 for transient
    /// states, 0 for absorbing ones.
    pub fn outgoing_mass(&self, state: usize) -> T {
        self.successors(state).fold(T::zero(), |acc, t| acc + t.probability)
    }

    pub fn is_absorbing(&self, state: usize) -> bool {
        self.successors(state).next().is_none()
    }

    pub fn absorbing_states(&self) -> Vec<usize> {
        (0..self.num_states)
            .filter(|&s| self.is_absorbing(s))
            .collect()
    }
}

impl MarkovRewardProcess<f64> {
    /// The seven-state process described by [`TWO_LEVEL_TREE`].
    pub fn two_level_tree() -> Self {
        Self {
            num_states: TWO_LEVEL_TREE_STATES,
            transitions: TWO_LEVEL_TREE.to_vec(),
        }
    }
}

/// Widens a generic float for error reporting.
pub(crate) fn as_f64<T: Float>(x: T) -> f64 {
    x.to_f64().unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_two_level_tree_is_valid() {
        let tree = MarkovRewardProcess::two_level_tree();
        let rebuilt = MarkovRewardProcess::new(tree.num_states(), tree.transitions().to_vec());
        assert_eq!(rebuilt, Ok(tree));
    }

    #[test]
    fn test_two_level_tree_structure() {
        let tree = MarkovRewardProcess::two_level_tree();
        assert_eq!(tree.num_states(), 7);
        assert_eq!(tree.transitions().len(), 6);
        assert_eq!(tree.absorbing_states(), vec![2, 3, 5, 6]);

        for state in [0, 1, 4] {
            assert_relative_eq!(tree.outgoing_mass(state), 1.0, epsilon = 1e-12);
        }
        for state in [2, 3, 5, 6] {
            assert_eq!(tree.outgoing_mass(state), 0.0);
        }

        let from_root: Vec<usize> = tree.successors(0).map(|t| t.destination).collect();
        assert_eq!(from_root, vec![1, 4]);
        assert!(tree.transitions().iter().all(|t| t.action == DEFAULT_ACTION));
    }

    #[test]
    fn test_transition_display() {
        assert_eq!(TWO_LEVEL_TREE[0].to_string(), "0 -(a1,0.5,1)-> 1");
        let relabelled = Transition::new(4, 6, 4.0, 0.4).with_action("go");
        assert_eq!(relabelled.to_string(), "4 -(go,0.4,4)-> 6");
    }

    #[test]
    fn test_empty_state_space() {
        let result = MarkovRewardProcess::<f64>::new(0, vec![]);
        assert_eq!(result, Err(Error::EmptyStateSpace));
    }

    #[test]
    fn test_state_out_of_range() {
        let result = MarkovRewardProcess::new(2, vec![Transition::new(0, 2, 1.0, 1.0)]);
        assert_eq!(
            result,
            Err(Error::StateOutOfRange {
                state: 2,
                num_states: 2
            })
        );
    }

    #[test]
    fn test_invalid_probability() {
        let result = MarkovRewardProcess::new(
            2,
            vec![Transition::new(0, 1, 0.0, 1.5), Transition::new(0, 0, 0.0, -0.5)],
        );
        assert!(matches!(
            result,
            Err(Error::InvalidProbability { from: 0, to: 1, .. })
        ));

        let nan = MarkovRewardProcess::new(2, vec![Transition::new(0, 1, 0.0, f64::NAN)]);
        assert!(matches!(nan, Err(Error::InvalidProbability { .. })));
    }

    #[test]
    fn test_non_finite_reward() {
        let result = MarkovRewardProcess::new(2, vec![Transition::new(0, 1, f64::INFINITY, 1.0)]);
        assert_eq!(result, Err(Error::NonFiniteReward { from: 0, to: 1 }));
    }

    #[test]
    fn test_probability_mass_must_sum_to_one() {
        let result = MarkovRewardProcess::new(
            3,
            vec![Transition::new(0, 1, 10.0, 0.5), Transition::new(1, 2, 0.0, 1.0)],
        );
        assert_eq!(
            result,
            Err(Error::ProbabilityMass {
                state: 0,
                mass: 0.5
            })
        );
    }

    #[test]
    fn test_single_precision_process() {
        let mrp = MarkovRewardProcess::<f32>::new(
            2,
            vec![Transition::new(0, 1, 1.0, 0.25), Transition::new(0, 0, 0.0, 0.75)],
        )
        .unwrap();
        assert_eq!(mrp.absorbing_states(), vec![1]);
    }

    #[test]
    fn test_single_precision_rounding_is_accepted() {
        // Ten edges of 0.1f32 sum to 1.0000001, off by one f32 epsilon.
        let edges: Vec<Transition<f32>> = (1..=10)
            .map(|s| Transition::new(0, s, 1.0, 0.1))
            .collect();
        let mrp = MarkovRewardProcess::new(11, edges).unwrap();
        assert_relative_eq!(mrp.outgoing_mass(0), 1.0, epsilon = 1e-6);

        let short: Vec<Transition<f32>> = (1..=9)
            .map(|s| Transition::new(0, s, 1.0, 0.1))
            .collect();
        assert!(matches!(
            MarkovRewardProcess::new(11, short),
            Err(Error::ProbabilityMass { state: 0, .. })
        ));
    }
}
