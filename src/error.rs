use thiserror::Error;

/// Errors raised while building a reward process or running value iteration on it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("a reward process needs at least one state")]
    EmptyStateSpace,

    #[error("state {state} is out of range for a process with {num_states} states")]
    StateOutOfRange { state: usize, num_states: usize },

    #[error("transition {from} -> {to} has probability {probability}, expected a value in [0, 1]")]
    InvalidProbability {
        from: usize,
        to: usize,
        probability: f64,
    },

    #[error("transition {from} -> {to} has a non-finite reward")]
    NonFiniteReward { from: usize, to: usize },

    #[error("outgoing probabilities of state {state} sum to {mass}, expected 1.0")]
    ProbabilityMass { state: usize, mass: f64 },

    #[error("discount factor must be in [0, 1], got {0}")]
    InvalidDiscount(f64),

    #[error("tolerance must be positive and finite, got {0}")]
    InvalidTolerance(f64),

    #[error("value vector has {actual} entries, expected {expected}")]
    ValueLength { expected: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
