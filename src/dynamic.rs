pub mod bellman_equation;
pub mod reward_process;

// Re-export the value iteration entry points with descriptive names
pub use bellman_equation::{
    backup, max_abs_diff, report, value_iteration, ValueIterationConfig, ValueIterationResult,
    DEFAULT_ITERATIONS, DEFAULT_TOLERANCE,
};
pub use reward_process::{MarkovRewardProcess, Transition, TWO_LEVEL_TREE};
