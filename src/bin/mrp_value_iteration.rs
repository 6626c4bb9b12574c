use mrp::dynamic::bellman_equation::{report, value_iteration, ValueIterationConfig};
use mrp::dynamic::reward_process::MarkovRewardProcess;

fn main() -> mrp::Result<()> {
    let process = MarkovRewardProcess::two_level_tree();
    let result = value_iteration(&process, &ValueIterationConfig::default())?;
    println!("{}", report(&result));
    Ok(())
}
