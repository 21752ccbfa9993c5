// TCK runner with no vendor evaluator: lists plans and dry-runs suites.
// Usage: cargo run --bin dmn-tck -- run <path>

use dmn_tck_runner::{cli, DryRun};

fn main() {
    std::process::exit(cli::run_with(&DryRun));
}
