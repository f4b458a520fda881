use clap::Parser;
use titansim::cli::{run, Cli};

fn main() -> std::process::ExitCode {
    run(Cli::parse())
}
