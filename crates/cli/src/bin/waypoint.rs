use anyhow::Result;
use std::process::ExitCode;

fn main() -> Result<ExitCode> {
    waypoint_cli::main_entry()
}
