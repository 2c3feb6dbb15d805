use anyhow::Result;
use clap::Parser;

use jitlog::cli::{self, Cli};

fn main() -> Result<()> {
    jitlog_utils::init_logging();
    cli::run(Cli::parse())
}
