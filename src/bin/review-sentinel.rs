//! review-sentinel CLI binary.

use anyhow::Context;
use clap::Parser;
use review_sentinel::cli::{args::SentinelArgs, commands::execute_command};

fn main() -> anyhow::Result<()> {
    let args = SentinelArgs::parse();
    let command = args.command.name();

    execute_command(args).with_context(|| format!("{command} failed"))
}
