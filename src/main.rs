//! CLI entry point for hex terrain generation

use clap::Parser;
use hexcollapse::io::cli::{Cli, MapProcessor};

fn main() -> hexcollapse::Result<()> {
    let cli = Cli::parse();
    let mut processor = MapProcessor::new(cli);
    processor.process()
}
