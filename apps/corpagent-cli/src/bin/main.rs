use clap::Parser;

use corpagent_cli::commands;
use corpagent_cli::logging::init_tracing;
use corpagent_cli::Cli;

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    commands::run(cli, &mut out)
}
