mod commands;
mod terminal;

use commands::{CommandLine, sweep};
use terminal::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CommandLine::parse_args();

    logging::init_logging(cli.verbose, cli.quiet)?;

    sweep::sweep(&cli).await
}
