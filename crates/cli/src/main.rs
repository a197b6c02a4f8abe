// hgnotify CLI entry point.

use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod commands;
mod exit_code;
mod hgrc;
mod output;

use exit_code::ExitCode;

#[derive(Parser)]
#[command(name = "hgnotify", version, about = "Notify a build server about Mercurial commits")]
struct Cli {
    #[command(subcommand)]
    command: commands::Command,
}

fn main() -> process::ExitCode {
    let cli = Cli::parse();
    init_tracing();

    let format = cli.command.output_format();
    match commands::run(cli.command) {
        Ok(()) => ExitCode::Success.into(),
        Err(error) => {
            output::print_error(format, &error);
            ExitCode::from_error(&error).into()
        }
    }
}

// Hook output is shown by hg on the committer's terminal: log to stderr,
// quiet unless RUST_LOG asks for more.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}
