mod cli;
mod config;
mod error;
mod logging;

use clap::{CommandFactory, Parser};
use tracing::error;

use antibox_core::Reconciler;

use crate::cli::Cli;
use crate::config::{LogSettings, Targets};
use crate::error::{CliError, exit_code};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // clap exits with status 2 on usage errors
    let cli = Cli::parse();

    let file = match config::load_file(&cli) {
        Ok(file) => file,
        Err(err) => {
            let code = err.exit_code();
            eprintln!("{:?}", miette::Report::new(err));
            std::process::exit(code);
        }
    };

    let log = LogSettings::resolve(&cli, &file);
    let guard = logging::init(log.verbosity, &log.dir);
    log.report();

    let code = match run(&cli, &file).await {
        Ok(()) => exit_code::SUCCESS,
        Err(err) => {
            if let CliError::MissingTarget { ref source } = err {
                // Help goes to stdout like the rest of the output
                if let Err(e) = print_usage(&mut std::io::stdout()) {
                    error!("MAIN => Cannot print usage: {e}");
                }
                error!("{err}");
                error!("{source}");
            } else if !err.already_reported() {
                error!("{err}");
                eprintln!("{:?}", miette::Report::new(err));
            }
            exit_code::FAILURE
        }
    };

    // Flush the file sink before exiting
    drop(guard);
    std::process::exit(code);
}

/// Write the full help text to `out`.
fn print_usage(out: &mut impl std::io::Write) -> std::io::Result<()> {
    write!(out, "{}", Cli::command().render_help())?;
    out.flush()
}

async fn run(cli: &Cli, file: &antibox_config::Config) -> Result<(), CliError> {
    let targets = config::resolve_targets(cli, file)?;
    let reconciler = Reconciler::new(config::reconcile_config(cli, file)?)?;

    match targets {
        Targets::Single(entry) => reconciler
            .run(&entry)
            .await
            .map(drop)
            .map_err(|_| CliError::UpdateFailed {
                failed: 1,
                total: 1,
            }),
        Targets::Batch(entries) => {
            let report = reconciler.run_all(&entries).await;
            if report.is_success() {
                Ok(())
            } else {
                Err(CliError::UpdateFailed {
                    failed: report.failures(),
                    total: report.len(),
                })
            }
        }
    }
}
