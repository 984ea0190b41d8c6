use std::process::ExitCode;

use reviewprompt::{Dispatcher, GitHub, SystemClipboard, TerminalPicker, parse_args, resolve_token};

fn handle_clap_help_version(clap_err: &clap::Error) -> ExitCode {
    use clap::error::ErrorKind;
    match clap_err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            print!("{clap_err}");
            ExitCode::SUCCESS
        }
        _ => {
            eprint!("{clap_err}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

async fn run() -> anyhow::Result<()> {
    let command = parse_args(std::env::args())?;

    let github = GitHub::new(resolve_token())?;
    let mut stdout = std::io::stdout();
    let mut stderr = std::io::stderr();

    Dispatcher::new(&github, &TerminalPicker, &SystemClipboard)
        .run(&command, &mut stdout, &mut stderr)
        .await
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if let Some(clap_err) = err.downcast_ref::<clap::Error>() {
                return handle_clap_help_version(clap_err);
            }
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
