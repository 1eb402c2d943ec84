use clap::Parser;
use std::process::ExitCode;

use pyswap::{KNOWN_VERSIONS, SwitchOptions, Switcher, init_logging};

#[derive(Debug, Parser)]
#[command(
    name = "pyswap",
    version,
    about = "Switch the active Python interpreter of this notebook session"
)]
struct Cli {
    /// Target version as major.minor, e.g. 3.11
    #[arg(required_unless_present = "list")]
    version: Option<String>,

    /// Install the uv package manager once pip is bootstrapped
    #[arg(long)]
    uv: bool,

    /// Skip the automatic session restart and only report the outcome
    #[arg(long)]
    no_restart: bool,

    /// Print the outcome as JSON
    #[arg(long)]
    json: bool,

    /// List the interpreters installed on this host and exit
    #[arg(long)]
    list: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let switcher = Switcher::colab();

    if cli.list {
        return list_interpreters(&switcher).await;
    }

    let options = SwitchOptions {
        install_uv: cli.uv,
        auto_restart: !cli.no_restart,
    };
    let version = cli.version.as_deref().unwrap_or_default();

    match switcher.switch(version, options).await {
        Ok(outcome) => {
            if cli.json {
                match serde_json::to_string_pretty(&outcome) {
                    Ok(json) => println!("{json}"),
                    Err(error) => {
                        eprintln!("failed to serialize outcome: {error}");
                        return ExitCode::FAILURE;
                    }
                }
                return ExitCode::SUCCESS;
            }

            println!("Switched to Python {}", outcome.applied);
            println!("  pip installed: {}", outcome.pip_installed);
            if cli.uv {
                println!("  uv installed:  {}", outcome.uv_installed);
            }
            for warning in &outcome.warnings {
                println!("  warning: {warning}");
            }
            if !outcome.restarted {
                println!("Restart the session for the switch to take effect process-wide.");
            }
            ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!("error: {error}");
            eprintln!(
                "routinely exercised versions: {}",
                KNOWN_VERSIONS
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            ExitCode::FAILURE
        }
    }
}

async fn list_interpreters(switcher: &Switcher) -> ExitCode {
    match switcher.installed().await {
        Ok(interpreters) => {
            if interpreters.is_empty() {
                println!("no pythonX.Y interpreters found on this host");
                return ExitCode::SUCCESS;
            }
            for interpreter in interpreters {
                let marker = if interpreter.is_registered_alternative {
                    "*"
                } else {
                    " "
                };
                println!(
                    "{marker} {:<6} {}",
                    interpreter.version.to_string(),
                    interpreter.path.display()
                );
            }
            ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}
