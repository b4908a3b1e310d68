//! Just `main()`. Keep as small as possible.

pub mod cli_args;
pub mod config;
pub mod run;
pub mod snapshot;
pub mod surface;
pub mod terminal;

use color_eyre::eyre::Result;

#[expect(
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::exit,
    reason = "It's our central place for communicating with the user on CLI"
)]
#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let setup = run::setup()?;
    let log_path = setup.config.log_path.clone();
    let is_logging = setup.is_logging;

    let result = run::run(setup).await;
    tracing::debug!("Falling Circles is exiting");

    match result {
        Ok(()) => {
            if is_logging {
                println!("Logs saved to {}", log_path.display());
            }
        }
        Err(error) => {
            tracing::error!("{error:?}");
            eprintln!("Error: {error}");
            if is_logging {
                eprintln!("See {} for more details", log_path.display());
            }
            std::process::exit(1);
        }
    }

    Ok(())
}
