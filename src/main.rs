// Entrypoint for the CLI application.
// - Logs go to stderr (filter via `RUST_LOG`, default `warn`) so they never
//   mix with streamed answers on stdout.
// - Load the config, build the API client and hand it to the menu loop.

use chatpdf_cli::{api::ApiClient, config::Config, ui::main_menu};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    let config = Config::load()?;
    let api = ApiClient::new(&config)?;

    // Blocks until the user picks "終了".
    main_menu(api)?;
    Ok(())
}
