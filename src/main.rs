mod app;
mod cache;
mod chain;
mod cli;
mod components;
mod errors;
mod form;
mod input;
mod logging;
mod pairing;
mod ui;

use color_eyre::Result;
use crossterm::{event::EnableBracketedPaste, execute};
use tracing::info;

fn main() -> Result<()> {
    errors::install_hooks()?;
    let args = cli::Args::parse_args();
    let log_path = logging::init(args.debug)?;
    info!(log = %log_path.display(), "starting safe-terminal");

    let config = args.config();
    let terminal = ratatui::init();
    let result: Result<()> = execute!(std::io::stdout(), EnableBracketedPaste)
        .map_err(color_eyre::Report::from)
        .and_then(|_| app::App::new(config))
        .and_then(|app| app.run(terminal));
    errors::restore_terminal();
    result
}
