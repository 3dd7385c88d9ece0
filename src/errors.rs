use crate::logging::log_panic;
use color_eyre::{config::HookBuilder, eyre::Result};
use crossterm::{event::DisableBracketedPaste, execute};
use std::{io, panic};

/// Puts the terminal back into cooked mode.
pub fn restore_terminal() {
    if let Err(err) = execute!(io::stdout(), DisableBracketedPaste) {
        eprintln!("Failed to disable bracketed paste: {err}");
    }
    ratatui::restore();
}

/// Install panic and error hooks. The panic hook restores the terminal before
/// the report is printed.
pub fn install_hooks() -> Result<()> {
    let (panic_hook, eyre_hook) = HookBuilder::default()
        .panic_section("This is a bug. Consider reporting it with the log file attached.")
        .capture_span_trace_by_default(false)
        .display_location_section(true)
        .display_env_section(false)
        .into_hooks();

    let panic_hook = panic_hook.into_panic_hook();
    panic::set_hook(Box::new(move |panic_info| {
        log_panic(panic_info);
        restore_terminal();
        panic_hook(panic_info);
    }));

    eyre_hook.install()?;
    Ok(())
}
