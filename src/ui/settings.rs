use super::theme::Theme;
use crate::{
    app::{Action, AppContext, AppResult, AppView},
    components::Component,
};
use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Paragraph, Wrap},
};
use std::time::Instant;

#[derive(Debug, Default)]
pub struct Settings;

impl Component for Settings {
    type Command = ();

    fn init(&mut self, _ctx: &mut AppContext<'_>) -> AppResult<()> {
        Ok(())
    }

    fn update(
        &mut self,
        _command: &Self::Command,
        _ctx: &mut AppContext<'_>,
    ) -> AppResult<Option<Action>> {
        Ok(None)
    }

    fn render(&mut self, frame: &mut Frame<'_>, area: Rect, ctx: &AppView<'_>) {
        let theme = Theme::new(ctx.state.no_colors);
        let state = ctx.state;
        let unset = || Span::styled("not set", theme.warning());

        let address = match state.safe_config.address {
            Some(address) => Span::styled(address.to_checksum(None), theme.accent()),
            None => unset(),
        };
        let rpc_url = match state.network.rpc_url.as_deref() {
            Some(url) => Span::styled(url.to_string(), theme.accent()),
            None => unset(),
        };
        let chain_id = match state.chain_id(Instant::now()) {
            Some(id) => Span::styled(id.to_string(), theme.value()),
            None => Span::styled("unknown", theme.muted()),
        };

        let lines = vec![
            Line::from(vec![Span::styled("Safe address  ", theme.muted()), address]),
            Line::from(vec![Span::styled("RPC URL       ", theme.muted()), rpc_url]),
            Line::from(vec![Span::styled("Chain ID      ", theme.muted()), chain_id]),
            Line::from(""),
            Line::from(Span::styled(
                "Press a to change the Safe address, r to change the RPC URL.",
                theme.muted(),
            )),
        ];
        let widget = Paragraph::new(lines)
            .style(theme.text())
            .wrap(Wrap { trim: false })
            .block(Block::bordered().title(Line::from("Settings").style(theme.title())));
        frame.render_widget(widget, area);
    }

    fn tick(&mut self, _ctx: &mut AppContext<'_>) -> AppResult<Option<Action>> {
        Ok(None)
    }
}
