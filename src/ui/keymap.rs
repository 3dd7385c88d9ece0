use super::theme::Theme;
use crate::{
    app::{Action, ActiveView, AppContext, AppResult, AppView},
    components::Component,
    pairing::WalletSession,
};
use ratatui::{
    Frame,
    layout::Rect,
    text::Line,
    widgets::{Block, Paragraph},
};

#[derive(Debug, Default)]
pub struct KeymapBar;

impl KeymapBar {
    fn hints(ctx: &AppView<'_>) -> &'static str {
        let state = ctx.state;
        if let Some(capture) = &state.ui.capture {
            return if capture.verifying.is_some() {
                "Verifying… • Ctrl-C Quit"
            } else {
                "Enter Confirm • Esc Cancel • Ctrl-C Quit"
            };
        }
        match state.ui.active_view {
            ActiveView::Dashboard => "q Quit • 1-4/Tab Switch view • r Refresh Safe data",
            ActiveView::TransactionBuilder => {
                "Enter Next • ↑/↓ Select function • Esc Start over • Tab Switch view • Ctrl-C Quit"
            }
            ActiveView::WalletPairing => match state.wallet.session {
                WalletSession::Paired { .. } => {
                    "q Quit • 1-4/Tab Switch view • d Disconnect • r Refresh chain data"
                }
                _ => "q Quit • 1-4/Tab Switch view • c Connect • d Cancel • r Refresh chain data",
            },
            ActiveView::Settings => {
                "q Quit • 1-4/Tab Switch view • a Change address • r Change RPC URL"
            }
        }
    }
}

impl Component for KeymapBar {
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
        let widget = Paragraph::new(Line::from(Self::hints(ctx)))
            .style(theme.text())
            .block(Block::bordered().title(Line::from("Keymap").style(theme.title())));
        frame.render_widget(widget, area);
    }

    fn tick(&mut self, _ctx: &mut AppContext<'_>) -> AppResult<Option<Action>> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{AppState, CaptureKind, InputCapture};

    #[test]
    fn capture_hints_replace_view_hints() {
        let mut state = AppState::default();
        assert!(KeymapBar::hints(&AppView { state: &state }).contains("r Refresh Safe data"));

        state.ui.capture = Some(InputCapture::new(CaptureKind::RpcUrl));
        assert!(KeymapBar::hints(&AppView { state: &state }).starts_with("Enter Confirm"));
    }
}
