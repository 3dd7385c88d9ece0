use super::{theme::Theme, util::short_address};
use crate::{
    app::{Action, AppContext, AppResult, AppView},
    components::Component,
    pairing::{PROJECT_ID_ENV, PairingEvent, WalletSession, qr},
};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Paragraph, Wrap},
};
use tracing::warn;

/// WalletConnect pairing view: shows the pairing QR code and the connected account.
#[derive(Debug, Default)]
pub struct WalletPairing {
    /// Rendered QR for the URI it was built from.
    qr: Option<(String, Vec<String>)>,
}

#[derive(Debug)]
pub enum WalletPairingCommand {
    Connect,
    Disconnect,
    Event(PairingEvent),
}

impl WalletPairing {
    fn refresh_qr(&mut self, session: &WalletSession) {
        let Some(uri) = session.pairing_uri() else {
            self.qr = None;
            return;
        };
        if self.qr.as_ref().is_some_and(|(cached, _)| cached == uri) {
            return;
        }
        self.qr = match qr::render_lines(uri) {
            Ok(lines) => Some((uri.to_string(), lines)),
            Err(err) => {
                warn!(error = %err, "failed to render pairing QR code");
                None
            }
        };
    }

    fn status<'a>(ctx: &AppView<'_>, theme: Theme) -> Vec<Line<'a>> {
        let wallet = &ctx.state.wallet;
        let mut lines = Vec::new();
        if !wallet.pairing_available {
            lines.push(Line::from(Span::styled(
                format!("Wallet pairing unavailable: set {PROJECT_ID_ENV} to enable WalletConnect."),
                theme.warning(),
            )));
            return lines;
        }
        match &wallet.session {
            WalletSession::Unpaired => {
                lines.push(Line::from(Span::styled("No wallet connected.", theme.muted())));
                lines.push(Line::from("Press c to start pairing."));
            }
            WalletSession::Pairing { uri } => {
                lines.push(Line::from("Scan the QR code with a WalletConnect wallet."));
                lines.push(Line::from(Span::styled(uri.clone(), theme.muted())));
                lines.push(Line::from("Press d to cancel."));
            }
            WalletSession::Paired { address, chain_id } => {
                lines.push(Line::from(Span::styled("Wallet connected", theme.success())));
                lines.push(Line::from(vec![
                    Span::styled("Account: ", theme.muted()),
                    Span::styled(address.to_checksum(None), theme.accent()),
                    Span::styled(format!(" ({})", short_address(address)), theme.muted()),
                ]));
                lines.push(Line::from(vec![
                    Span::styled("Chain:   ", theme.muted()),
                    Span::styled(chain_id.to_string(), theme.value()),
                ]));
                lines.push(Line::from("Press d to disconnect."));
            }
        }
        if let Some(error) = &wallet.last_error {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(error.clone(), theme.error())));
        }
        lines
    }
}

impl Component for WalletPairing {
    type Command = WalletPairingCommand;

    fn init(&mut self, ctx: &mut AppContext<'_>) -> AppResult<()> {
        ctx.state.wallet.pairing_available = ctx.pairing.is_available();
        Ok(())
    }

    fn update(
        &mut self,
        command: &Self::Command,
        ctx: &mut AppContext<'_>,
    ) -> AppResult<Option<Action>> {
        let wallet = &mut ctx.state.wallet;
        match command {
            WalletPairingCommand::Connect => {
                if wallet.session.is_paired() {
                    return Ok(None);
                }
                wallet.last_error = None;
                if let Err(err) = ctx.pairing.connect(ctx.commands.pairing_sink()) {
                    warn!(error = %err, "wallet pairing failed");
                    wallet.last_error = Some(err.to_string());
                }
            }
            WalletPairingCommand::Disconnect => {
                if let Err(err) = ctx.pairing.disconnect() {
                    warn!(error = %err, "wallet disconnect failed");
                    wallet.last_error = Some(err.to_string());
                }
                wallet.session = WalletSession::Unpaired;
            }
            WalletPairingCommand::Event(event) => {
                wallet.session.apply(event.clone());
                if wallet.session.is_paired() {
                    wallet.last_error = None;
                }
            }
        }
        self.refresh_qr(&ctx.state.wallet.session);
        Ok(None)
    }

    fn render(&mut self, frame: &mut Frame<'_>, area: Rect, ctx: &AppView<'_>) {
        let theme = Theme::new(ctx.state.no_colors);
        let block = Block::bordered().title(Line::from("WalletConnect").style(theme.title()));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let status = Paragraph::new(Self::status(ctx, theme))
            .style(theme.text())
            .wrap(Wrap { trim: false });
        let Some((_, lines)) = &self.qr else {
            frame.render_widget(status, inner);
            return;
        };

        let qr_width = qr::width(lines) as u16;
        let layout = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(qr_width + 2), Constraint::Min(10)])
            .split(inner);
        let code: Vec<Line> = lines.iter().map(|line| Line::from(line.clone())).collect();
        frame.render_widget(Paragraph::new(code), layout[0]);
        frame.render_widget(status, layout[1]);
    }

    fn tick(&mut self, _ctx: &mut AppContext<'_>) -> AppResult<Option<Action>> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qr_follows_the_session_uri() {
        let mut view = WalletPairing::default();
        view.refresh_qr(&WalletSession::Pairing {
            uri: "wc:abc@2?relay-protocol=irn&symKey=00".into(),
        });
        assert!(view.qr.is_some());

        view.refresh_qr(&WalletSession::Unpaired);
        assert!(view.qr.is_none());
    }
}
