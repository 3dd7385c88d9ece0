use super::{
    theme::Theme,
    util::{millis, short_address},
};
use crate::{
    app::{Action, AppContext, AppResult, AppView, RemoteValue, Resource},
    cache::QueryState,
    components::Component,
    pairing::WalletSession,
};
use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Paragraph},
};
use std::time::Instant;

/// Network and wallet status shown above every view.
#[derive(Debug)]
pub struct Header {
    title: String,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            title: concat!("safe-terminal v", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Header {
    fn network_line<'a>(ctx: &AppView<'_>, theme: Theme, now: Instant) -> Line<'a> {
        let state = ctx.state;
        let Some(rpc_url) = state.network.rpc_url.as_deref() else {
            return Line::from(Span::styled("RPC URL not set", theme.warning()));
        };

        let mut spans = vec![Span::raw("Chain ID: ")];
        spans.push(match state.chain_id(now) {
            Some(id) => Span::styled(id.to_string(), theme.value()),
            None => Span::styled("…", theme.muted()),
        });
        spans.push(Span::raw("  Current Block: "));
        spans.push(match state.block_number(now) {
            Some(block) => Span::styled(block.to_string(), theme.accent()),
            None => Span::styled("Loading...", theme.muted()),
        });

        let health = state
            .chain_target(Resource::RpcHealth)
            .and_then(|target| state.remote.peek(&target, now));
        spans.push(Span::raw("  RPC: "));
        spans.push(match health {
            Some(QueryState::Ready {
                value: RemoteValue::Health(health),
                ..
            }) if health.healthy => {
                Span::styled(format!("healthy ({})", millis(health.latency)), theme.success())
            }
            Some(QueryState::Ready {
                value: RemoteValue::Health(_),
                ..
            }) => Span::styled("unreachable", theme.error()),
            Some(QueryState::Failed { error, .. }) => {
                Span::styled(format!("error: {error}"), theme.error())
            }
            _ => Span::styled("checking", theme.muted()),
        });

        if state.network.block_polling {
            spans.push(Span::styled("  ●", theme.success()));
            spans.push(Span::raw(" Real-time updates"));
        }
        spans.push(Span::styled(format!("  {rpc_url}"), theme.muted()));
        Line::from(spans)
    }

    fn wallet_line<'a>(ctx: &AppView<'_>, theme: Theme) -> Line<'a> {
        let safe = match ctx.state.safe_config.address {
            Some(address) => Span::styled(short_address(&address), theme.accent()),
            None => Span::styled("not set", theme.warning()),
        };
        let wallet = match &ctx.state.wallet.session {
            WalletSession::Paired { address, chain_id } => Span::styled(
                format!("{} (chain {chain_id})", short_address(address)),
                theme.success(),
            ),
            WalletSession::Pairing { .. } => Span::styled("pairing…", theme.value()),
            WalletSession::Unpaired => Span::styled("not connected", theme.muted()),
        };
        Line::from(vec![Span::raw("Safe: "), safe, Span::raw("  Wallet: "), wallet])
    }
}

impl Component for Header {
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
        let now = Instant::now();
        let lines = vec![
            Self::network_line(ctx, theme, now),
            Self::wallet_line(ctx, theme),
        ];
        let widget = Paragraph::new(lines).style(theme.text()).block(
            Block::bordered().title(Line::from(self.title.as_str()).style(theme.title())),
        );
        frame.render_widget(widget, area);
    }

    fn tick(&mut self, ctx: &mut AppContext<'_>) -> AppResult<Option<Action>> {
        for resource in [Resource::ChainId, Resource::BlockNumber, Resource::RpcHealth] {
            if let Some(target) = ctx.state.chain_target(resource) {
                ctx.query(&target);
            }
        }
        Ok(None)
    }
}
