use super::{
    theme::Theme,
    util::{short_address, spinner},
};
use crate::{
    app::{Action, AppContext, AppResult, AppView, RemoteValue, Resource},
    cache::QueryState,
    components::Component,
};
use alloy::primitives::Address;
use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Paragraph, Wrap},
};
use std::time::Instant;

/// Safe overview: owners, threshold, nonce, version and deployment status.
#[derive(Debug, Default)]
pub struct Dashboard {
    frame: usize,
}

impl Dashboard {
    fn label(resource: Resource) -> &'static str {
        match resource {
            Resource::SafeOwners => "Owners",
            Resource::SafeThreshold => "Threshold",
            Resource::SafeNonce => "Nonce",
            Resource::SafeDeployment => "Deployed",
            Resource::SafeVersion => "Version",
            _ => "",
        }
    }

    fn format_value(value: &RemoteValue, owners: usize) -> String {
        match value {
            RemoteValue::Threshold(threshold) if owners > 0 => {
                format!("{threshold} of {owners}")
            }
            RemoteValue::Threshold(threshold) | RemoteValue::Nonce(threshold) => {
                threshold.to_string()
            }
            RemoteValue::Deployed(true) => "yes".into(),
            RemoteValue::Deployed(false) => "no contract at this address".into(),
            RemoteValue::Version(version) => version.clone(),
            RemoteValue::Owners(list) => list.len().to_string(),
            other => format!("{other:?}"),
        }
    }

    fn owners(state: Option<&QueryState<RemoteValue>>) -> Vec<Address> {
        match state.and_then(QueryState::value) {
            Some(RemoteValue::Owners(owners)) => owners.clone(),
            _ => Vec::new(),
        }
    }

    fn row<'a>(
        &self,
        resource: Resource,
        state: Option<&QueryState<RemoteValue>>,
        owners: usize,
        theme: Theme,
    ) -> Line<'a> {
        let mut spans = vec![Span::styled(
            format!("{:<10} ", Self::label(resource)),
            theme.muted(),
        )];
        match state {
            Some(QueryState::Ready { value, stale }) => {
                spans.push(Span::styled(Self::format_value(value, owners), theme.value()));
                if *stale {
                    spans.push(Span::styled(" (refreshing)", theme.muted()));
                }
            }
            Some(QueryState::Failed { error, previous }) => {
                if let Some(value) = previous {
                    spans.push(Span::styled(
                        format!("{} ", Self::format_value(value, owners)),
                        theme.value(),
                    ));
                }
                spans.push(Span::styled(error.to_string(), theme.error()));
                spans.push(Span::styled("  Press r to retry", theme.muted()));
            }
            Some(QueryState::Pending { previous: Some(value) }) => {
                spans.push(Span::styled(Self::format_value(value, owners), theme.value()));
                spans.push(Span::styled(format!(" {}", spinner(self.frame / 5)), theme.muted()));
            }
            Some(QueryState::Pending { previous: None }) | None => {
                spans.push(Span::styled(
                    format!("{} Loading...", spinner(self.frame / 5)),
                    theme.muted(),
                ));
            }
        }
        Line::from(spans)
    }

    fn unconfigured<'a>(ctx: &AppView<'_>, theme: Theme) -> Option<Vec<Line<'a>>> {
        let state = ctx.state;
        let mut lines = Vec::new();
        if state.safe_config.address.is_none() {
            lines.push(Line::from(Span::styled("Safe address not set.", theme.warning())));
        }
        if state.network.rpc_url.is_none() {
            lines.push(Line::from(Span::styled("RPC URL not set.", theme.warning())));
        }
        if lines.is_empty() {
            return None;
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Open Settings [4] and press a or r to configure.",
            theme.muted(),
        )));
        Some(lines)
    }
}

impl Component for Dashboard {
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
        let block = Block::bordered().title(Line::from("Safe Dashboard").style(theme.title()));

        let lines = match Self::unconfigured(ctx, theme) {
            Some(lines) => lines,
            None => {
                let now = Instant::now();
                let states: Vec<_> = Resource::SAFE
                    .iter()
                    .map(|resource| {
                        ctx.state
                            .safe_target(*resource)
                            .and_then(|target| ctx.state.remote.peek(&target, now))
                    })
                    .collect();
                let owners = Self::owners(states[0].as_ref());

                let mut lines = Vec::new();
                if let Some(address) = ctx.state.safe_config.address {
                    lines.push(Line::from(vec![
                        Span::styled(format!("{:<10} ", "Address"), theme.muted()),
                        Span::styled(address.to_checksum(None), theme.accent()),
                    ]));
                }
                for (resource, state) in Resource::SAFE.iter().zip(&states) {
                    lines.push(self.row(*resource, state.as_ref(), owners.len(), theme));
                }
                if !owners.is_empty() {
                    lines.push(Line::from(""));
                    lines.push(Line::from(Span::styled("Owners", theme.title())));
                    for (index, owner) in owners.iter().enumerate() {
                        lines.push(Line::from(vec![
                            Span::styled(format!("  {}. ", index + 1), theme.muted()),
                            Span::styled(owner.to_checksum(None), theme.text()),
                            Span::styled(format!("  ({})", short_address(owner)), theme.muted()),
                        ]));
                    }
                }
                lines
            }
        };

        let widget = Paragraph::new(lines)
            .style(theme.text())
            .wrap(Wrap { trim: false })
            .block(block);
        frame.render_widget(widget, area);
    }

    fn tick(&mut self, ctx: &mut AppContext<'_>) -> AppResult<Option<Action>> {
        self.frame = self.frame.wrapping_add(1);
        for resource in Resource::SAFE {
            if let Some(target) = ctx.state.safe_target(resource) {
                ctx.query(&target);
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::FetchError;

    #[test]
    fn threshold_reads_as_m_of_n() {
        assert_eq!(Dashboard::format_value(&RemoteValue::Threshold(2), 3), "2 of 3");
        assert_eq!(Dashboard::format_value(&RemoteValue::Threshold(2), 0), "2");
        assert_eq!(Dashboard::format_value(&RemoteValue::Nonce(7), 3), "7");
    }

    #[test]
    fn failures_offer_retry() {
        let dashboard = Dashboard::default();
        let state = QueryState::Failed {
            error: FetchError::Contract("execution reverted".into()),
            previous: None,
        };
        let line = dashboard.row(Resource::SafeNonce, Some(&state), 0, Theme::new(true));
        let text: String = line.spans.iter().map(|span| span.content.as_ref()).collect();
        assert!(text.contains("execution reverted"));
        assert!(text.contains("Press r to retry"));
    }
}
