use super::{
    theme::Theme,
    util::{CURSOR, spinner},
};
use crate::{
    app::{Action, AppContext, AppResult, AppView, CaptureKind, InputCapture, Message},
    cache::FetchError,
    chain,
    components::Component,
    input::{EditOutcome, InputEvent, parse_address},
};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Clear, Paragraph, Wrap},
};
use std::time::Instant;
use tracing::{info, warn};

/// Modal editor for the Safe address and RPC URL. Owns every keystroke while
/// a capture is open.
#[derive(Debug, Default)]
pub struct InputPrompt {
    frame: usize,
}

#[derive(Debug)]
pub enum PromptCommand {
    Input(InputEvent),
    RpcVerified {
        url: String,
        result: Result<u64, FetchError>,
    },
}

impl InputPrompt {
    fn submit(
        kind: CaptureKind,
        value: String,
        ctx: &mut AppContext<'_>,
    ) -> Option<Action> {
        match kind {
            CaptureKind::Address => match parse_address(value.trim()) {
                Some(address) => {
                    ctx.state.ui.capture = None;
                    Some(Action::SafeAddressChanged(address))
                }
                None => {
                    ctx.state.ui.capture = Some(InputCapture::retry(
                        kind,
                        &value,
                        "Invalid Ethereum address format",
                    ));
                    None
                }
            },
            CaptureKind::RpcUrl => {
                let url = value.trim().to_string();
                if let Some(capture) = ctx.state.ui.capture.as_mut() {
                    capture.verifying = Some(url.clone());
                }
                info!(rpc_url = %url, "verifying rpc endpoint");
                ctx.commands.spawn_async(move || async move {
                    let result = chain::with_timeout(chain::fetch_chain_id(&url)).await;
                    Message::RpcVerified { url, result }
                });
                None
            }
        }
    }

    fn verified(
        url: &str,
        result: &Result<u64, FetchError>,
        ctx: &mut AppContext<'_>,
    ) -> Option<Action> {
        let capture = ctx.state.ui.capture.as_ref()?;
        if capture.kind != CaptureKind::RpcUrl || capture.verifying.as_deref() != Some(url) {
            return None;
        }
        match result {
            Ok(chain_id) => {
                ctx.state.ui.capture = None;
                Some(Action::RpcUrlChanged {
                    url: url.to_string(),
                    chain_id: *chain_id,
                })
            }
            Err(err) => {
                warn!(rpc_url = %url, error = %err, "rpc endpoint rejected");
                ctx.state.ui.capture = Some(InputCapture::retry(
                    CaptureKind::RpcUrl,
                    url,
                    format!("Failed to connect to RPC: {err}"),
                ));
                None
            }
        }
    }
}

impl Component for InputPrompt {
    type Command = PromptCommand;

    fn init(&mut self, _ctx: &mut AppContext<'_>) -> AppResult<()> {
        Ok(())
    }

    fn update(
        &mut self,
        command: &Self::Command,
        ctx: &mut AppContext<'_>,
    ) -> AppResult<Option<Action>> {
        match command {
            PromptCommand::Input(event) => {
                let Some(capture) = ctx.state.ui.capture.as_mut() else {
                    return Ok(None);
                };
                if capture.verifying.is_some() {
                    return Ok(None);
                }
                let kind = capture.kind;
                match capture.editor.handle(event.clone(), Instant::now()) {
                    EditOutcome::Submitted(value) => Ok(Self::submit(kind, value, ctx)),
                    _ => Ok(None),
                }
            }
            PromptCommand::RpcVerified { url, result } => Ok(Self::verified(url, result, ctx)),
        }
    }

    fn render(&mut self, frame: &mut Frame<'_>, area: Rect, ctx: &AppView<'_>) {
        let Some(capture) = ctx.state.ui.capture.as_ref() else {
            return;
        };
        let theme = Theme::new(ctx.state.no_colors);
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(0),
                Constraint::Length(7),
                Constraint::Min(0),
            ])
            .split(area);

        let mut value = capture.editor.value().to_string();
        if capture.verifying.is_none() {
            value.push_str(CURSOR);
        }
        let mut lines = vec![
            Line::from(Span::styled(capture.kind.prompt(), theme.muted())),
            Line::from(Span::styled(value, theme.accent())),
        ];
        if let Some(url) = &capture.verifying {
            lines.push(Line::from(Span::styled(
                format!("{} Connecting to {url}...", spinner(self.frame / 5)),
                theme.muted(),
            )));
        } else if capture.editor.is_pasting() {
            lines.push(Line::from(Span::styled("Pasting...", theme.muted())));
        }
        if let Some(warning) = capture.editor.warning() {
            lines.push(Line::from(Span::styled(warning.to_string(), theme.warning())));
        }
        if let Some(error) = capture.editor.error() {
            lines.push(Line::from(Span::styled(error.to_string(), theme.error())));
        }
        lines.push(Line::from(Span::styled(
            "Enter to confirm • Esc to cancel",
            theme.muted(),
        )));

        let title = Line::from(capture.editor.field().label).style(theme.title());
        let widget = Paragraph::new(lines)
            .style(theme.text())
            .wrap(Wrap { trim: false })
            .block(Block::bordered().title(title));
        frame.render_widget(Clear, layout[1]);
        frame.render_widget(widget, layout[1]);
    }

    fn tick(&mut self, ctx: &mut AppContext<'_>) -> AppResult<Option<Action>> {
        self.frame = self.frame.wrapping_add(1);
        if let Some(capture) = ctx.state.ui.capture.as_mut() {
            capture.editor.poll(Instant::now());
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        app::{AppState, CommandBus},
        pairing::{PairingHandle, UriOnlyProvider},
    };
    use std::sync::mpsc;
    use tokio::runtime::Runtime;

    const DEAD: &str = "0x000000000000000000000000000000000000dEaD";

    struct Harness {
        state: AppState,
        pairing: PairingHandle,
        runtime: Runtime,
        sender: mpsc::Sender<Message>,
        _receiver: mpsc::Receiver<Message>,
    }

    impl Harness {
        fn new(kind: CaptureKind) -> Self {
            let mut state = AppState::default();
            state.ui.capture = Some(InputCapture::new(kind));
            let (sender, receiver) = mpsc::channel();
            Self {
                state,
                pairing: PairingHandle::new(None, |id| Box::new(UriOnlyProvider::new(id))),
                runtime: Runtime::new().unwrap(),
                sender,
                _receiver: receiver,
            }
        }

        fn send(&mut self, command: PromptCommand) -> Option<Action> {
            let mut ctx = AppContext {
                state: &mut self.state,
                pairing: &mut self.pairing,
                commands: CommandBus::new(self.sender.clone(), self.runtime.handle().clone()),
            };
            InputPrompt::default().update(&command, &mut ctx).unwrap()
        }
    }

    #[test]
    fn submitted_address_closes_the_prompt() {
        let mut harness = Harness::new(CaptureKind::Address);
        for c in DEAD.chars() {
            assert_eq!(harness.send(PromptCommand::Input(InputEvent::char(c))), None);
        }
        let action = harness.send(PromptCommand::Input(InputEvent::Submit));
        assert_eq!(
            action,
            Some(Action::SafeAddressChanged(parse_address(DEAD).unwrap()))
        );
        assert!(harness.state.ui.capture.is_none());
    }

    #[test]
    fn failed_verification_reopens_with_the_url() {
        let mut harness = Harness::new(CaptureKind::RpcUrl);
        let url = "https://rpc.example";
        if let Some(capture) = harness.state.ui.capture.as_mut() {
            capture.verifying = Some(url.to_string());
        }
        let action = harness.send(PromptCommand::RpcVerified {
            url: url.to_string(),
            result: Err(FetchError::Connectivity("connection refused".into())),
        });
        assert_eq!(action, None);
        let capture = harness.state.ui.capture.as_ref().unwrap();
        assert_eq!(capture.editor.value(), url);
        assert_eq!(
            capture.editor.error(),
            Some("Failed to connect to RPC: connection refused")
        );
        assert!(capture.verifying.is_none());
    }

    #[test]
    fn verification_for_another_url_is_ignored() {
        let mut harness = Harness::new(CaptureKind::RpcUrl);
        if let Some(capture) = harness.state.ui.capture.as_mut() {
            capture.verifying = Some("https://current.example".into());
        }
        let action = harness.send(PromptCommand::RpcVerified {
            url: "https://old.example".into(),
            result: Ok(1),
        });
        assert_eq!(action, None);
        assert!(harness.state.ui.capture.is_some());

        let action = harness.send(PromptCommand::RpcVerified {
            url: "https://current.example".into(),
            result: Ok(1),
        });
        assert_eq!(
            action,
            Some(Action::RpcUrlChanged {
                url: "https://current.example".into(),
                chain_id: 1
            })
        );
    }

    #[test]
    fn typing_is_locked_while_verifying() {
        let mut harness = Harness::new(CaptureKind::RpcUrl);
        if let Some(capture) = harness.state.ui.capture.as_mut() {
            capture.verifying = Some("https://rpc.example".into());
        }
        harness.send(PromptCommand::Input(InputEvent::char('x')));
        assert_eq!(harness.state.ui.capture.as_ref().unwrap().editor.value(), "");
    }
}
