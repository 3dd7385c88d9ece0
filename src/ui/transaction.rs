use super::{
    theme::Theme,
    util::{CURSOR, short_address, spinner},
};
use crate::{
    app::{Action, AppContext, AppResult, AppView, Message},
    cache::FetchError,
    chain::{self, encoder},
    components::Component,
    form::{
        NO_WRITE_FUNCTIONS, TransactionWizard, ValidationTicket, WizardContext, WizardError,
        WizardInput, WizardOutcome, WizardStep,
    },
    input::LineEditor,
};
use alloy::json_abi::{Function, StateMutability};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, List, ListItem, ListState, Paragraph, Wrap},
};
use std::time::Instant;
use tracing::{debug, info};

const STEPS: [WizardStep; 4] = [
    WizardStep::ContractAddress,
    WizardStep::Abi,
    WizardStep::Function,
    WizardStep::Parameters,
];

/// Contract-call builder view.
#[derive(Debug, Default)]
pub struct TransactionBuilder {
    wizard: TransactionWizard,
    frame: usize,
}

#[derive(Debug)]
pub enum TransactionCommand {
    Input(WizardInput),
    Cancel,
    CodeChecked {
        ticket: ValidationTicket,
        result: Result<bool, FetchError>,
    },
}

impl TransactionBuilder {
    pub fn captures_text(&self) -> bool {
        self.wizard.captures_text()
    }

    fn wizard_context(ctx: &AppContext<'_>) -> WizardContext {
        WizardContext {
            rpc_configured: ctx.state.network.rpc_url.is_some(),
            wallet_paired: ctx.state.wallet.session.is_paired(),
        }
    }

    fn progress<'a>(&self, theme: Theme) -> Line<'a> {
        let current = self.wizard.step();
        let mut spans = Vec::new();
        for (index, step) in STEPS.iter().enumerate() {
            if index > 0 {
                spans.push(Span::styled(" › ", theme.muted()));
            }
            let style = if *step == current {
                theme.selected()
            } else {
                theme.muted()
            };
            spans.push(Span::styled(format!("{}. {}", index + 1, step.title()), style));
        }
        Line::from(spans)
    }

    fn editor_lines<'a>(editor: &LineEditor, active: bool, theme: Theme) -> Vec<Line<'a>> {
        let mut value = editor.value().to_string();
        if active {
            value.push_str(CURSOR);
        }
        let mut lines = vec![Line::from(vec![
            Span::styled(format!("{}: ", editor.field().label), theme.muted()),
            Span::styled(value, if active { theme.accent() } else { theme.value() }),
        ])];
        if editor.is_pasting() {
            lines.push(Line::from(Span::styled("Pasting...", theme.muted())));
        }
        if let Some(warning) = editor.warning() {
            lines.push(Line::from(Span::styled(warning.to_string(), theme.warning())));
        }
        if let Some(error) = editor.error() {
            lines.push(Line::from(Span::styled(error.to_string(), theme.error())));
        }
        lines
    }

    fn summary<'a>(&self, theme: Theme) -> Vec<Line<'a>> {
        let mut lines = Vec::new();
        if let Some(contract) = self.wizard.contract() {
            lines.push(Line::from(vec![
                Span::styled("Contract: ", theme.muted()),
                Span::styled(contract.to_checksum(None), theme.accent()),
            ]));
        }
        if let Some(abi) = self.wizard.abi() {
            lines.push(Line::from(vec![
                Span::styled("ABI: ", theme.muted()),
                Span::styled(
                    format!(
                        "{} functions, {} callable",
                        abi.functions().len(),
                        self.wizard.functions().len()
                    ),
                    theme.value(),
                ),
            ]));
        }
        lines
    }

    fn body<'a>(&self, theme: Theme) -> Vec<Line<'a>> {
        let mut lines = self.summary(theme);
        if !lines.is_empty() {
            lines.push(Line::from(""));
        }
        match self.wizard.step() {
            WizardStep::ContractAddress => {
                lines.push(Line::from("Enter the contract address and press Enter."));
                lines.extend(Self::editor_lines(self.wizard.editor(), true, theme));
                if self.wizard.is_validating() {
                    lines.push(Line::from(Span::styled(
                        format!("{} Checking contract deployment...", spinner(self.frame / 5)),
                        theme.muted(),
                    )));
                }
            }
            WizardStep::Abi => {
                lines.push(Line::from("Paste the contract ABI as JSON and press Enter."));
                lines.extend(Self::editor_lines(self.wizard.editor(), true, theme));
            }
            WizardStep::Function => {
                lines.push(Line::from("Select a function with ↑/↓ and press Enter."));
            }
            WizardStep::Parameters => {
                if let Some(function) = self.wizard.selected_function() {
                    lines.push(Line::from(vec![
                        Span::styled("Function: ", theme.muted()),
                        Span::styled(encoder::signature_preview(function), theme.accent()),
                    ]));
                    let prepared = self.wizard.prepared().is_some();
                    for (index, editor) in self.wizard.parameters().iter().enumerate() {
                        let active = !prepared && index == self.wizard.active_parameter();
                        let ty = function
                            .inputs
                            .get(index)
                            .map(|param| param.ty.as_str())
                            .unwrap_or_default();
                        let mut value = editor.value().to_string();
                        if active {
                            value.push_str(CURSOR);
                        }
                        lines.push(Line::from(vec![
                            Span::styled(
                                format!("{} ({ty}): ", encoder::input_label(function, index)),
                                theme.muted(),
                            ),
                            Span::styled(value, if active { theme.accent() } else { theme.value() }),
                        ]));
                        if active {
                            if let Some(warning) = editor.warning() {
                                lines.push(Line::from(Span::styled(
                                    warning.to_string(),
                                    theme.warning(),
                                )));
                            }
                        }
                    }
                }
            }
        }

        match self.wizard.error() {
            Some(WizardError::Precondition(message)) => {
                lines.push(Line::from(Span::styled(message.clone(), theme.warning())));
            }
            Some(WizardError::Validation(message)) => {
                lines.push(Line::from(Span::styled(message.clone(), theme.error())));
            }
            None => {}
        }

        if let Some(tx) = self.wizard.prepared() {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled("Transaction prepared", theme.success())));
            lines.push(Line::from(vec![
                Span::styled("To:    ", theme.muted()),
                Span::styled(
                    format!("{} ({})", tx.to.to_checksum(None), short_address(&tx.to)),
                    theme.value(),
                ),
            ]));
            lines.push(Line::from(vec![
                Span::styled("Value: ", theme.muted()),
                Span::styled(tx.value.to_string(), theme.value()),
            ]));
            lines.push(Line::from(vec![
                Span::styled("Data:  ", theme.muted()),
                Span::styled(tx.data.to_string(), theme.value()),
            ]));
            lines.push(Line::from(Span::styled(
                "Press Esc to build another transaction.",
                theme.muted(),
            )));
        }
        lines
    }

    fn function_label(function: &Function) -> String {
        let signature = encoder::signature_preview(function);
        if function.state_mutability == StateMutability::Payable {
            format!("{signature} (payable)")
        } else {
            signature
        }
    }

    fn function_details(function: &Function) -> String {
        let inputs = match function.inputs.len() {
            1 => "1 input".to_string(),
            n => format!("{n} inputs"),
        };
        let mutability = match function.state_mutability {
            StateMutability::Pure => "pure",
            StateMutability::View => "view",
            StateMutability::NonPayable => "nonpayable",
            StateMutability::Payable => "payable",
        };
        format!("{inputs} • {mutability}")
    }

    fn render_functions(&self, frame: &mut Frame<'_>, area: Rect, theme: Theme) {
        let functions = self.wizard.functions();
        if functions.is_empty() {
            let widget = Paragraph::new(Span::styled(NO_WRITE_FUNCTIONS, theme.warning()))
                .block(Block::bordered().title("Functions"));
            frame.render_widget(widget, area);
            return;
        }
        let items: Vec<ListItem> = functions
            .iter()
            .map(|function| ListItem::new(Self::function_label(function)))
            .collect();
        let mut block = Block::bordered().title("Functions");
        if let Some(selected) = self.wizard.functions().get(self.wizard.selection()) {
            block = block.title_bottom(
                Line::from(Self::function_details(selected)).style(theme.muted()),
            );
        }
        let list = List::new(items)
            .style(theme.text())
            .highlight_style(theme.selected())
            .highlight_symbol("› ")
            .block(block);
        let mut state = ListState::default().with_selected(Some(self.wizard.selection()));
        frame.render_stateful_widget(list, area, &mut state);
    }
}

impl Component for TransactionBuilder {
    type Command = TransactionCommand;

    fn init(&mut self, _ctx: &mut AppContext<'_>) -> AppResult<()> {
        self.wizard.reset();
        Ok(())
    }

    fn update(
        &mut self,
        command: &Self::Command,
        ctx: &mut AppContext<'_>,
    ) -> AppResult<Option<Action>> {
        match command {
            TransactionCommand::Input(input) => {
                let wizard_ctx = Self::wizard_context(ctx);
                match self.wizard.handle(input.clone(), wizard_ctx, Instant::now()) {
                    WizardOutcome::CheckCode { ticket, address } => {
                        let Some(rpc_url) = ctx.state.network.rpc_url.clone() else {
                            self.wizard.complete_code_check(ticket, Ok(true));
                            return Ok(None);
                        };
                        debug!(%address, "checking contract deployment");
                        ctx.commands.spawn_async(move || async move {
                            let result = chain::with_timeout(chain::has_code(&rpc_url, address)).await;
                            Message::CodeChecked { ticket, result }
                        });
                    }
                    WizardOutcome::Prepared(tx) => {
                        info!(to = %tx.to, "contract call encoded");
                        return Ok(Some(Action::TransactionPrepared(tx)));
                    }
                    WizardOutcome::Changed | WizardOutcome::Ignored => {}
                }
            }
            TransactionCommand::Cancel => self.wizard.reset(),
            TransactionCommand::CodeChecked { ticket, result } => {
                if !self.wizard.complete_code_check(*ticket, result.clone()) {
                    debug!("stale contract check ignored");
                }
            }
        }
        Ok(None)
    }

    fn render(&mut self, frame: &mut Frame<'_>, area: Rect, ctx: &AppView<'_>) {
        let theme = Theme::new(ctx.state.no_colors);
        let block = Block::bordered().title(Line::from("Transaction Builder").style(theme.title()));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let show_list = self.wizard.step() == WizardStep::Function;
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Min(3),
                Constraint::Length(if show_list { 10 } else { 0 }),
            ])
            .split(inner);

        frame.render_widget(Paragraph::new(self.progress(theme)), layout[0]);
        let body = Paragraph::new(self.body(theme))
            .style(theme.text())
            .wrap(Wrap { trim: false });
        frame.render_widget(body, layout[1]);
        if show_list {
            self.render_functions(frame, layout[2], theme);
        }
    }

    fn tick(&mut self, _ctx: &mut AppContext<'_>) -> AppResult<Option<Action>> {
        self.frame = self.frame.wrapping_add(1);
        self.wizard.poll(Instant::now());
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_highlights_current_step() {
        let builder = TransactionBuilder::default();
        let line = builder.progress(Theme::new(true));
        let text: String = line.spans.iter().map(|span| span.content.as_ref()).collect();
        assert_eq!(
            text,
            "1. Contract address › 2. Contract ABI › 3. Function › 4. Parameters"
        );
        assert_eq!(line.spans[0].style, Theme::new(true).selected());
    }

    #[test]
    fn payable_functions_are_marked() {
        let abi = encoder::parse_abi(
            r#"[
                {"type":"function","name":"deposit","inputs":[],"stateMutability":"payable"},
                {"type":"function","name":"transfer","inputs":[{"name":"to","type":"address"},{"name":"amount","type":"uint256"}],"stateMutability":"nonpayable"}
            ]"#,
        )
        .unwrap();
        let functions = encoder::write_functions(&abi);
        assert_eq!(TransactionBuilder::function_label(&functions[0]), "deposit() (payable)");
        assert_eq!(TransactionBuilder::function_details(&functions[0]), "0 inputs • payable");
        assert_eq!(
            TransactionBuilder::function_label(&functions[1]),
            "transfer(address to, uint256 amount)"
        );
        assert_eq!(
            TransactionBuilder::function_details(&functions[1]),
            "2 inputs • nonpayable"
        );
    }

    #[test]
    fn starts_on_text_step() {
        assert!(TransactionBuilder::default().captures_text());
    }
}
