//! Single-line text capture from a terminal keystroke stream.
//!
//! Terminals do not flag pasted text, so a delivery carrying more than one
//! character is treated as a paste. Paste deliveries are collected in a
//! separate accumulator until a short debounce window elapses without more
//! input; the trimmed accumulator then replaces the line wholesale.

mod validate;

pub use validate::{
    ValidationError, accept_any, is_address, parse_address, validate_abi_json, validate_address,
    validate_contract_address, validate_rpc_url,
};

use std::time::{Duration, Instant};

/// Quiet period after the last paste delivery before the paste is applied.
pub const PASTE_DEBOUNCE: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// One delivery from the terminal: a typed character or a pasted chunk.
    Text(String),
    Backspace,
    Submit,
}

impl InputEvent {
    pub fn char(c: char) -> Self {
        InputEvent::Text(c.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharFilter {
    /// `0-9`, `a-f`, `A-F` and the `x` of the `0x` prefix.
    HexAddress,
    /// Any printable character.
    Printable,
}

impl CharFilter {
    pub fn accepts(self, c: char) -> bool {
        match self {
            CharFilter::HexAddress => c.is_ascii_hexdigit() || c == 'x',
            CharFilter::Printable => !c.is_control(),
        }
    }
}

/// Static description of an input field: its label, the characters it accepts
/// from typing, and how its content is validated.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub label: &'static str,
    pub filter: CharFilter,
    pub validate: fn(&str) -> Result<(), ValidationError>,
    pub paste_warning: &'static str,
}

impl FieldSpec {
    pub const SAFE_ADDRESS: FieldSpec = FieldSpec {
        label: "Address",
        filter: CharFilter::HexAddress,
        validate: |value| validate_address(value).map(|_| ()),
        paste_warning: "Note: Pasted content is not a valid Ethereum address format",
    };

    pub const CONTRACT_ADDRESS: FieldSpec = FieldSpec {
        label: "Contract address",
        filter: CharFilter::HexAddress,
        validate: |value| validate_contract_address(value).map(|_| ()),
        paste_warning: "Note: Pasted content is not a valid contract address format",
    };

    pub const RPC_URL: FieldSpec = FieldSpec {
        label: "RPC URL",
        filter: CharFilter::Printable,
        validate: |value| validate_rpc_url(value).map(|_| ()),
        paste_warning: "Note: Pasted content is not a valid URL",
    };

    pub const ABI: FieldSpec = FieldSpec {
        label: "ABI",
        filter: CharFilter::Printable,
        validate: validate_abi_json,
        paste_warning: "Note: Pasted content is not valid JSON",
    };

    pub const PARAMETER: FieldSpec = FieldSpec {
        label: "Parameter",
        filter: CharFilter::Printable,
        validate: accept_any,
        paste_warning: "",
    };

    pub fn named(mut self, label: &'static str) -> Self {
        self.label = label;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// The event had no effect (editor submitted, filtered character, ...).
    Ignored,
    /// The visible buffer or messages changed.
    Changed,
    /// Input was folded into a pending paste.
    Buffering,
    /// Submit was refused; `LineEditor::error` holds the reason.
    Rejected,
    /// The final value. Emitted at most once per editor.
    Submitted(String),
}

#[derive(Debug, Clone)]
pub struct LineEditor {
    field: FieldSpec,
    buffer: String,
    paste: String,
    paste_deadline: Option<Instant>,
    error: Option<String>,
    warning: Option<String>,
    submitted: bool,
}

impl LineEditor {
    pub fn new(field: FieldSpec) -> Self {
        Self {
            field,
            buffer: String::new(),
            paste: String::new(),
            paste_deadline: None,
            error: None,
            warning: None,
            submitted: false,
        }
    }

    /// Editor pre-filled with `value`, e.g. to resume after a failed
    /// asynchronous check.
    pub fn with_value(field: FieldSpec, value: impl Into<String>) -> Self {
        let mut editor = Self::new(field);
        editor.buffer = value.into();
        editor
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn field(&self) -> &FieldSpec {
        &self.field
    }

    pub fn value(&self) -> &str {
        &self.buffer
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn warning(&self) -> Option<&str> {
        self.warning.as_deref()
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    pub fn is_pasting(&self) -> bool {
        self.paste_deadline.is_some()
    }

    pub fn paste_deadline(&self) -> Option<Instant> {
        self.paste_deadline
    }

    pub fn handle(&mut self, event: InputEvent, now: Instant) -> EditOutcome {
        if self.submitted {
            return EditOutcome::Ignored;
        }
        match event {
            InputEvent::Text(text) => self.on_text(&text, now),
            InputEvent::Backspace => self.on_backspace(),
            InputEvent::Submit => self.on_submit(),
        }
    }

    /// Applies a pending paste once its debounce window has passed. Returns
    /// true when the buffer was replaced.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.paste_deadline {
            Some(deadline) if now >= deadline => {
                self.flush_paste();
                true
            }
            _ => false,
        }
    }

    fn on_text(&mut self, text: &str, now: Instant) -> EditOutcome {
        let mut chars = text.chars();
        let single = match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c),
            (None, _) => return EditOutcome::Ignored,
            _ => None,
        };

        match single {
            Some(c) if !self.is_pasting() => {
                if !self.field.filter.accepts(c) {
                    return EditOutcome::Ignored;
                }
                self.buffer.push(c);
                self.clear_messages();
                EditOutcome::Changed
            }
            _ => {
                self.paste
                    .extend(text.chars().filter(|ch| !matches!(ch, '\r' | '\n')));
                self.paste_deadline = Some(now + PASTE_DEBOUNCE);
                EditOutcome::Buffering
            }
        }
    }

    fn on_backspace(&mut self) -> EditOutcome {
        if self.is_pasting() {
            return EditOutcome::Ignored;
        }
        if self.buffer.pop().is_some() {
            self.clear_messages();
            EditOutcome::Changed
        } else {
            EditOutcome::Ignored
        }
    }

    fn on_submit(&mut self) -> EditOutcome {
        if self.is_pasting() {
            return EditOutcome::Ignored;
        }
        if self.buffer.trim().is_empty() {
            self.error = Some(format!("{} cannot be empty", self.field.label));
            return EditOutcome::Rejected;
        }
        if let Err(err) = (self.field.validate)(&self.buffer) {
            self.error = Some(err.0);
            return EditOutcome::Rejected;
        }
        self.clear_messages();
        self.submitted = true;
        EditOutcome::Submitted(self.buffer.clone())
    }

    fn flush_paste(&mut self) {
        self.paste_deadline = None;
        let pasted = std::mem::take(&mut self.paste);
        let cleaned = pasted.trim();
        if cleaned.is_empty() {
            return;
        }
        self.buffer = cleaned.to_string();
        self.clear_messages();
        if (self.field.validate)(&self.buffer).is_err() && !self.field.paste_warning.is_empty() {
            self.warning = Some(self.field.paste_warning.to_string());
        }
    }

    fn clear_messages(&mut self) {
        self.error = None;
        self.warning = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDRESS: &str = "0x000000000000000000000000000000000000dEaD";

    fn type_all(editor: &mut LineEditor, text: &str, now: Instant) {
        for c in text.chars() {
            editor.handle(InputEvent::char(c), now);
        }
    }

    #[test]
    fn typing_and_pasting_produce_the_same_line() {
        let now = Instant::now();
        let mut typed = LineEditor::new(FieldSpec::SAFE_ADDRESS);
        type_all(&mut typed, ADDRESS, now);

        let mut pasted = LineEditor::new(FieldSpec::SAFE_ADDRESS);
        pasted.handle(InputEvent::Text(format!("  {ADDRESS}\n")), now);
        assert_eq!(pasted.value(), "");
        assert!(pasted.poll(now + PASTE_DEBOUNCE));

        assert_eq!(typed.value(), pasted.value());
        assert_eq!(typed.value(), ADDRESS);
    }

    #[test]
    fn paste_waits_for_debounce_window() {
        let start = Instant::now();
        let mut editor = LineEditor::new(FieldSpec::RPC_URL);
        editor.handle(InputEvent::Text("https://eth.".into()), start);
        assert!(!editor.poll(start + Duration::from_millis(10)));

        let later = start + Duration::from_millis(30);
        editor.handle(InputEvent::Text("llamarpc.com".into()), later);
        assert!(!editor.poll(start + PASTE_DEBOUNCE));
        assert!(editor.poll(later + PASTE_DEBOUNCE));
        assert_eq!(editor.value(), "https://eth.llamarpc.com");
        assert!(!editor.is_pasting());
    }

    #[test]
    fn paste_replaces_existing_buffer() {
        let now = Instant::now();
        let mut editor = LineEditor::new(FieldSpec::ABI);
        type_all(&mut editor, "junk", now);
        editor.handle(InputEvent::Text("[]".into()), now);
        editor.poll(now + PASTE_DEBOUNCE);
        assert_eq!(editor.value(), "[]");
    }

    #[test]
    fn single_chars_during_paste_join_the_accumulator() {
        let now = Instant::now();
        let mut editor = LineEditor::new(FieldSpec::SAFE_ADDRESS);
        editor.handle(InputEvent::Text("0x0000".into()), now);
        assert_eq!(editor.handle(InputEvent::char('z'), now), EditOutcome::Buffering);
        assert_eq!(editor.handle(InputEvent::Backspace, now), EditOutcome::Ignored);
        assert_eq!(editor.handle(InputEvent::Submit, now), EditOutcome::Ignored);
        editor.poll(now + PASTE_DEBOUNCE);
        assert_eq!(editor.value(), "0x0000z");
    }

    #[test]
    fn invalid_paste_raises_warning_not_error() {
        let now = Instant::now();
        let mut editor = LineEditor::new(FieldSpec::SAFE_ADDRESS);
        editor.handle(InputEvent::Text("hello world".into()), now);
        editor.poll(now + PASTE_DEBOUNCE);
        assert_eq!(editor.value(), "hello world");
        assert_eq!(
            editor.warning(),
            Some("Note: Pasted content is not a valid Ethereum address format")
        );
        assert!(editor.error().is_none());
        assert!(!editor.is_submitted());
    }

    #[test]
    fn filter_drops_disallowed_characters() {
        let now = Instant::now();
        let mut editor = LineEditor::new(FieldSpec::SAFE_ADDRESS);
        assert_eq!(editor.handle(InputEvent::char('g'), now), EditOutcome::Ignored);
        assert_eq!(editor.handle(InputEvent::char('0'), now), EditOutcome::Changed);
        assert_eq!(editor.value(), "0");
    }

    #[test]
    fn empty_submit_is_rejected() {
        let now = Instant::now();
        let mut editor = LineEditor::new(FieldSpec::SAFE_ADDRESS);
        assert_eq!(editor.handle(InputEvent::Submit, now), EditOutcome::Rejected);
        assert_eq!(editor.error(), Some("Address cannot be empty"));
        assert!(!editor.is_submitted());
    }

    #[test]
    fn validation_error_clears_on_edit() {
        let now = Instant::now();
        let mut editor = LineEditor::new(FieldSpec::SAFE_ADDRESS);
        type_all(&mut editor, "0x12", now);
        assert_eq!(editor.handle(InputEvent::Submit, now), EditOutcome::Rejected);
        assert_eq!(editor.error(), Some("Invalid Ethereum address format"));
        editor.handle(InputEvent::Backspace, now);
        assert!(editor.error().is_none());
        assert_eq!(editor.value(), "0x1");
    }

    #[test]
    fn valid_submit_emits_once_and_locks() {
        let now = Instant::now();
        let mut editor = LineEditor::new(FieldSpec::SAFE_ADDRESS);
        type_all(&mut editor, ADDRESS, now);
        assert_eq!(
            editor.handle(InputEvent::Submit, now),
            EditOutcome::Submitted(ADDRESS.to_string())
        );
        assert!(editor.is_submitted());
        assert_eq!(editor.handle(InputEvent::Submit, now), EditOutcome::Ignored);
        assert_eq!(editor.handle(InputEvent::char('0'), now), EditOutcome::Ignored);
        assert_eq!(editor.handle(InputEvent::Backspace, now), EditOutcome::Ignored);
        assert_eq!(editor.value(), ADDRESS);
    }

    #[test]
    fn prefilled_editor_keeps_error_until_edit() {
        let now = Instant::now();
        let mut editor = LineEditor::with_value(FieldSpec::RPC_URL, "http://localhost:1")
            .with_error("Failed to connect to RPC: refused");
        assert_eq!(editor.error(), Some("Failed to connect to RPC: refused"));
        editor.handle(InputEvent::char('2'), now);
        assert!(editor.error().is_none());
        assert_eq!(editor.value(), "http://localhost:12");
    }
}
