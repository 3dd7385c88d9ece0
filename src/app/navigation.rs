//! Which view is active, which editor owns the keyboard, and where each key goes.

use crate::{
    form::WizardInput,
    input::{FieldSpec, InputEvent, LineEditor},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActiveView {
    #[default]
    Dashboard,
    TransactionBuilder,
    WalletPairing,
    Settings,
}

impl ActiveView {
    pub const ALL: [ActiveView; 4] = [
        ActiveView::Dashboard,
        ActiveView::TransactionBuilder,
        ActiveView::WalletPairing,
        ActiveView::Settings,
    ];

    pub fn title(self) -> &'static str {
        match self {
            ActiveView::Dashboard => "Dashboard",
            ActiveView::TransactionBuilder => "Transaction",
            ActiveView::WalletPairing => "WalletConnect",
            ActiveView::Settings => "Settings",
        }
    }

    pub fn from_number(number: u32) -> Option<Self> {
        match number {
            1 => Some(ActiveView::Dashboard),
            2 => Some(ActiveView::TransactionBuilder),
            3 => Some(ActiveView::WalletPairing),
            4 => Some(ActiveView::Settings),
            _ => None,
        }
    }

    pub fn index(self) -> usize {
        match self {
            ActiveView::Dashboard => 0,
            ActiveView::TransactionBuilder => 1,
            ActiveView::WalletPairing => 2,
            ActiveView::Settings => 3,
        }
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn previous(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureKind {
    Address,
    RpcUrl,
}

impl CaptureKind {
    pub fn field(self) -> FieldSpec {
        match self {
            CaptureKind::Address => FieldSpec::SAFE_ADDRESS,
            CaptureKind::RpcUrl => FieldSpec::RPC_URL,
        }
    }

    pub fn prompt(self) -> &'static str {
        match self {
            CaptureKind::Address => "Enter the Safe address",
            CaptureKind::RpcUrl => "Enter the RPC URL",
        }
    }
}

/// A settings editor that owns the keystroke stream until it is submitted or
/// abandoned.
#[derive(Debug, Clone)]
pub struct InputCapture {
    pub kind: CaptureKind,
    pub editor: LineEditor,
    /// URL whose connectivity check is under way.
    pub verifying: Option<String>,
}

impl InputCapture {
    pub fn new(kind: CaptureKind) -> Self {
        Self {
            kind,
            editor: LineEditor::new(kind.field()),
            verifying: None,
        }
    }

    /// Reopens the editor with the rejected text and the reason.
    pub fn retry(kind: CaptureKind, value: &str, error: impl Into<String>) -> Self {
        Self {
            kind,
            editor: LineEditor::with_value(kind.field(), value).with_error(error),
            verifying: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct NavigationState {
    pub active_view: ActiveView,
    pub capture: Option<InputCapture>,
}

/// Terminal input after decoding, independent of the terminal backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Paste(String),
    Enter,
    Backspace,
    Esc,
    Up,
    Down,
    Tab,
    BackTab,
    Interrupt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshScope {
    Safe,
    Blockchain,
}

impl RefreshScope {
    pub fn prefix(self) -> &'static str {
        match self {
            RefreshScope::Safe => "safe",
            RefreshScope::Blockchain => "blockchain",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Quit,
    SwitchView(ActiveView),
    Refresh(RefreshScope),
    BeginCapture(CaptureKind),
    Capture(InputEvent),
    CancelCapture,
    Wizard(WizardInput),
    CancelWizard,
    Pair,
    Unpair,
    Ignore,
}

/// Facts about the focused component the router needs.
#[derive(Debug, Clone, Copy, Default)]
pub struct RouteContext {
    pub wizard_captures_text: bool,
}

impl NavigationState {
    pub fn is_capturing(&self) -> bool {
        self.capture.is_some()
    }

    pub fn route(&self, key: Key, ctx: RouteContext) -> Route {
        if key == Key::Interrupt {
            return Route::Quit;
        }
        if self.capture.is_some() {
            return Self::route_capture(key);
        }
        if self.active_view == ActiveView::TransactionBuilder {
            if let Some(route) = self.route_builder(&key, ctx) {
                return route;
            }
        }

        match key {
            Key::Char('q') => Route::Quit,
            Key::Char(d @ '1'..='4') => d
                .to_digit(10)
                .and_then(ActiveView::from_number)
                .map_or(Route::Ignore, Route::SwitchView),
            Key::Tab => Route::SwitchView(self.active_view.next()),
            Key::BackTab => Route::SwitchView(self.active_view.previous()),
            Key::Char(c) => self.route_shortcut(c.to_ascii_lowercase()),
            _ => Route::Ignore,
        }
    }

    fn route_capture(key: Key) -> Route {
        match key {
            Key::Esc => Route::CancelCapture,
            Key::Enter => Route::Capture(InputEvent::Submit),
            Key::Backspace => Route::Capture(InputEvent::Backspace),
            Key::Char(c) => Route::Capture(InputEvent::char(c)),
            Key::Paste(text) => Route::Capture(InputEvent::Text(text)),
            _ => Route::Ignore,
        }
    }

    fn route_builder(&self, key: &Key, ctx: RouteContext) -> Option<Route> {
        let route = match key {
            Key::Esc => Route::CancelWizard,
            Key::Up => Route::Wizard(WizardInput::Up),
            Key::Down => Route::Wizard(WizardInput::Down),
            Key::Enter => Route::Wizard(InputEvent::Submit.into()),
            Key::Backspace if ctx.wizard_captures_text => {
                Route::Wizard(InputEvent::Backspace.into())
            }
            Key::Char(c) if ctx.wizard_captures_text => Route::Wizard(InputEvent::char(*c).into()),
            Key::Paste(text) if ctx.wizard_captures_text => {
                Route::Wizard(InputEvent::Text(text.clone()).into())
            }
            _ => return None,
        };
        Some(route)
    }

    fn route_shortcut(&self, c: char) -> Route {
        match (self.active_view, c) {
            (ActiveView::Settings, 'a') => Route::BeginCapture(CaptureKind::Address),
            (ActiveView::Settings, 'r') => Route::BeginCapture(CaptureKind::RpcUrl),
            (ActiveView::Dashboard, 'r') => Route::Refresh(RefreshScope::Safe),
            (ActiveView::TransactionBuilder | ActiveView::WalletPairing, 'r') => {
                Route::Refresh(RefreshScope::Blockchain)
            }
            (ActiveView::WalletPairing, 'c') => Route::Pair,
            (ActiveView::WalletPairing, 'd') => Route::Unpair,
            _ => Route::Ignore,
        }
    }
}
