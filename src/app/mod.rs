use crate::{
    cache::{FetchError, FetchTicket},
    chain::{self, BlockSubscription},
    components::Component,
    form::{PreparedTransaction, ValidationTicket},
    pairing::{EventSink, PairingEvent, PairingHandle},
    ui::{
        dashboard::Dashboard,
        header::Header,
        keymap::KeymapBar,
        pairing::{WalletPairing, WalletPairingCommand},
        prompt::{InputPrompt, PromptCommand},
        settings::Settings,
        tabs::TabBar,
        transaction::{TransactionBuilder, TransactionCommand},
    },
};
pub type AppResult<T> = color_eyre::Result<T>;
use alloy::primitives::Address;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    DefaultTerminal, Frame,
    layout::{Constraint, Direction, Layout},
};
use std::{
    sync::{Arc, mpsc},
    time::{Duration, Instant},
};
use tokio::runtime::{Handle, Runtime};
use tracing::{debug, info, warn};

pub mod navigation;
pub mod remote;
pub mod state;

pub use navigation::{
    ActiveView, CaptureKind, InputCapture, Key, NavigationState, RefreshScope, Route, RouteContext,
};
pub use remote::{FetchRequest, RemoteData, RemoteValue, Resource, Target};
pub use state::AppState;

/// Upper bound on how long the loop blocks waiting for terminal input, so
/// paste deadlines and cache timers are serviced promptly.
const TICK_RATE: Duration = Duration::from_millis(20);

/// Start-up values gathered from the command line.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub address: Option<Address>,
    pub rpc_url: Option<String>,
    pub no_colors: bool,
}

/// Central application type that orchestrates state and delegates to UI components.
pub struct App {
    running: bool,
    pub state: AppState,
    pairing: PairingHandle,
    header: Header,
    tab_bar: TabBar,
    dashboard: Dashboard,
    builder: TransactionBuilder,
    wallet: WalletPairing,
    settings: Settings,
    prompt: InputPrompt,
    keymap: KeymapBar,
    block_watch: Option<BlockSubscription>,
    _runtime: Runtime,
    runtime_handle: Handle,
    message_rx: mpsc::Receiver<Message>,
    message_tx: mpsc::Sender<Message>,
}

impl App {
    pub fn new(config: AppConfig) -> AppResult<Self> {
        let mut state = AppState::default();
        state.safe_config.address = config.address;
        state.network.rpc_url = config.rpc_url;
        state.no_colors = config.no_colors;
        state.ui.capture = initial_capture(&state).map(InputCapture::new);

        let mut pairing = PairingHandle::from_env();
        let mut header = Header::default();
        let mut tab_bar = TabBar;
        let mut dashboard = Dashboard::default();
        let mut builder = TransactionBuilder::default();
        let mut wallet = WalletPairing::default();
        let mut settings = Settings;
        let mut prompt = InputPrompt::default();
        let mut keymap = KeymapBar;
        let runtime = Runtime::new()?;
        let runtime_handle = runtime.handle().clone();
        let (message_tx, message_rx) = mpsc::channel();

        {
            let mut ctx = AppContext {
                state: &mut state,
                pairing: &mut pairing,
                commands: CommandBus::new(message_tx.clone(), runtime_handle.clone()),
            };
            header.init(&mut ctx)?;
            tab_bar.init(&mut ctx)?;
            dashboard.init(&mut ctx)?;
            builder.init(&mut ctx)?;
            wallet.init(&mut ctx)?;
            settings.init(&mut ctx)?;
            prompt.init(&mut ctx)?;
            keymap.init(&mut ctx)?;
        }

        info!(
            address = ?state.safe_config.address,
            rpc_url = ?state.network.rpc_url,
            pairing = state.wallet.pairing_available,
            "application initialized"
        );

        Ok(Self {
            running: false,
            state,
            pairing,
            header,
            tab_bar,
            dashboard,
            builder,
            wallet,
            settings,
            prompt,
            keymap,
            block_watch: None,
            _runtime: runtime,
            runtime_handle,
            message_rx,
            message_tx,
        })
    }

    pub fn run(mut self, mut terminal: DefaultTerminal) -> AppResult<()> {
        self.running = true;
        while self.running {
            self.tick()?;
            terminal.draw(|frame| self.render(frame))?;
            self.handle_events()?;
        }
        self.block_watch = None;
        info!("shutting down");
        Ok(())
    }

    fn render(&mut self, frame: &mut Frame<'_>) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Length(1),
                Constraint::Min(1),
                Constraint::Length(3),
            ])
            .split(frame.area());

        let view = AppView { state: &self.state };

        self.header.render(frame, layout[0], &view);
        self.tab_bar.render(frame, layout[1], &view);
        if self.state.ui.is_capturing() {
            self.prompt.render(frame, layout[2], &view);
        } else {
            match self.state.ui.active_view {
                ActiveView::Dashboard => self.dashboard.render(frame, layout[2], &view),
                ActiveView::TransactionBuilder => self.builder.render(frame, layout[2], &view),
                ActiveView::WalletPairing => self.wallet.render(frame, layout[2], &view),
                ActiveView::Settings => self.settings.render(frame, layout[2], &view),
            }
        }
        self.keymap.render(frame, layout[3], &view);
    }

    fn handle_events(&mut self) -> AppResult<()> {
        if !event::poll(TICK_RATE)? {
            return Ok(());
        }
        let key = match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => decode_key(key),
            Event::Paste(text) => Some(Key::Paste(text)),
            Event::Mouse(_) | Event::Resize(_, _) => None,
            _ => None,
        };
        if let Some(key) = key {
            self.on_key(key)?;
        }
        Ok(())
    }

    fn on_key(&mut self, key: Key) -> AppResult<()> {
        let ctx = RouteContext {
            wizard_captures_text: self.builder.captures_text(),
        };
        match self.state.ui.route(key, ctx) {
            Route::Quit => self.dispatch(Action::Quit)?,
            Route::SwitchView(view) => self.dispatch(Action::SwitchView(view))?,
            Route::Refresh(scope) => self.dispatch(Action::Refresh(scope))?,
            Route::BeginCapture(kind) => self.dispatch(Action::BeginCapture(kind))?,
            Route::CancelCapture => self.dispatch(Action::CancelCapture)?,
            Route::Capture(event) => self.prompt_command(PromptCommand::Input(event))?,
            Route::Wizard(input) => self.builder_command(TransactionCommand::Input(input))?,
            Route::CancelWizard => self.builder_command(TransactionCommand::Cancel)?,
            Route::Pair => self.wallet_command(WalletPairingCommand::Connect)?,
            Route::Unpair => self.wallet_command(WalletPairingCommand::Disconnect)?,
            Route::Ignore => {}
        }
        Ok(())
    }

    fn dispatch(&mut self, action: Action) -> AppResult<()> {
        match action {
            Action::Quit => self.running = false,
            Action::SwitchView(view) => {
                let current = self.state.ui.active_view;
                if current == ActiveView::TransactionBuilder && view != current {
                    self.builder_command(TransactionCommand::Cancel)?;
                }
                self.state.ui.active_view = view;
            }
            Action::Refresh(scope) => {
                let dropped = self.state.remote.invalidate(scope);
                info!(scope = scope.prefix(), dropped, "refresh requested");
            }
            Action::BeginCapture(kind) => {
                self.state.ui.capture = Some(InputCapture::new(kind));
            }
            Action::CancelCapture => {
                self.state.ui.capture = None;
            }
            Action::SafeAddressChanged(address) => self.set_safe_address(address),
            Action::RpcUrlChanged { url, chain_id } => self.set_rpc_url(url, chain_id),
            Action::TransactionPrepared(transaction) => {
                match serde_json::to_string(&transaction) {
                    Ok(json) => info!(transaction = %json, "transaction prepared"),
                    Err(err) => warn!(error = %err, "failed to serialize prepared transaction"),
                }
            }
        }
        Ok(())
    }

    fn set_safe_address(&mut self, address: Address) {
        if self.state.set_safe_address(address) {
            info!(%address, "safe address updated");
        }
        if self.state.network.rpc_url.is_none() {
            self.state.ui.capture = Some(InputCapture::new(CaptureKind::RpcUrl));
        }
    }

    fn set_rpc_url(&mut self, url: String, chain_id: u64) {
        if self.state.set_rpc_url(&url, chain_id, Instant::now()) {
            info!(rpc_url = %url, chain_id, "rpc endpoint updated");
        }
    }

    fn prompt_command(&mut self, command: PromptCommand) -> AppResult<()> {
        let mut ctx = AppContext {
            state: &mut self.state,
            pairing: &mut self.pairing,
            commands: CommandBus::new(self.message_tx.clone(), self.runtime_handle.clone()),
        };
        if let Some(action) = self.prompt.update(&command, &mut ctx)? {
            self.dispatch(action)?;
        }
        Ok(())
    }

    fn builder_command(&mut self, command: TransactionCommand) -> AppResult<()> {
        let mut ctx = AppContext {
            state: &mut self.state,
            pairing: &mut self.pairing,
            commands: CommandBus::new(self.message_tx.clone(), self.runtime_handle.clone()),
        };
        if let Some(action) = self.builder.update(&command, &mut ctx)? {
            self.dispatch(action)?;
        }
        Ok(())
    }

    fn wallet_command(&mut self, command: WalletPairingCommand) -> AppResult<()> {
        let mut ctx = AppContext {
            state: &mut self.state,
            pairing: &mut self.pairing,
            commands: CommandBus::new(self.message_tx.clone(), self.runtime_handle.clone()),
        };
        if let Some(action) = self.wallet.update(&command, &mut ctx)? {
            self.dispatch(action)?;
        }
        Ok(())
    }

    fn tick(&mut self) -> AppResult<()> {
        let mut actions = Vec::new();
        {
            let mut ctx = AppContext {
                state: &mut self.state,
                pairing: &mut self.pairing,
                commands: CommandBus::new(self.message_tx.clone(), self.runtime_handle.clone()),
            };
            actions.extend(self.header.tick(&mut ctx)?);
            actions.extend(self.tab_bar.tick(&mut ctx)?);
            match ctx.state.ui.active_view {
                ActiveView::Dashboard => actions.extend(self.dashboard.tick(&mut ctx)?),
                ActiveView::TransactionBuilder => actions.extend(self.builder.tick(&mut ctx)?),
                ActiveView::WalletPairing => actions.extend(self.wallet.tick(&mut ctx)?),
                ActiveView::Settings => actions.extend(self.settings.tick(&mut ctx)?),
            }
            actions.extend(self.prompt.tick(&mut ctx)?);
            actions.extend(self.keymap.tick(&mut ctx)?);
        }
        for action in actions {
            self.dispatch(action)?;
        }

        let bus = self.command_bus();
        for request in self.state.remote.poll(Instant::now()) {
            bus.fetch(request);
        }
        self.sync_block_watch();
        self.drain_messages()
    }

    fn command_bus(&self) -> CommandBus {
        CommandBus::new(self.message_tx.clone(), self.runtime_handle.clone())
    }

    /// Keeps exactly one block watcher attached to the configured endpoint.
    fn sync_block_watch(&mut self) {
        let wanted = self.state.network.rpc_url.as_deref();
        let current = self.block_watch.as_ref().map(BlockSubscription::rpc_url);
        if wanted == current {
            return;
        }
        self.block_watch = wanted.map(|rpc_url| {
            let sender = self.message_tx.clone();
            let url = rpc_url.to_string();
            chain::watch_block_number(&self.runtime_handle, rpc_url, move |number| {
                let _ = sender.send(Message::BlockObserved {
                    rpc_url: url.clone(),
                    number,
                });
            })
        });
        self.state.network.block_polling = self.block_watch.is_some();
    }

    fn drain_messages(&mut self) -> AppResult<()> {
        while let Ok(message) = self.message_rx.try_recv() {
            match message {
                Message::QueryResolved { ticket, result } => {
                    self.state.remote.resolve(&ticket, result, Instant::now());
                }
                Message::BlockObserved { rpc_url, number } => {
                    if self.state.network.rpc_url.as_deref() == Some(rpc_url.as_str()) {
                        let target = Target::chain(Resource::BlockNumber, &rpc_url);
                        self.state.remote.set(
                            &target,
                            RemoteValue::BlockNumber(number),
                            Instant::now(),
                        );
                    }
                }
                Message::RpcVerified { url, result } => {
                    self.prompt_command(PromptCommand::RpcVerified { url, result })?;
                }
                Message::CodeChecked { ticket, result } => {
                    self.builder_command(TransactionCommand::CodeChecked { ticket, result })?;
                }
                Message::Pairing(event) => {
                    debug!(?event, "pairing event");
                    self.wallet_command(WalletPairingCommand::Event(event))?;
                }
            }
        }
        Ok(())
    }
}

fn initial_capture(state: &AppState) -> Option<CaptureKind> {
    if state.safe_config.address.is_none() {
        Some(CaptureKind::Address)
    } else if state.network.rpc_url.is_none() {
        Some(CaptureKind::RpcUrl)
    } else {
        None
    }
}

pub fn decode_key(key: KeyEvent) -> Option<Key> {
    match (key.modifiers, key.code) {
        (KeyModifiers::CONTROL, KeyCode::Char('c') | KeyCode::Char('C')) => Some(Key::Interrupt),
        (modifiers, KeyCode::Char(c))
            if !modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            Some(Key::Char(c))
        }
        (_, KeyCode::Enter) => Some(Key::Enter),
        (_, KeyCode::Backspace | KeyCode::Delete) => Some(Key::Backspace),
        (_, KeyCode::Esc) => Some(Key::Esc),
        (_, KeyCode::Up) => Some(Key::Up),
        (_, KeyCode::Down) => Some(Key::Down),
        (_, KeyCode::BackTab) | (KeyModifiers::SHIFT, KeyCode::Tab) => Some(Key::BackTab),
        (_, KeyCode::Tab) => Some(Key::Tab),
        _ => None,
    }
}

/// Mutable context passed to components while handling logic.
pub struct AppContext<'a> {
    pub state: &'a mut AppState,
    pub pairing: &'a mut PairingHandle,
    pub commands: CommandBus,
}

impl AppContext<'_> {
    /// Current state of `target`, starting a read when the cache asks for one.
    pub fn query(&mut self, target: &Target) -> crate::cache::QueryState<RemoteValue> {
        let (state, request) = self.state.remote.get(target, Instant::now());
        if let Some(request) = request {
            self.commands.fetch(request);
        }
        state
    }
}

/// Read-only context used during rendering.
pub struct AppView<'a> {
    pub state: &'a AppState,
}

#[derive(Clone)]
pub struct CommandBus {
    sender: mpsc::Sender<Message>,
    handle: Handle,
}

impl CommandBus {
    pub fn new(sender: mpsc::Sender<Message>, handle: Handle) -> Self {
        Self { sender, handle }
    }

    pub fn spawn_async<F, Fut>(&self, task: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: std::future::Future<Output = Message> + Send + 'static,
    {
        let sender = self.sender.clone();
        self.handle.spawn(async move {
            let message = task().await;
            let _ = sender.send(message);
        });
    }

    /// Runs a cache read and reports its outcome as [`Message::QueryResolved`].
    pub fn fetch(&self, request: FetchRequest) {
        debug!(key = %request.ticket.key(), "fetching");
        self.spawn_async(move || async move {
            let FetchRequest { ticket, target } = request;
            let result = target.fetch().await;
            Message::QueryResolved { ticket, result }
        });
    }

    /// Forwards pairing provider events into the message loop.
    pub fn pairing_sink(&self) -> EventSink {
        let sender = self.sender.clone();
        Arc::new(move |event| {
            let _ = sender.send(Message::Pairing(event));
        })
    }
}

#[derive(Debug)]
pub enum Message {
    QueryResolved {
        ticket: FetchTicket,
        result: Result<RemoteValue, FetchError>,
    },
    BlockObserved {
        rpc_url: String,
        number: u64,
    },
    RpcVerified {
        url: String,
        result: Result<u64, FetchError>,
    },
    CodeChecked {
        ticket: ValidationTicket,
        result: Result<bool, FetchError>,
    },
    Pairing(PairingEvent),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
    SwitchView(ActiveView),
    Refresh(RefreshScope),
    BeginCapture(CaptureKind),
    CancelCapture,
    SafeAddressChanged(Address),
    RpcUrlChanged { url: String, chain_id: u64 },
    TransactionPrepared(PreparedTransaction),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> Option<Key> {
        decode_key(KeyEvent::new(code, modifiers))
    }

    #[test]
    fn control_c_interrupts() {
        assert_eq!(
            press(KeyCode::Char('c'), KeyModifiers::CONTROL),
            Some(Key::Interrupt)
        );
        assert_eq!(
            press(KeyCode::Char('c'), KeyModifiers::NONE),
            Some(Key::Char('c'))
        );
    }

    #[test]
    fn shifted_characters_are_text() {
        assert_eq!(
            press(KeyCode::Char('D'), KeyModifiers::SHIFT),
            Some(Key::Char('D'))
        );
        assert_eq!(press(KeyCode::Char('x'), KeyModifiers::ALT), None);
    }

    #[test]
    fn editing_and_navigation_keys() {
        assert_eq!(press(KeyCode::Delete, KeyModifiers::NONE), Some(Key::Backspace));
        assert_eq!(press(KeyCode::BackTab, KeyModifiers::SHIFT), Some(Key::BackTab));
        assert_eq!(press(KeyCode::Tab, KeyModifiers::NONE), Some(Key::Tab));
        assert_eq!(press(KeyCode::F(1), KeyModifiers::NONE), None);
    }

    #[test]
    fn missing_configuration_opens_a_prompt() {
        let mut state = AppState::default();
        assert_eq!(initial_capture(&state), Some(CaptureKind::Address));
        state.safe_config.address = Some(Address::ZERO);
        assert_eq!(initial_capture(&state), Some(CaptureKind::RpcUrl));
        state.network.rpc_url = Some("https://rpc.example".into());
        assert_eq!(initial_capture(&state), None);
    }
}
