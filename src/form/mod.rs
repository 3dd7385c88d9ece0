//! Contract-call wizard: contract address, ABI, function, parameters.

use crate::{
    cache::FetchError,
    chain::encoder::{self, Argument, ContractAbi},
    input::{EditOutcome, FieldSpec, InputEvent, LineEditor, parse_address},
};
use alloy::{
    json_abi::Function,
    primitives::{Address, Bytes, I256, U256},
};
use serde::Serialize;
use std::time::Instant;
use thiserror::Error;

pub const WALLET_NOT_CONNECTED: &str = "Wallet not connected. Please connect your wallet first.";
pub const NO_WRITE_FUNCTIONS: &str = "No write functions found in ABI";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    ContractAddress,
    Abi,
    Function,
    Parameters,
}

impl WizardStep {
    pub fn title(self) -> &'static str {
        match self {
            WizardStep::ContractAddress => "Contract address",
            WizardStep::Abi => "Contract ABI",
            WizardStep::Function => "Function",
            WizardStep::Parameters => "Parameters",
        }
    }

    /// Steps that take free text own every printable key.
    pub fn captures_text(self) -> bool {
        !matches!(self, WizardStep::Function)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WizardError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Precondition(String),
}

/// Unsigned call ready to be handed to a signer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreparedTransaction {
    pub to: Address,
    pub data: Bytes,
    pub value: U256,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardInput {
    Edit(InputEvent),
    Up,
    Down,
}

impl From<InputEvent> for WizardInput {
    fn from(event: InputEvent) -> Self {
        WizardInput::Edit(event)
    }
}

/// External state the wizard consults but does not own.
#[derive(Debug, Clone, Copy, Default)]
pub struct WizardContext {
    /// Contract addresses are checked for code only when an endpoint exists.
    pub rpc_configured: bool,
    pub wallet_paired: bool,
}

/// Ties an asynchronous check to the wizard session that requested it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationTicket {
    generation: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardOutcome {
    Ignored,
    Changed,
    /// The caller must check `address` for deployed code and report back
    /// through [`TransactionWizard::complete_code_check`].
    CheckCode {
        ticket: ValidationTicket,
        address: Address,
    },
    Prepared(PreparedTransaction),
}

#[derive(Debug)]
pub struct TransactionWizard {
    step: WizardStep,
    generation: u64,
    editor: LineEditor,
    pending_check: Option<(ValidationTicket, Address)>,
    contract: Option<Address>,
    abi: Option<ContractAbi>,
    functions: Vec<Function>,
    selection: usize,
    parameters: Vec<LineEditor>,
    active_parameter: usize,
    error: Option<WizardError>,
    prepared: Option<PreparedTransaction>,
}

impl Default for TransactionWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionWizard {
    pub fn new() -> Self {
        Self {
            step: WizardStep::ContractAddress,
            generation: 0,
            editor: LineEditor::new(FieldSpec::CONTRACT_ADDRESS),
            pending_check: None,
            contract: None,
            abi: None,
            functions: Vec::new(),
            selection: 0,
            parameters: Vec::new(),
            active_parameter: 0,
            error: None,
            prepared: None,
        }
    }

    /// Back to the first step. Checks issued before the reset are discarded
    /// when they complete.
    pub fn reset(&mut self) {
        let generation = self.generation + 1;
        *self = Self::new();
        self.generation = generation;
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn editor(&self) -> &LineEditor {
        &self.editor
    }

    pub fn contract(&self) -> Option<Address> {
        self.contract
    }

    pub fn abi(&self) -> Option<&ContractAbi> {
        self.abi.as_ref()
    }

    pub fn functions(&self) -> &[Function] {
        &self.functions
    }

    pub fn selection(&self) -> usize {
        self.selection
    }

    pub fn selected_function(&self) -> Option<&Function> {
        self.functions.get(self.selection)
    }

    pub fn parameters(&self) -> &[LineEditor] {
        &self.parameters
    }

    pub fn active_parameter(&self) -> usize {
        self.active_parameter
    }

    pub fn error(&self) -> Option<&WizardError> {
        self.error.as_ref()
    }

    pub fn is_validating(&self) -> bool {
        self.pending_check.is_some()
    }

    pub fn prepared(&self) -> Option<&PreparedTransaction> {
        self.prepared.as_ref()
    }

    /// True while a text step is active, i.e. printable keys belong to the
    /// wizard rather than to navigation shortcuts.
    pub fn captures_text(&self) -> bool {
        self.prepared.is_none() && self.step.captures_text()
    }

    pub fn handle(&mut self, input: WizardInput, ctx: WizardContext, now: Instant) -> WizardOutcome {
        if self.prepared.is_some() || self.pending_check.is_some() {
            return WizardOutcome::Ignored;
        }
        match (self.step, input) {
            (WizardStep::Function, WizardInput::Up) => self.move_selection(-1),
            (WizardStep::Function, WizardInput::Down) => self.move_selection(1),
            (WizardStep::Function, WizardInput::Edit(InputEvent::Submit)) => self.choose_function(ctx),
            (WizardStep::Function, _) => WizardOutcome::Ignored,
            (_, WizardInput::Edit(event)) => self.edit(event, ctx, now),
            _ => WizardOutcome::Ignored,
        }
    }

    /// Flushes a pending paste in the active editor.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.step {
            WizardStep::ContractAddress | WizardStep::Abi => self.editor.poll(now),
            WizardStep::Parameters => self
                .parameters
                .get_mut(self.active_parameter)
                .is_some_and(|editor| editor.poll(now)),
            WizardStep::Function => false,
        }
    }

    pub fn paste_deadline(&self) -> Option<Instant> {
        match self.step {
            WizardStep::ContractAddress | WizardStep::Abi => self.editor.paste_deadline(),
            WizardStep::Parameters => self
                .parameters
                .get(self.active_parameter)
                .and_then(LineEditor::paste_deadline),
            WizardStep::Function => None,
        }
    }

    /// Applies the outcome of a code check. Returns false when the ticket
    /// belongs to a cancelled session or was already answered.
    pub fn complete_code_check(
        &mut self,
        ticket: ValidationTicket,
        result: Result<bool, FetchError>,
    ) -> bool {
        let Some((pending, address)) = self.pending_check else {
            return false;
        };
        if pending != ticket || ticket.generation != self.generation {
            return false;
        }
        self.pending_check = None;
        match result {
            Ok(true) => self.accept_contract(address),
            Ok(false) => self.reopen_contract(address, "No contract deployed at this address"),
            Err(err) => self.reopen_contract(address, &format!("Failed to verify contract: {err}")),
        }
        true
    }

    fn edit(&mut self, event: InputEvent, ctx: WizardContext, now: Instant) -> WizardOutcome {
        if self.step == WizardStep::Parameters {
            return self.edit_parameter(event, ctx, now);
        }
        match self.editor.handle(event, now) {
            EditOutcome::Submitted(value) => {
                self.error = None;
                match self.step {
                    WizardStep::ContractAddress => self.submit_contract(&value, ctx),
                    _ => self.submit_abi(&value),
                }
            }
            EditOutcome::Ignored => WizardOutcome::Ignored,
            _ => {
                self.error = None;
                WizardOutcome::Changed
            }
        }
    }

    fn submit_contract(&mut self, value: &str, ctx: WizardContext) -> WizardOutcome {
        let Some(address) = parse_address(value) else {
            self.reopen_contract_text(value, "Invalid contract address");
            return WizardOutcome::Changed;
        };
        if !ctx.rpc_configured {
            self.accept_contract(address);
            return WizardOutcome::Changed;
        }
        let ticket = ValidationTicket {
            generation: self.generation,
        };
        self.pending_check = Some((ticket, address));
        WizardOutcome::CheckCode { ticket, address }
    }

    fn accept_contract(&mut self, address: Address) {
        self.contract = Some(address);
        self.step = WizardStep::Abi;
        self.editor = LineEditor::new(FieldSpec::ABI);
    }

    fn reopen_contract(&mut self, address: Address, message: &str) {
        self.reopen_contract_text(&address.to_checksum(None), message);
    }

    fn reopen_contract_text(&mut self, value: &str, message: &str) {
        self.editor = LineEditor::with_value(FieldSpec::CONTRACT_ADDRESS, value).with_error(message);
    }

    fn submit_abi(&mut self, value: &str) -> WizardOutcome {
        match encoder::parse_abi(value) {
            Ok(abi) => {
                self.functions = encoder::write_functions(&abi);
                self.abi = Some(abi);
                self.selection = 0;
                self.step = WizardStep::Function;
            }
            Err(err) => {
                self.editor = LineEditor::with_value(FieldSpec::ABI, value).with_error(err.to_string());
            }
        }
        WizardOutcome::Changed
    }

    fn move_selection(&mut self, delta: isize) -> WizardOutcome {
        let len = self.functions.len();
        if len == 0 {
            return WizardOutcome::Ignored;
        }
        self.selection = (self.selection as isize + delta).rem_euclid(len as isize) as usize;
        self.error = None;
        WizardOutcome::Changed
    }

    fn choose_function(&mut self, ctx: WizardContext) -> WizardOutcome {
        let Some(function) = self.functions.get(self.selection) else {
            self.error = Some(WizardError::Validation(NO_WRITE_FUNCTIONS.to_string()));
            return WizardOutcome::Changed;
        };
        self.parameters = function
            .inputs
            .iter()
            .map(|_| LineEditor::new(FieldSpec::PARAMETER))
            .collect();
        self.active_parameter = 0;
        self.error = None;
        self.step = WizardStep::Parameters;
        if self.parameters.is_empty() {
            return self.finish(ctx);
        }
        WizardOutcome::Changed
    }

    fn edit_parameter(&mut self, event: InputEvent, ctx: WizardContext, now: Instant) -> WizardOutcome {
        if self.parameters.is_empty() {
            return match event {
                InputEvent::Submit => self.finish(ctx),
                _ => WizardOutcome::Ignored,
            };
        }
        let Some(editor) = self.parameters.get_mut(self.active_parameter) else {
            return WizardOutcome::Ignored;
        };
        match editor.handle(event, now) {
            EditOutcome::Submitted(_) if self.active_parameter + 1 < self.parameters.len() => {
                self.active_parameter += 1;
                self.error = None;
                WizardOutcome::Changed
            }
            EditOutcome::Submitted(_) => self.finish(ctx),
            EditOutcome::Ignored => WizardOutcome::Ignored,
            _ => {
                self.error = None;
                WizardOutcome::Changed
            }
        }
    }

    fn finish(&mut self, ctx: WizardContext) -> WizardOutcome {
        match self.prepare(ctx) {
            Ok(tx) => {
                self.error = None;
                self.prepared = Some(tx.clone());
                WizardOutcome::Prepared(tx)
            }
            Err((error, field)) => {
                self.reopen_parameter(field);
                self.error = Some(error);
                WizardOutcome::Changed
            }
        }
    }

    /// On failure returns the error and the parameter to reopen.
    fn prepare(&self, ctx: WizardContext) -> Result<PreparedTransaction, (WizardError, Option<usize>)> {
        let last = self.parameters.len().checked_sub(1);
        if !ctx.wallet_paired {
            return Err((WizardError::Precondition(WALLET_NOT_CONNECTED.to_string()), last));
        }
        let (Some(to), Some(function)) = (self.contract, self.selected_function()) else {
            return Err((WizardError::Validation("Selected function not found".to_string()), last));
        };

        let mut args = Vec::with_capacity(self.parameters.len());
        for (index, (param, editor)) in function.inputs.iter().zip(&self.parameters).enumerate() {
            let label = encoder::input_label(function, index);
            let arg = coerce(&param.ty, &label, editor.value())
                .map_err(|message| (WizardError::Validation(message), Some(index)))?;
            args.push(arg);
        }

        let data = encoder::encode_call(function, &args)
            .map_err(|err| (WizardError::Validation(err.to_string()), last))?;
        Ok(PreparedTransaction {
            to,
            data,
            value: U256::ZERO,
        })
    }

    /// Reopens `field` and every parameter after it, keeping their text, so
    /// Enter walks forward through them again.
    fn reopen_parameter(&mut self, field: Option<usize>) {
        let Some(index) = field.filter(|index| *index < self.parameters.len()) else {
            return;
        };
        for editor in &mut self.parameters[index..] {
            let value = editor.value().to_string();
            *editor = LineEditor::with_value(FieldSpec::PARAMETER, value);
        }
        self.active_parameter = index;
    }
}

/// Type-directed interpretation of one raw parameter.
pub fn coerce(ty: &str, label: &str, raw: &str) -> Result<Argument, String> {
    let text = raw.trim();
    if ty.ends_with(']') {
        return Ok(Argument::Raw(text.to_string()));
    }
    if let Some(bits) = ty.strip_prefix("uint") {
        if is_width(bits) {
            return U256::from_str_radix(text, 10)
                .map(Argument::Uint)
                .map_err(|_| format!("Invalid integer for {label}: {text}"));
        }
    }
    if let Some(bits) = ty.strip_prefix("int") {
        if is_width(bits) {
            return I256::from_dec_str(text)
                .map(Argument::Int)
                .map_err(|_| format!("Invalid integer for {label}: {text}"));
        }
    }
    if ty == "bool" {
        return Ok(Argument::Bool(text.eq_ignore_ascii_case("true")));
    }
    Ok(Argument::Raw(text.to_string()))
}

fn is_width(bits: &str) -> bool {
    bits.is_empty() || bits.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::PASTE_DEBOUNCE;

    const DEAD: &str = "0x000000000000000000000000000000000000dEaD";
    const FOO_ABI: &str = r#"[{"type":"function","name":"foo","stateMutability":"nonpayable","inputs":[]}]"#;
    const TRANSFER_ABI: &str = r#"[
        {"type":"function","name":"transfer","stateMutability":"nonpayable","inputs":[{"name":"to","type":"address"},{"name":"amount","type":"uint256"}],"outputs":[]},
        {"type":"function","name":"pause","stateMutability":"nonpayable","inputs":[{"name":"on","type":"bool"}],"outputs":[]},
        {"type":"function","name":"totalSupply","stateMutability":"view","inputs":[],"outputs":[{"name":"","type":"uint256"}]}
    ]"#;

    const OFFLINE: WizardContext = WizardContext {
        rpc_configured: false,
        wallet_paired: true,
    };

    fn type_text(wizard: &mut TransactionWizard, text: &str, ctx: WizardContext, now: Instant) {
        for c in text.chars() {
            wizard.handle(InputEvent::char(c).into(), ctx, now);
        }
    }

    fn paste(wizard: &mut TransactionWizard, text: &str, now: Instant) {
        wizard.handle(InputEvent::Text(text.to_string()).into(), OFFLINE, now);
        assert!(wizard.poll(now + PASTE_DEBOUNCE));
    }

    fn enter(wizard: &mut TransactionWizard, ctx: WizardContext, now: Instant) -> WizardOutcome {
        wizard.handle(InputEvent::Submit.into(), ctx, now)
    }

    fn wizard_at_functions(abi: &str) -> TransactionWizard {
        let now = Instant::now();
        let mut wizard = TransactionWizard::new();
        type_text(&mut wizard, DEAD, OFFLINE, now);
        enter(&mut wizard, OFFLINE, now);
        paste(&mut wizard, abi, now);
        enter(&mut wizard, OFFLINE, now);
        assert_eq!(wizard.step(), WizardStep::Function);
        wizard
    }

    #[test]
    fn address_then_bad_abi_then_good_abi() {
        let now = Instant::now();
        let mut wizard = TransactionWizard::new();
        assert_eq!(wizard.step(), WizardStep::ContractAddress);

        type_text(&mut wizard, DEAD, OFFLINE, now);
        enter(&mut wizard, OFFLINE, now);
        assert_eq!(wizard.step(), WizardStep::Abi);
        assert_eq!(wizard.editor().value(), "");

        paste(&mut wizard, "not json", now);
        enter(&mut wizard, OFFLINE, now);
        assert_eq!(wizard.step(), WizardStep::Abi);
        assert_eq!(
            wizard.editor().error(),
            Some("Invalid ABI format. Please provide a valid JSON ABI")
        );

        paste(&mut wizard, FOO_ABI, now);
        enter(&mut wizard, OFFLINE, now);
        assert_eq!(wizard.step(), WizardStep::Function);
        assert_eq!(wizard.functions().len(), 1);
        assert_eq!(wizard.functions()[0].name, "foo");
    }

    #[test]
    fn invalid_contract_address_stays_on_step() {
        let now = Instant::now();
        let mut wizard = TransactionWizard::new();
        type_text(&mut wizard, "0x1234", OFFLINE, now);
        enter(&mut wizard, OFFLINE, now);
        assert_eq!(wizard.step(), WizardStep::ContractAddress);
        assert_eq!(wizard.editor().error(), Some("Invalid contract address"));
    }

    #[test]
    fn code_check_gates_the_address_step() {
        let now = Instant::now();
        let online = WizardContext {
            rpc_configured: true,
            wallet_paired: false,
        };
        let mut wizard = TransactionWizard::new();
        type_text(&mut wizard, DEAD, online, now);
        let WizardOutcome::CheckCode { ticket, address } = enter(&mut wizard, online, now) else {
            panic!("expected a code check");
        };
        assert!(wizard.is_validating());
        assert_eq!(
            wizard.handle(InputEvent::char('0').into(), online, now),
            WizardOutcome::Ignored
        );

        assert!(wizard.complete_code_check(ticket, Ok(false)));
        assert_eq!(wizard.step(), WizardStep::ContractAddress);
        assert_eq!(wizard.editor().value(), address.to_checksum(None));
        assert_eq!(wizard.editor().error(), Some("No contract deployed at this address"));

        let WizardOutcome::CheckCode { ticket, .. } = enter(&mut wizard, online, now) else {
            panic!("expected a second code check");
        };
        assert!(wizard.complete_code_check(ticket, Ok(true)));
        assert_eq!(wizard.step(), WizardStep::Abi);
        assert_eq!(wizard.contract(), Some(address));
    }

    #[test]
    fn check_result_after_reset_is_discarded() {
        let now = Instant::now();
        let online = WizardContext {
            rpc_configured: true,
            wallet_paired: true,
        };
        let mut wizard = TransactionWizard::new();
        type_text(&mut wizard, DEAD, online, now);
        let WizardOutcome::CheckCode { ticket, .. } = enter(&mut wizard, online, now) else {
            panic!("expected a code check");
        };
        wizard.reset();
        assert!(!wizard.complete_code_check(ticket, Ok(true)));
        assert_eq!(wizard.step(), WizardStep::ContractAddress);
        assert_eq!(wizard.editor().value(), "");
    }

    #[test]
    fn selection_wraps_both_ways() {
        let mut wizard = wizard_at_functions(TRANSFER_ABI);
        let now = Instant::now();
        assert_eq!(wizard.functions().len(), 2);
        wizard.handle(WizardInput::Up, OFFLINE, now);
        assert_eq!(wizard.selection(), 1);
        wizard.handle(WizardInput::Down, OFFLINE, now);
        assert_eq!(wizard.selection(), 0);
    }

    #[test]
    fn empty_function_list_refuses_to_advance() {
        let mut wizard = wizard_at_functions(
            r#"[{"type":"function","name":"get","stateMutability":"view","inputs":[],"outputs":[]}]"#,
        );
        enter(&mut wizard, OFFLINE, Instant::now());
        assert_eq!(wizard.step(), WizardStep::Function);
        assert_eq!(
            wizard.error(),
            Some(&WizardError::Validation(NO_WRITE_FUNCTIONS.to_string()))
        );
    }

    #[test]
    fn zero_input_function_prepares_selector_only_call() {
        let mut wizard = wizard_at_functions(FOO_ABI);
        let WizardOutcome::Prepared(tx) = enter(&mut wizard, OFFLINE, Instant::now()) else {
            panic!("expected a prepared transaction");
        };
        assert_eq!(tx.to, parse_address(DEAD).unwrap());
        assert_eq!(tx.data.to_vec(), vec![0xc2, 0x98, 0x55, 0x78]);
        assert_eq!(tx.value, U256::ZERO);
        assert_eq!(enter(&mut wizard, OFFLINE, Instant::now()), WizardOutcome::Ignored);
    }

    #[test]
    fn unpaired_wallet_is_a_precondition_error() {
        let unpaired = WizardContext {
            rpc_configured: false,
            wallet_paired: false,
        };
        let mut wizard = wizard_at_functions(FOO_ABI);
        assert_eq!(enter(&mut wizard, unpaired, Instant::now()), WizardOutcome::Changed);
        assert_eq!(
            wizard.error(),
            Some(&WizardError::Precondition(WALLET_NOT_CONNECTED.to_string()))
        );
        assert!(wizard.prepared().is_none());

        assert!(matches!(
            enter(&mut wizard, OFFLINE, Instant::now()),
            WizardOutcome::Prepared(_)
        ));
    }

    #[test]
    fn parameters_are_collected_in_order_and_coerced() {
        let now = Instant::now();
        let mut wizard = wizard_at_functions(TRANSFER_ABI);
        enter(&mut wizard, OFFLINE, now);
        assert_eq!(wizard.parameters().len(), 2);

        type_text(&mut wizard, DEAD, OFFLINE, now);
        enter(&mut wizard, OFFLINE, now);
        assert_eq!(wizard.active_parameter(), 1);

        type_text(&mut wizard, "12ab", OFFLINE, now);
        assert_eq!(enter(&mut wizard, OFFLINE, now), WizardOutcome::Changed);
        assert_eq!(
            wizard.error(),
            Some(&WizardError::Validation("Invalid integer for amount: 12ab".to_string()))
        );
        assert_eq!(wizard.active_parameter(), 1);

        for _ in 0..2 {
            wizard.handle(InputEvent::Backspace.into(), OFFLINE, now);
        }
        let WizardOutcome::Prepared(tx) = enter(&mut wizard, OFFLINE, now) else {
            panic!("expected a prepared transaction");
        };
        assert_eq!(&tx.data[..4], &[0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(tx.data[tx.data.len() - 1], 12);
    }

    #[test]
    fn correcting_an_early_parameter_walks_through_the_rest() {
        let now = Instant::now();
        let mut wizard = wizard_at_functions(
            r#"[{"type":"function","name":"set","stateMutability":"nonpayable","inputs":[{"name":"a","type":"uint256"},{"name":"b","type":"uint256"}]}]"#,
        );
        enter(&mut wizard, OFFLINE, now);

        type_text(&mut wizard, "z", OFFLINE, now);
        enter(&mut wizard, OFFLINE, now);
        type_text(&mut wizard, "2", OFFLINE, now);
        assert_eq!(enter(&mut wizard, OFFLINE, now), WizardOutcome::Changed);
        assert_eq!(
            wizard.error(),
            Some(&WizardError::Validation("Invalid integer for a: z".to_string()))
        );
        assert_eq!(wizard.active_parameter(), 0);

        wizard.handle(InputEvent::Backspace.into(), OFFLINE, now);
        type_text(&mut wizard, "1", OFFLINE, now);
        enter(&mut wizard, OFFLINE, now);
        assert_eq!(wizard.active_parameter(), 1);
        assert_eq!(wizard.parameters()[1].value(), "2");

        assert_eq!(
            wizard.handle(InputEvent::Backspace.into(), OFFLINE, now),
            WizardOutcome::Changed
        );
        type_text(&mut wizard, "3", OFFLINE, now);
        let WizardOutcome::Prepared(tx) = enter(&mut wizard, OFFLINE, now) else {
            panic!("expected a prepared transaction");
        };
        assert_eq!(tx.data.len(), 4 + 64);
        assert_eq!(tx.data[4 + 31], 1);
        assert_eq!(tx.data[4 + 63], 3);
    }

    #[test]
    fn coercion_follows_declared_type() {
        assert_eq!(coerce("uint256", "x", "42"), Ok(Argument::Uint(U256::from(42u64))));
        assert_eq!(
            coerce("int64", "x", "-7"),
            Ok(Argument::Int(I256::try_from(-7i64).unwrap()))
        );
        assert_eq!(coerce("bool", "x", "TRUE"), Ok(Argument::Bool(true)));
        assert_eq!(coerce("bool", "x", "yes"), Ok(Argument::Bool(false)));
        assert_eq!(coerce("uint256[]", "x", "[1,2]"), Ok(Argument::Raw("[1,2]".into())));
        assert_eq!(coerce("address", "x", DEAD), Ok(Argument::Raw(DEAD.into())));
        assert!(coerce("uint8", "x", "1.5").unwrap_err().contains("x"));
    }

    #[test]
    fn prepared_transaction_serializes_as_json() {
        let tx = PreparedTransaction {
            to: Address::ZERO,
            data: Bytes::from(vec![0xc2, 0x98, 0x55, 0x78]),
            value: U256::ZERO,
        };
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["data"], "0xc2985578");
        assert_eq!(json["value"], "0x0");
    }
}
