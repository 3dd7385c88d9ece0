//! Contract-call encoding from a user supplied JSON ABI.

use alloy::{
    dyn_abi::{DynSolType, DynSolValue, JsonAbiExt},
    json_abi::{Function, JsonAbi, StateMutability},
    primitives::{Bytes, I256, U256},
};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    #[error("Invalid ABI format. Please provide a valid JSON ABI")]
    InvalidAbi,
    #[error("Expected {expected} arguments, got {actual}")]
    ArgumentCount { expected: usize, actual: usize },
    #[error("Unsupported parameter type {ty} for {field}")]
    UnsupportedType { field: String, ty: String },
    #[error("Invalid value for {field} ({ty}): {reason}")]
    InvalidArgument {
        field: String,
        ty: String,
        reason: String,
    },
    #[error("Failed to encode call to {function}: {reason}")]
    Encoding { function: String, reason: String },
}

/// A parameter after type-directed coercion of the raw text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Argument {
    Uint(U256),
    Int(I256),
    Bool(bool),
    /// Left for the ABI type parser to interpret (addresses, bytes, strings, arrays).
    Raw(String),
}

/// A parsed ABI plus its functions in the order they were declared.
/// [`JsonAbi`] groups functions by name, which loses that order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractAbi {
    pub abi: JsonAbi,
    functions: Vec<Function>,
}

impl ContractAbi {
    pub fn functions(&self) -> &[Function] {
        &self.functions
    }
}

/// Parses ABI JSON. A single object is treated as a one-item array, and
/// hand-written entries may leave out empty `inputs`/`outputs`.
pub fn parse_abi(text: &str) -> Result<ContractAbi, EncodeError> {
    let value: serde_json::Value =
        serde_json::from_str(text.trim()).map_err(|_| EncodeError::InvalidAbi)?;
    let mut items = match value {
        serde_json::Value::Array(items) => items,
        object @ serde_json::Value::Object(_) => vec![object],
        _ => return Err(EncodeError::InvalidAbi),
    };

    let mut declared = Vec::new();
    for item in items.iter_mut() {
        if let serde_json::Value::Object(fields) = item {
            if fields.get("type").and_then(|ty| ty.as_str()) == Some("function") {
                for list in ["inputs", "outputs"] {
                    fields
                        .entry(list)
                        .or_insert_with(|| serde_json::Value::Array(Vec::new()));
                }
                if let Some(name) = fields.get("name").and_then(|name| name.as_str()) {
                    declared.push(name.to_string());
                }
            }
        }
    }

    let abi: JsonAbi = serde_json::from_value(serde_json::Value::Array(items))
        .map_err(|_| EncodeError::InvalidAbi)?;

    // Overloads keep their declaration order within one name.
    let mut overload: HashMap<&str, usize> = HashMap::new();
    let functions = declared
        .iter()
        .filter_map(|name| {
            let index = overload.entry(name.as_str()).or_default();
            let function = abi.function(name).and_then(|group| group.get(*index));
            *index += 1;
            function.cloned()
        })
        .collect();
    Ok(ContractAbi { abi, functions })
}

/// State-changing functions, in declaration order.
pub fn write_functions(abi: &ContractAbi) -> Vec<Function> {
    abi.functions()
        .iter()
        .filter(|function| {
            matches!(
                function.state_mutability,
                StateMutability::Payable | StateMutability::NonPayable
            )
        })
        .cloned()
        .collect()
}

/// Human label for an input, falling back to its position when unnamed.
pub fn input_label(function: &Function, index: usize) -> String {
    match function.inputs.get(index) {
        Some(param) if !param.name.is_empty() => param.name.clone(),
        _ => format!("param{index}"),
    }
}

pub fn signature_preview(function: &Function) -> String {
    let inputs = function
        .inputs
        .iter()
        .map(|param| {
            if param.name.is_empty() {
                param.ty.clone()
            } else {
                format!("{} {}", param.ty, param.name)
            }
        })
        .collect::<Vec<_>>()
        .join(", ");
    format!("{}({})", function.name, inputs)
}

/// Selector followed by the ABI encoded arguments.
pub fn encode_call(function: &Function, args: &[Argument]) -> Result<Bytes, EncodeError> {
    if args.len() != function.inputs.len() {
        return Err(EncodeError::ArgumentCount {
            expected: function.inputs.len(),
            actual: args.len(),
        });
    }

    let values = function
        .inputs
        .iter()
        .zip(args)
        .enumerate()
        .map(|(index, (param, arg))| {
            let field = input_label(function, index);
            let ty_name = param.selector_type().into_owned();
            let ty = DynSolType::parse(&ty_name).map_err(|_| EncodeError::UnsupportedType {
                field: field.clone(),
                ty: ty_name.clone(),
            })?;
            to_value(&ty, arg).map_err(|reason| EncodeError::InvalidArgument {
                field,
                ty: ty_name,
                reason,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    function
        .abi_encode_input(&values)
        .map(Bytes::from)
        .map_err(|err| EncodeError::Encoding {
            function: function.name.clone(),
            reason: err.to_string(),
        })
}

fn to_value(ty: &DynSolType, arg: &Argument) -> Result<DynSolValue, String> {
    match (ty, arg) {
        (DynSolType::Uint(bits), Argument::Uint(value)) => {
            if value.bit_len() > *bits {
                return Err(format!("does not fit in {bits} bits"));
            }
            Ok(DynSolValue::Uint(*value, *bits))
        }
        (DynSolType::Int(bits), Argument::Int(value)) => {
            if !int_fits(*value, *bits) {
                return Err(format!("does not fit in {bits} bits"));
            }
            Ok(DynSolValue::Int(*value, *bits))
        }
        (DynSolType::Bool, Argument::Bool(value)) => Ok(DynSolValue::Bool(*value)),
        (ty, Argument::Raw(text)) => ty.coerce_str(text).map_err(|err| err.to_string()),
        (ty, other) => Err(format!("{other:?} cannot be used as {ty}")),
    }
}

fn int_fits(value: I256, bits: usize) -> bool {
    if bits >= 256 {
        return true;
    }
    let limit = U256::from(1u8) << (bits - 1);
    let magnitude = value.unsigned_abs();
    if value.is_negative() {
        magnitude <= limit
    } else {
        magnitude < limit
    }
}
