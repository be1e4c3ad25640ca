//! UCI (Universal Chess Interface) engine option definitions.
//!
//! An engine announces each of its settings with an `option` line during
//! the `uci` handshake:
//!
//! ```text
//! option name Hash type spin default 16 min 1 max 1024
//! option name Style type combo default Normal var Solid var Normal var Risky
//! option name Ponder type check default false
//! option name NalimovPath type string default <empty>
//! option name Clear Hash type button
//! ```
//!
//! [`UciOption`] parses such a line, validates values set against it, and
//! renders both the definition and the matching `setoption` command.
//!
//! # Example
//!
//! ```
//! use uci::{OptionValue, UciOption};
//!
//! let mut hash = UciOption::parse("option name Hash type spin default 16 min 1 max 1024").unwrap();
//! hash.set_value_from_str("256").unwrap();
//! assert_eq!(hash.value(), &OptionValue::Int(256));
//! assert_eq!(hash.set_option_command(), "setoption name Hash value 256");
//! assert!(hash.set_value_from_str("4096").is_err());
//! ```

mod option;

pub use option::{OptionValue, UciOption, UciOptionKind};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UciError {
    #[error("Option has no name")]
    MissingName,
    #[error("Option has no type")]
    MissingType,
    #[error("Unknown option type: {0}")]
    UnknownType(String),
    #[error("Spin option needs min <= max, got min {min} max {max}")]
    InvalidBounds { min: i64, max: i64 },
    #[error("Combo option has no variants")]
    EmptyCombo,
    #[error("Invalid {kind} value: {value:?}")]
    InvalidValue { kind: &'static str, value: String },
    #[error("Value {value} outside [{min}, {max}]")]
    OutOfBounds { value: i64, min: i64, max: i64 },
    #[error("Unknown combo variant: {0}")]
    UnknownVariant(String),
    #[error("Button options carry no value")]
    ButtonHasNoValue,
}
