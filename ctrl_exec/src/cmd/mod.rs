//! # Operator command module
//!
//! Free-text operator commands of the form `--name` or `--name=value`,
//! typed at the console while the control loop runs. Parsing lives in
//! [`parse`], the interactive console task in [`console`]; applying a
//! parsed command to the parameter store is the job of
//! `crate::cmd_processor`.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod console;
mod parse;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use thiserror::Error;

// Internal
pub use parse::*;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Command name: display the command table.
pub const HELP_COMMAND: &str = "help";

/// Command name: graceful shutdown.
pub const STOP_COMMAND: &str = "stop";

/// Command name: toggle pause.
pub const PAUSE_COMMAND: &str = "pause";

/// Command name: set the target stand-off distance.
pub const REFERENCE_COMMAND: &str = "rif";

/// Command name: set the sensor calibration curve.
pub const CALIBRATION_COMMAND: &str = "cal";

/// Help text echoed for `--help`.
pub const HELP_TEXT: &str = "\
Available commands:
  --rif=<mm>     Set the target stand-off distance in millimeters
  --pause        Toggle pause (zero velocity, controller state frozen)
  --cal={m,q}    Set the sensor calibration curve (exactly two values)
  --stop         Stop the control loop and deactivate the arm
  --help         Display this help message";

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A parsed operator command.
#[derive(Clone, Debug, PartialEq)]
pub enum OpCmd {
    /// Display the command table.
    Help,

    /// Toggle pause.
    TogglePause,

    /// Set the target stand-off distance [mm].
    SetReference(f64),

    /// Set the sensor calibration curve.
    SetCalibration { m: f64, q: f64 },

    /// Graceful shutdown.
    Stop,
}

/// Possible errors raised while parsing operator input.
///
/// Every variant is echoed to the operator and then ignored: a bad token
/// never stops the loop or the remaining tokens on the line.
#[derive(Debug, Error, PartialEq)]
pub enum CmdParseError {
    #[error("`{0}` is not a command option, expected `--name` or `--name=value`")]
    NotAnOption(String),

    #[error("`--{0}` is not a recognised command, try `--help`")]
    UnknownCommand(String),

    #[error("`--{name}` expects a numeric value, found `{value}`")]
    InvalidValue { name: String, value: String },

    #[error("`--{name}` expects {expected} values, found {found}")]
    WrongElementCount {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("`--{0}` requires a value, use `--{0}=<value>`")]
    MissingValue(String),
}
