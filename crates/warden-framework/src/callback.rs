//! Callback-data protocol for menu buttons.
//!
//! Button payloads are encoded as `op(arg1,arg2)`, or a bare `op` when there
//! are no arguments:
//!
//! | Payload                   | Meaning                                   |
//! |---------------------------|-------------------------------------------|
//! | `help_module(bios)`       | open the help page of module `bios`       |
//! | `help_prev(2)`            | go to the page before page 2              |
//! | `help_next(2)`            | go to the page after page 2               |
//! | `help_back`               | back to the first help page               |
//! | `stngs_module(-100,bios)` | open `bios` settings for chat `-100`      |
//! | `stngs_prev(-100,2)`      | settings page before page 2               |
//! | `stngs_next(-100,2)`      | settings page after page 2                |
//! | `stngs_back(-100)`        | back to the first settings page           |
//!
//! Module keys never contain `(`, `)` or `,`; the registry rejects such
//! names, so the encoding is unambiguous.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use warden_core::ChatId;

/// Prefix shared by every help-menu payload.
pub const HELP_PREFIX: &str = "help_";
/// Prefix shared by every settings-menu payload.
pub const SETTINGS_PREFIX: &str = "stngs_";

/// A decoded menu button payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackData {
    HelpModule(String),
    HelpPrev(usize),
    HelpNext(usize),
    HelpBack,
    SettingsModule { chat: ChatId, module: String },
    SettingsPrev { chat: ChatId, page: usize },
    SettingsNext { chat: ChatId, page: usize },
    SettingsBack(ChatId),
}

/// Reasons a payload fails to decode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallbackParseError {
    #[error("malformed callback data: {0:?}")]
    Malformed(String),

    #[error("unknown callback operation: {0:?}")]
    UnknownOp(String),

    #[error("operation {op} expects {expected} argument(s), got {got}")]
    Arity {
        op: String,
        expected: usize,
        got: usize,
    },

    #[error("invalid callback argument: {0:?}")]
    BadArgument(String),
}

fn split(data: &str) -> Result<(&str, Vec<&str>), CallbackParseError> {
    let malformed = || CallbackParseError::Malformed(data.to_string());

    let Some(open) = data.find('(') else {
        if data.is_empty() || data.contains([')', ',']) {
            return Err(malformed());
        }
        return Ok((data, Vec::new()));
    };

    let inner = data[open + 1..].strip_suffix(')').ok_or_else(malformed)?;
    if inner.contains(['(', ')']) {
        return Err(malformed());
    }
    let args = if inner.is_empty() {
        Vec::new()
    } else {
        inner.split(',').collect()
    };
    Ok((&data[..open], args))
}

fn arity(op: &str, args: &[&str], expected: usize) -> Result<(), CallbackParseError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(CallbackParseError::Arity {
            op: op.to_string(),
            expected,
            got: args.len(),
        })
    }
}

fn parse_page(arg: &str) -> Result<usize, CallbackParseError> {
    arg.parse()
        .map_err(|_| CallbackParseError::BadArgument(arg.to_string()))
}

fn parse_chat(arg: &str) -> Result<ChatId, CallbackParseError> {
    arg.parse()
        .map(ChatId)
        .map_err(|_| CallbackParseError::BadArgument(arg.to_string()))
}

fn parse_module(arg: &str) -> Result<String, CallbackParseError> {
    if arg.is_empty() {
        return Err(CallbackParseError::BadArgument(arg.to_string()));
    }
    Ok(arg.to_lowercase())
}

impl FromStr for CallbackData {
    type Err = CallbackParseError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let (op, args) = split(data)?;
        let parsed = match op {
            "help_module" => {
                arity(op, &args, 1)?;
                Self::HelpModule(parse_module(args[0])?)
            }
            "help_prev" => {
                arity(op, &args, 1)?;
                Self::HelpPrev(parse_page(args[0])?)
            }
            "help_next" => {
                arity(op, &args, 1)?;
                Self::HelpNext(parse_page(args[0])?)
            }
            "help_back" => {
                arity(op, &args, 0)?;
                Self::HelpBack
            }
            "stngs_module" => {
                arity(op, &args, 2)?;
                Self::SettingsModule {
                    chat: parse_chat(args[0])?,
                    module: parse_module(args[1])?,
                }
            }
            "stngs_prev" => {
                arity(op, &args, 2)?;
                Self::SettingsPrev {
                    chat: parse_chat(args[0])?,
                    page: parse_page(args[1])?,
                }
            }
            "stngs_next" => {
                arity(op, &args, 2)?;
                Self::SettingsNext {
                    chat: parse_chat(args[0])?,
                    page: parse_page(args[1])?,
                }
            }
            "stngs_back" => {
                arity(op, &args, 1)?;
                Self::SettingsBack(parse_chat(args[0])?)
            }
            other => return Err(CallbackParseError::UnknownOp(other.to_string())),
        };
        Ok(parsed)
    }
}

impl fmt::Display for CallbackData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HelpModule(module) => write!(f, "help_module({module})"),
            Self::HelpPrev(page) => write!(f, "help_prev({page})"),
            Self::HelpNext(page) => write!(f, "help_next({page})"),
            Self::HelpBack => f.write_str("help_back"),
            Self::SettingsModule { chat, module } => write!(f, "stngs_module({chat},{module})"),
            Self::SettingsPrev { chat, page } => write!(f, "stngs_prev({chat},{page})"),
            Self::SettingsNext { chat, page } => write!(f, "stngs_next({chat},{page})"),
            Self::SettingsBack(chat) => write!(f, "stngs_back({chat})"),
        }
    }
}
