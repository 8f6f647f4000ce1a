//! Option binding.
//!
//! Binds the words that follow a matched command name against the command's
//! declared options:
//! - named options (`--long`, `-s`) consume following words up to their arity
//! - positional options take the remaining plain words in position order
//! - unbound options fall back to their default value
//! - required options that end up unbound are an error

use std::path::{Path, PathBuf};

use thiserror::Error;

use super::option::{CommandOption, OptionType};
use super::registration::CommandRegistration;
use super::tokenizer::{tokenize, Token};

/// Reasons arguments could not be bound.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BindingError {
    #[error("Missing mandatory option '{option}'")]
    MissingRequired { option: String },

    #[error("Option '{option}' requires at least {min} value(s), got {found}")]
    NotEnoughArguments {
        option: String,
        min: usize,
        found: usize,
    },

    #[error("Unrecognized option '{option}'")]
    UnrecognizedOption { option: String },

    #[error("Unexpected argument '{value}'")]
    UnexpectedArgument { value: String },

    #[error("Invalid value '{value}' for option '{option}': expected {expected}")]
    Coercion {
        option: String,
        value: String,
        expected: &'static str,
    },
}

/// A typed value bound to an option.
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Path(PathBuf),
    List(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
struct BoundOption {
    names: Vec<String>,
    value: OptionValue,
}

/// Arguments bound for one invocation, looked up by any of an option's names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundArguments {
    entries: Vec<BoundOption>,
}

impl BoundArguments {
    /// Returns the value bound to the option with the given long or short name.
    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.entries
            .iter()
            .find(|e| e.names.iter().any(|n| n == name))
            .map(|e| &e.value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        match self.get(name)? {
            OptionValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn get_i64(&self, name: &str) -> Option<i64> {
        match self.get(name)? {
            OptionValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn get_f64(&self, name: &str) -> Option<f64> {
        match self.get(name)? {
            OptionValue::Float(n) => Some(*n),
            OptionValue::Integer(n) => Some(*n as f64),
            _ => None,
        }
    }

    /// Boolean value of a flag; absent flags read as `false`.
    pub fn get_bool(&self, name: &str) -> bool {
        matches!(self.get(name), Some(OptionValue::Boolean(true)))
    }

    pub fn get_path(&self, name: &str) -> Option<&Path> {
        match self.get(name)? {
            OptionValue::Path(p) => Some(p),
            _ => None,
        }
    }

    pub fn get_list(&self, name: &str) -> Option<&[String]> {
        match self.get(name)? {
            OptionValue::List(values) => Some(values),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Binds argument words against a registration's options.
pub fn bind(
    registration: &CommandRegistration,
    args: &[String],
) -> Result<BoundArguments, BindingError> {
    let options = registration.options();
    let tokens = tokenize(args);
    let mut raw: Vec<Option<Vec<String>>> = vec![None; options.len()];
    let mut positional: Vec<String> = Vec::new();

    let mut i = 0;
    while i < tokens.len() {
        match &tokens[i] {
            Token::EndOfOptions => i += 1,
            Token::Word(word) => {
                positional.push(word.clone());
                i += 1;
            }
            Token::LongOption { name, value } => {
                let (index, _) = registration.find_long(name).ok_or_else(|| {
                    BindingError::UnrecognizedOption {
                        option: format!("--{name}"),
                    }
                })?;
                i += 1;
                let values = match value {
                    Some(v) => vec![v.clone()],
                    None => consume_values(&options[index], &tokens, &mut i),
                };
                check_min_arity(&options[index], &values)?;
                record(&mut raw[index], &options[index], values);
            }
            Token::ShortOptions(names) => {
                i += 1;
                for (n, name) in names.iter().enumerate() {
                    let (index, _) = registration.find_short(*name).ok_or_else(|| {
                        BindingError::UnrecognizedOption {
                            option: format!("-{name}"),
                        }
                    })?;
                    // Only the last option of a combined group may take values
                    let values = if n + 1 == names.len() {
                        consume_values(&options[index], &tokens, &mut i)
                    } else {
                        Vec::new()
                    };
                    check_min_arity(&options[index], &values)?;
                    record(&mut raw[index], &options[index], values);
                }
            }
        }
    }

    bind_positional(options, &mut raw, &positional)?;

    let mut entries = Vec::new();
    for (option, values) in options.iter().zip(raw) {
        let value = match values {
            Some(values) => Some(coerce(option, &values)?),
            None => match option.default_value() {
                Some(default) => Some(coerce(option, &[default.to_string()])?),
                None if option.is_required() => {
                    return Err(BindingError::MissingRequired {
                        option: option.display_name(),
                    })
                }
                None if option.option_type() == OptionType::Boolean => {
                    Some(OptionValue::Boolean(false))
                }
                None => None,
            },
        };

        if let Some(value) = value {
            entries.push(BoundOption {
                names: option.all_names(),
                value,
            });
        }
    }

    Ok(BoundArguments { entries })
}

/// Takes following plain words for a named option, up to its maximum arity.
fn consume_values(option: &CommandOption, tokens: &[Token], i: &mut usize) -> Vec<String> {
    let (_, max) = option.effective_arity();
    let mut values = Vec::new();

    while values.len() < max {
        let Some(Token::Word(word)) = tokens.get(*i) else {
            break;
        };
        // A flag only swallows an explicit boolean literal
        if option.option_type() == OptionType::Boolean && parse_bool(word).is_none() {
            break;
        }
        values.push(word.clone());
        *i += 1;
    }

    values
}

fn bind_positional(
    options: &[CommandOption],
    raw: &mut [Option<Vec<String>>],
    positional: &[String],
) -> Result<(), BindingError> {
    let mut order: Vec<usize> = (0..options.len())
        .filter(|&idx| options[idx].is_positional() && raw[idx].is_none())
        .collect();
    order.sort_by_key(|&idx| options[idx].position());

    let mut cursor = 0;
    for idx in order {
        if cursor >= positional.len() {
            break;
        }
        let (_, max) = options[idx].effective_arity();
        let take = max.max(1).min(positional.len() - cursor);
        let values = positional[cursor..cursor + take].to_vec();
        cursor += take;
        check_min_arity(&options[idx], &values)?;
        raw[idx] = Some(values);
    }

    match positional.get(cursor) {
        Some(extra) => Err(BindingError::UnexpectedArgument {
            value: extra.clone(),
        }),
        None => Ok(()),
    }
}

fn check_min_arity(option: &CommandOption, values: &[String]) -> Result<(), BindingError> {
    let (min, _) = option.effective_arity();
    if values.len() < min {
        return Err(BindingError::NotEnoughArguments {
            option: option.display_name(),
            min,
            found: values.len(),
        });
    }
    Ok(())
}

fn record(slot: &mut Option<Vec<String>>, option: &CommandOption, values: Vec<String>) {
    match slot {
        Some(existing) if option.option_type() == OptionType::List => existing.extend(values),
        _ => *slot = Some(values),
    }
}

fn coerce(option: &CommandOption, values: &[String]) -> Result<OptionValue, BindingError> {
    let first = values.first().map(String::as_str);
    let invalid = |value: &str, expected: &'static str| BindingError::Coercion {
        option: option.display_name(),
        value: value.to_string(),
        expected,
    };

    match option.option_type() {
        OptionType::Boolean => match first {
            None => Ok(OptionValue::Boolean(true)),
            Some(v) => parse_bool(v)
                .map(OptionValue::Boolean)
                .ok_or_else(|| invalid(v, "true or false")),
        },
        OptionType::Integer => {
            let v = first.unwrap_or_default();
            v.parse::<i64>()
                .map(OptionValue::Integer)
                .map_err(|_| invalid(v, "an integer"))
        }
        OptionType::Float => {
            let v = first.unwrap_or_default();
            v.parse::<f64>()
                .map(OptionValue::Float)
                .map_err(|_| invalid(v, "a number"))
        }
        OptionType::Path => Ok(OptionValue::Path(PathBuf::from(first.unwrap_or_default()))),
        OptionType::String => Ok(OptionValue::Text(values.join(" "))),
        OptionType::List => Ok(OptionValue::List(values.to_vec())),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}
