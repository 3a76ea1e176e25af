use thiserror::Error;

use crate::flag::{AssignError, FlagValue};
use crate::model::{Kind, Source, Value};
use crate::registry::Registry;
use crate::source::ConfigFileError;
use crate::tokens::{classify, Token};

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// Misuse of the registration Api, such as configuring a flag that was never registered.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Config error: {0}")]
pub struct ConfigError(pub(crate) String);

/// The reason [`FlagSet::parse`](crate::FlagSet::parse) stopped.
///
/// Every variant except [`ParseError::HelpRequested`] is a genuine failure, and every failure message names the flag involved.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// `--help` or `-h` was given; the help text has already been printed.
    /// Callers should treat this as a clean exit.
    #[error("help requested")]
    HelpRequested,

    /// A `--name` that is not registered.
    #[error("unknown flag: --{name}")]
    UnknownFlag {
        /// The name as written (without the `--`).
        name: String,
    },

    /// A `-k` whose key is not registered.
    #[error("unknown flag: -{key}")]
    UnknownShortFlag {
        /// The short key as written.
        key: char,
    },

    /// A key inside a combined cluster (ex: `-vdx`) that is not registered.
    #[error("unknown flag in combined sequence {token}: -{key}")]
    UnknownInCombined {
        /// The whole cluster token.
        token: String,
        /// The unregistered key.
        key: char,
    },

    /// A short form with `=` but not exactly one key before it, ex: `-=value` or `-vp=80`.
    #[error("malformed short flag {token}: expected a single key before '='")]
    MalformedShort {
        /// The offending token.
        token: String,
    },

    /// A value-taking flag appeared before the final position of a combined cluster.
    #[error("flag --{flag} (-{key}) must be last in combined sequence {token}")]
    MustBeLast {
        /// The whole cluster token.
        token: String,
        /// The misplaced key.
        key: char,
        /// The long name of the misplaced flag.
        flag: String,
    },

    /// A value-taking flag reached the end of input, or an adjacent long flag.
    #[error("flag --{flag} requires a value")]
    MissingValue {
        /// The long name of the flag.
        flag: String,
    },

    /// The raw input does not convert to the flag's kind.
    #[error("invalid {kind} value for flag --{flag}: {raw}")]
    InvalidValue {
        /// The long name of the flag.
        flag: String,
        /// The input as given.
        raw: String,
        /// The kind of the flag.
        kind: Kind,
    },

    /// The flag's validator rejected the value.
    #[error("validation failed for flag --{flag}: {message}")]
    Validation {
        /// The long name of the flag.
        flag: String,
        /// The validator's message.
        message: String,
    },

    /// A required flag was not set by any source.
    #[error("required flag --{flag} not provided")]
    RequiredMissing {
        /// The long name of the flag.
        flag: String,
    },

    /// A flag was set while one of its dependencies was not.
    #[error("flag --{flag} requires --{dependency} to be set")]
    DependencyUnset {
        /// The flag that was set.
        flag: String,
        /// The dependency that was not.
        dependency: String,
    },

    /// A flag declares a dependency on a name that is not registered.
    #[error("flag --{flag} depends on non-existent flag --{dependency}")]
    DependencyMissing {
        /// The flag declaring the dependency.
        flag: String,
        /// The unregistered name.
        dependency: String,
    },

    /// The configuration file could not be used.
    #[error("config file error: {0}")]
    Config(#[from] ConfigFileError),

    /// An environment variable is present but its value is unusable for the flag.
    #[error("invalid environment variable {variable}: {cause}")]
    Environment {
        /// The variable name.
        variable: String,
        /// The variable's value as read.
        raw: String,
        /// The conversion or validation failure.
        #[source]
        cause: Box<ParseError>,
    },
}

impl ParseError {
    /// Whether this is the help outcome rather than a failure.
    pub fn is_help(&self) -> bool {
        matches!(self, ParseError::HelpRequested)
    }

    pub(crate) fn from_assign(flag: &str, error: AssignError) -> Self {
        match error {
            AssignError::Conversion(conversion) => ParseError::InvalidValue {
                flag: flag.to_string(),
                raw: conversion.raw().to_string(),
                kind: conversion.kind(),
            },
            AssignError::Validation(message) => ParseError::Validation {
                flag: flag.to_string(),
                message,
            },
        }
    }
}

pub(crate) fn assign_str(flag: &mut FlagValue, raw: &str, source: Source) -> Result<(), ParseError> {
    flag.assign_str(raw, source)
        .map_err(|error| ParseError::from_assign(flag.name(), error))
}

fn assign_switch(flag: &mut FlagValue) -> Result<(), ParseError> {
    flag.assign(Value::Bool(true), Source::CommandLine)
        .map_err(|error| ParseError::from_assign(flag.name(), error))
}

/// Walks the Cli tokens once, left to right, assigning onto the registry.
pub(crate) struct Parser<'r> {
    registry: &'r mut Registry,
}

impl<'r> std::fmt::Debug for Parser<'r> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parser{..}").finish()
    }
}

impl<'r> Parser<'r> {
    pub(crate) fn new(registry: &'r mut Registry) -> Self {
        Self { registry }
    }

    /// Apply the tokens, returning the positional arguments.
    ///
    /// Each token consumes itself and, at most, the token after it.
    /// The first failure stops the walk; assignments made before it are kept.
    pub(crate) fn consume(self, tokens: &[&str]) -> Result<Vec<String>, ParseError> {
        let Parser { registry } = self;
        let mut positionals = Vec::default();
        let mut only_positionals = false;
        let mut index = 0;

        while let Some(token) = tokens.get(index) {
            index += 1;

            if only_positionals {
                positionals.push(token.to_string());
                continue;
            }

            let classified = classify(token);

            #[cfg(feature = "tracing_debug")]
            {
                debug!("Cli token '{token}' classified as {classified:?}.");
            }

            match classified {
                Token::Help => return Err(ParseError::HelpRequested),
                Token::Separator => only_positionals = true,
                Token::Positional(value) => positionals.push(value.to_string()),
                Token::Long { name, value } => {
                    let flag = registry
                        .get_mut(name)
                        .ok_or_else(|| ParseError::UnknownFlag {
                            name: name.to_string(),
                        })?;

                    match value {
                        Some(value) => assign_str(flag, value, Source::CommandLine)?,
                        // The look-ahead never swallows another long flag.
                        None => match tokens.get(index) {
                            Some(next) if !next.starts_with("--") => {
                                index += 1;
                                assign_str(flag, next, Source::CommandLine)?;
                            }
                            _ if flag.kind() == Kind::Bool => assign_switch(flag)?,
                            _ => {
                                return Err(ParseError::MissingValue {
                                    flag: flag.name().to_string(),
                                });
                            }
                        },
                    }
                }
                Token::Short { key, value } => {
                    let flag = registry
                        .short_mut(key)
                        .ok_or(ParseError::UnknownShortFlag { key })?;
                    index += consume_short(flag, value, tokens.get(index).copied())?;
                }
                Token::Combined { keys } => {
                    let unknown = |key: char| ParseError::UnknownInCombined {
                        token: token.to_string(),
                        key,
                    };

                    if let Some((last, heads)) = keys.split_last() {
                        for key in heads {
                            let flag = registry.short_mut(*key).ok_or_else(|| unknown(*key))?;

                            if flag.kind() != Kind::Bool {
                                return Err(ParseError::MustBeLast {
                                    token: token.to_string(),
                                    key: *key,
                                    flag: flag.name().to_string(),
                                });
                            }

                            assign_switch(flag)?;
                        }

                        let flag = registry.short_mut(*last).ok_or_else(|| unknown(*last))?;
                        index += consume_short(flag, None, tokens.get(index).copied())?;
                    }
                }
                Token::Malformed(token) => {
                    return Err(ParseError::MalformedShort {
                        token: token.to_string(),
                    });
                }
            }
        }

        Ok(positionals)
    }
}

// Returns how many of the following tokens were used (0 or 1).
// A value-taking short flag uses the next token whole, even when it looks like a flag.
fn consume_short(
    flag: &mut FlagValue,
    value: Option<&str>,
    next: Option<&str>,
) -> Result<usize, ParseError> {
    match (value, next) {
        (Some(value), _) => {
            assign_str(flag, value, Source::CommandLine)?;
            Ok(0)
        }
        (None, _) if flag.kind() == Kind::Bool => {
            assign_switch(flag)?;
            Ok(0)
        }
        (None, Some(next)) => {
            assign_str(flag, next, Source::CommandLine)?;
            Ok(1)
        }
        (None, None) => Err(ParseError::MissingValue {
            flag: flag.name().to_string(),
        }),
    }
}
