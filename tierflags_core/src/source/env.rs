use std::collections::HashMap;
use std::env::VarError;

use crate::flag::FlagValue;
use crate::model::Source;
use crate::parser::{assign_str, ParseError};
use crate::registry::Registry;

#[cfg(feature = "tracing_debug")]
use tracing::{debug, trace};

/// A key/value lookup standing in for the process environment.
///
/// The flag set reads environment variables (and `HOME`) only through this trait.
/// ```
/// use std::collections::HashMap;
/// use std::env::VarError;
/// use tierflags_core::Environment;
///
/// let environment = HashMap::from([("APP_PORT".to_string(), "9000".to_string())]);
/// assert_eq!(environment.var("APP_PORT"), Ok("9000".to_string()));
/// assert_eq!(environment.var("APP_HOST"), Err(VarError::NotPresent));
/// ```
pub trait Environment: Send + Sync {
    /// The value of `key`, following [`std::env::var`].
    /// A value that is set but not valid unicode is [`VarError::NotUnicode`], which fails the parse when a flag reads it.
    fn var(&self, key: &str) -> Result<String, VarError>;
}

/// Reads the real process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnvironment;

impl Environment for ProcessEnvironment {
    fn var(&self, key: &str) -> Result<String, VarError> {
        std::env::var(key)
    }
}

impl Environment for HashMap<String, String> {
    fn var(&self, key: &str) -> Result<String, VarError> {
        self.get(key).cloned().ok_or(VarError::NotPresent)
    }
}

/// How flag names map onto environment variables.
#[derive(Debug, Default)]
pub(crate) struct EnvSource {
    enabled: bool,
    prefix: Option<String>,
}

impl EnvSource {
    pub(crate) fn enable(&mut self) {
        self.enabled = true;
    }

    pub(crate) fn set_prefix(&mut self, prefix: impl Into<String>) {
        self.prefix.replace(prefix.into());
        self.enabled = true;
    }

    /// The variable consulted for `flag`.
    /// An explicit name wins; otherwise `db-host` becomes `DB_HOST`, then `<PREFIX>_DB_HOST` under a non-empty prefix.
    pub(crate) fn variable_name(&self, flag: &FlagValue) -> String {
        if let Some(env_var) = flag.env_var() {
            return env_var.to_string();
        }

        let derived = flag.name().replace('-', "_").to_ascii_uppercase();

        match self.prefix.as_deref() {
            Some(prefix) if !prefix.is_empty() => format!("{prefix}_{derived}"),
            _ => derived,
        }
    }

    /// Apply every present, non-empty variable onto the registry, in registration order.
    pub(crate) fn load(
        &self,
        registry: &mut Registry,
        environment: &(impl Environment + ?Sized),
    ) -> Result<(), ParseError> {
        if !self.enabled {
            return Ok(());
        }

        for flag in registry.iter_mut() {
            if flag.outranks(Source::Environment) {
                #[cfg(feature = "tracing_debug")]
                {
                    trace!("Environment skipped for flag '{}'; already set.", flag.name());
                }

                continue;
            }

            let variable = self.variable_name(flag);
            let raw = match environment.var(&variable) {
                Ok(raw) if !raw.is_empty() => raw,
                Err(VarError::NotUnicode(raw)) => {
                    let raw = raw.to_string_lossy().into_owned();

                    return Err(ParseError::Environment {
                        variable,
                        raw: raw.clone(),
                        cause: Box::new(ParseError::InvalidValue {
                            flag: flag.name().to_string(),
                            raw,
                            kind: flag.kind(),
                        }),
                    });
                }
                _ => {
                    #[cfg(feature = "tracing_debug")]
                    {
                        trace!("Environment variable {variable} is unset for flag '{}'.", flag.name());
                    }

                    continue;
                }
            };

            assign_str(flag, &raw, Source::Environment).map_err(|cause| {
                ParseError::Environment {
                    variable: variable.clone(),
                    raw: raw.clone(),
                    cause: Box::new(cause),
                }
            })?;

            #[cfg(feature = "tracing_debug")]
            {
                debug!("Environment variable {variable} applied to flag '{}'.", flag.name());
            }
        }

        Ok(())
    }
}
