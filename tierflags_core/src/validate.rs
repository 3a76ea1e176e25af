use crate::parser::ParseError;
use crate::registry::Registry;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// Check the merged registry, in three passes: required flags, then dependencies, then validators.
///
/// Each pass walks the flags in registration order, and the first failure is returned.
/// A flag counts as set when any source assigned it, so a required flag may be satisfied by the config file or the environment.
pub(crate) fn validate_all(registry: &Registry) -> Result<(), ParseError> {
    required(registry)?;
    dependencies(registry)?;
    validators(registry)?;

    #[cfg(feature = "tracing_debug")]
    {
        debug!("All {} flags passed validation.", registry.len());
    }

    Ok(())
}

fn required(registry: &Registry) -> Result<(), ParseError> {
    match registry
        .iter()
        .find(|flag| flag.required() && !flag.changed())
    {
        Some(flag) => Err(ParseError::RequiredMissing {
            flag: flag.name().to_string(),
        }),
        None => Ok(()),
    }
}

fn dependencies(registry: &Registry) -> Result<(), ParseError> {
    for flag in registry.iter().filter(|flag| flag.changed()) {
        for dependency in flag.dependencies() {
            match registry.get(dependency) {
                None => {
                    return Err(ParseError::DependencyMissing {
                        flag: flag.name().to_string(),
                        dependency: dependency.clone(),
                    });
                }
                Some(target) if !target.changed() => {
                    return Err(ParseError::DependencyUnset {
                        flag: flag.name().to_string(),
                        dependency: dependency.clone(),
                    });
                }
                Some(_) => {}
            }
        }
    }

    Ok(())
}

// Runs again over the final values, including defaults nobody assigned.
fn validators(registry: &Registry) -> Result<(), ParseError> {
    for flag in registry.iter().filter(|flag| flag.has_validator()) {
        flag.validate().map_err(|message| ParseError::Validation {
            flag: flag.name().to_string(),
            message,
        })?;
    }

    Ok(())
}
