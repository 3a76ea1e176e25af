use std::collections::HashMap;

use crate::flag::FlagValue;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// The flags of one program, in registration order, indexed by long name and by short key.
///
/// The short key index only points into `flags`; the `FlagValue` is always the source of truth.
#[derive(Debug, Default)]
pub(crate) struct Registry {
    flags: Vec<FlagValue>,
    names: HashMap<String, usize>,
    shorts: HashMap<char, usize>,
}

impl Registry {
    /// Add a flag.
    /// Re-registering a name replaces the earlier flag in place (last registration wins).
    /// Likewise, a short key claimed again moves to the newer flag.
    pub(crate) fn insert(&mut self, flag: FlagValue) {
        let index = match self.names.get(flag.name()) {
            Some(&index) => {
                #[cfg(feature = "tracing_debug")]
                {
                    debug!("Replacing the earlier registration of flag '{}'.", flag.name());
                }

                if let Some(previous_short) = self.flags[index].short_key() {
                    if self.shorts.get(&previous_short) == Some(&index) {
                        self.shorts.remove(&previous_short);
                    }
                }

                self.flags[index] = flag;
                index
            }
            None => {
                let index = self.flags.len();
                self.names.insert(flag.name().to_string(), index);
                self.flags.push(flag);
                index
            }
        };

        if let Some(short) = self.flags[index].short_key() {
            if let Some(previous) = self.shorts.insert(short, index) {
                if previous != index {
                    self.flags[previous].clear_short_key();
                }
            }
        }
    }

    pub(crate) fn get(&self, name: &str) -> Option<&FlagValue> {
        self.names.get(name).map(|&index| &self.flags[index])
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut FlagValue> {
        match self.names.get(name) {
            Some(&index) => Some(&mut self.flags[index]),
            None => None,
        }
    }

    pub(crate) fn short_mut(&mut self, short: char) -> Option<&mut FlagValue> {
        match self.shorts.get(&short) {
            Some(&index) => Some(&mut self.flags[index]),
            None => None,
        }
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &FlagValue> {
        self.flags.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut FlagValue> {
        self.flags.iter_mut()
    }

    pub(crate) fn len(&self) -> usize {
        self.flags.len()
    }

    pub(crate) fn reset(&mut self) {
        for flag in self.flags.iter_mut() {
            flag.reset();
        }
    }
}
