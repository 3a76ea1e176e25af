//! Core engine for `tierflags`.
//! See [documentation root](https://docs.rs/tierflags/latest/tierflags/index.html) for full details.
#![deny(missing_docs)]
mod api;
mod constant;
pub mod convert;
mod flag;
mod model;
mod parser;
mod registry;
mod source;
mod tokens;
mod validate;

pub use api::*;
pub use convert::ConversionError;
pub use flag::{FlagValue, Validator};
pub use model::*;
pub use parser::{ConfigError, ConsoleInterface, ParseError, UserInterface};
pub use source::{ConfigFileError, Environment, ProcessEnvironment};

#[cfg(any(test, feature = "unit_test"))]
pub use parser::util::InMemoryInterface;

#[cfg(test)]
#[macro_use]
extern crate assert_matches;
