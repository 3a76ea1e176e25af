mod base;
mod interface;
mod middleware;
mod printer;

pub use base::{ConfigError, ParseError};
pub(crate) use base::assign_str;
pub use interface::{ConsoleInterface, UserInterface};
pub(crate) use interface::{ColumnRenderer, LeftWidth, TotalWidth, UsageWidth};
pub(crate) use middleware::Pipeline;
pub(crate) use printer::{About, Printer};

#[cfg(any(test, feature = "unit_test"))]
pub(crate) use interface::util;
