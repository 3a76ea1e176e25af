use std::time::Duration;

use crate::convert::format_duration;

/// The closed set of value types a flag may hold.
///
/// The kind of a flag is decided at registration and never changes afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// Free-form text.
    String,
    /// A signed 64 bit integer.
    Int,
    /// `true` or `false`.
    Bool,
    /// A 64 bit floating point number.
    Float64,
    /// A non-negative span of time, such as `1h30m`.
    Duration,
    /// An ordered list of strings, written comma separated on the Cli.
    StringList,
}

impl Kind {
    /// The lower-case name used in messages, ex: `float64`.
    pub fn name(&self) -> &'static str {
        match self {
            Kind::String => "string",
            Kind::Int => "int",
            Kind::Bool => "bool",
            Kind::Float64 => "float64",
            Kind::Duration => "duration",
            Kind::StringList => "stringList",
        }
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The value held by a flag, tagged by its [`Kind`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// See [`Kind::String`].
    String(String),
    /// See [`Kind::Int`].
    Int(i64),
    /// See [`Kind::Bool`].
    Bool(bool),
    /// See [`Kind::Float64`].
    Float64(f64),
    /// See [`Kind::Duration`].
    Duration(Duration),
    /// See [`Kind::StringList`].
    StringList(Vec<String>),
}

impl Value {
    /// The kind of this value.
    pub fn kind(&self) -> Kind {
        match self {
            Value::String(_) => Kind::String,
            Value::Int(_) => Kind::Int,
            Value::Bool(_) => Kind::Bool,
            Value::Float64(_) => Kind::Float64,
            Value::Duration(_) => Kind::Duration,
            Value::StringList(_) => Kind::StringList,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::String(value) => write!(f, "{value}"),
            Value::Int(value) => write!(f, "{value}"),
            Value::Bool(value) => write!(f, "{value}"),
            Value::Float64(value) => write!(f, "{value}"),
            Value::Duration(value) => write!(f, "{}", format_duration(*value)),
            Value::StringList(values) => write!(f, "[{}]", values.join(", ")),
        }
    }
}

/// Where the current value of a flag came from.
///
/// Variants are ordered by priority: a source may overwrite values from any lower source, but never from an equal or higher one.
/// The command line is the exception, it always overwrites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Source {
    /// The JSON configuration file.
    Config,
    /// A process environment variable.
    Environment,
    /// A command line argument.
    CommandLine,
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::Config => write!(f, "config"),
            Source::Environment => write!(f, "environment"),
            Source::CommandLine => write!(f, "command line"),
        }
    }
}
