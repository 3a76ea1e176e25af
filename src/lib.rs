//! `tierflags` is a typed command line flag parser for Rust, which also reads flags from a JSON config file and the environment.
//!
//! Many programs take the same setting from several places: a config file checked into a deployment, an environment variable set by the orchestrator, and a command line override typed by an operator.
//! `tierflags` resolves each flag from all of these in a single [`FlagSet::parse`], so the program itself only ever reads one merged value.
//! Specifically, `tierflags` attempts to prioritize the following design concerns:
//! * *Typed flags*:
//! Each flag holds one of six kinds (string, int, bool, float64, duration, string list), and is read back through a typed [`Handle`].
//! The user should not call any `&str -> T` conversion functions directly.
//! * *Predictable layering*:
//! Every source has a fixed priority, regardless of the order in which sources are configured.
//! * *Declarative constraints*:
//! Required flags, dependencies between flags, and per-flag validators are checked after all sources are merged.
//! * *Detailed yet basic UX*:
//! The help and error output name the flag involved, leaving no ambiguity in how to fix the invocation.
//! However, we do not aim to support rich display configurations, such as colour output, shell completions, etc.
//!
//! # Usage
//! ```no_run
#![doc = include_str!("../demos/basic.rs")]
//! ```
//!
//! This generates the following Cli program:
//! ```console
//! $ server -h
//! A tiny server.
//!
//! Usage: server [options]
//!
//! Options:
//!   -o, --host STRING           The host to bind. (default: localhost)
//!   -p, --port INT              The port to bind. (default: 8080)
//!   -v, --verbose               Log every request.
//!       --timeout DURATION      How long to wait for a request. (default: 30s)
//!
//! $ server -v --port=3000
//! Serving localhost:3000 (verbose=true, timeout=30s).
//!
//! $ server --port three
//! Parse error: invalid int value for flag --port: three
//! ```
//!
//! # Sources
//! A flag takes its value from the highest priority source that sets it:
//! 1. The default, given at registration.
//! 2. The JSON config file, see [`FlagSet::set_config_file`], [`FlagSet::add_config_path`], and [`FlagSet::enable_config_discovery`].
//! 3. The environment, see [`FlagSet::set_env_prefix`] and [`FlagSet::enable_env_lookup`].
//! 4. The command line.
//!
//! A flag is *changed* once any of the sources (2) through (4) sets it, even if to its default value.
//! Changed flags are what satisfy [`FlagSet::set_required`] and [`FlagSet::set_dependencies`].
//!
//! ### Config File
//! The config file is a single JSON object keyed by long flag name.
//! ```json
//! { "host": "db.internal", "pool-size": 16, "tags": ["a", "b"], "timeout": "1m30s" }
//! ```
//! Keys that do not name a flag are ignored.
//! Durations are written as strings, and string lists as arrays.
//! ```no_run
#![doc = include_str!("../demos/config.rs")]
//! ```
//!
//! ### Environment
//! Flag `db-host` reads the variable `DB_HOST`, or `APP_DB_HOST` under the prefix `APP`.
//! An empty variable counts as unset.
//! ```no_run
#![doc = include_str!("../demos/env.rs")]
//! ```
//!
//! # Constraints
//! Constraints are checked after every source has been applied, in this order:
//! required flags, then dependencies, then validators.
//! The first violation fails the parse.
//! ```no_run
#![doc = include_str!("../demos/required.rs")]
//! ```
//!
//! # Cli Semantics
//! `tierflags` parses the Cli tokens according to the following set of rules.
//!
//! * `--NAME VALUE` and `--NAME=VALUE` are equivalent.
//! Only the first `=` character is used as a separator, so `--key=a=b` assigns `a=b`.
//! * The short form `-N VALUE` and `-N=VALUE` behave the same way.
//! * A long flag without `=` takes the next token as its value, unless that token starts with `--`.
//! This lets values start with a single dash, ex: `--offset -5`.
//! * A bool flag may stand alone (`--verbose` or `-v`), meaning `true`.
//! The long form still takes a following value, so `--verbose false` assigns `false` while `--verbose file.txt` is an error.
//! Use `--verbose=true` or `-v` before positional arguments.
//! Accepted bool values are `1`, `t`, `T`, `true`, `TRUE`, `True` and `0`, `f`, `F`, `false`, `FALSE`, `False`.
//! * String lists are comma separated, ex: `--tags a,b`; empty segments are dropped.
//! * Multiple short keys may be combined into a single token.
//! For example, `-vd` is equivalent to `-v -d`.
//! Every key except the last must be a bool flag; the last may take the next token as its value (`-vl 9`).
//! The `=` form is reserved for a single key, so `-vl=9` is malformed.
//! * `-h` and `--help` print the help text and stop the parse, before any constraint is checked.
//! * Every token after `--` is positional, see [`FlagSet::args`].
//! Tokens not starting with `-` are positional too, and the parse carries on past them.
//!
//! ```no_run
#![doc = include_str!("../demos/advanced_syntax.rs")]
//! ```
//!
//! # Features
//! * `unit_test`: For features that help with unit testing.
//! * `tracing_debug`: Emit `tracing` debug events while parsing.
pub use tierflags_core::*;
