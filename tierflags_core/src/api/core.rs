use std::path::PathBuf;
use std::time::Duration;

use crate::api::{FlagType, Handle};
use crate::flag::FlagValue;
use crate::model::Value;
use crate::parser::{About, ConfigError, ConsoleInterface, ParseError, Pipeline, Printer, UserInterface};
use crate::registry::Registry;
use crate::source::{ConfigSource, EnvSource, Environment, ProcessEnvironment};
use crate::validate::validate_all;

/// The flags of one program, and the sources they are resolved from.
///
/// Register flags, optionally configure the config file and environment sources, then [`FlagSet::parse`].
/// Values resolve in ascending priority: default, config file, environment, command line.
///
/// ### Example
/// ```
/// # use tierflags_core as tierflags;
/// use std::collections::HashMap;
/// use tierflags::FlagSet;
///
/// let environment = HashMap::from([("APP_HOST".to_string(), "example.com".to_string())]);
/// let mut flags = FlagSet::new("server").with_environment(environment);
/// let host = flags.string("host", "localhost", "Server host");
/// let port = flags.int_var("port", 'p', 8080, "Server port");
/// flags.set_env_prefix("APP");
///
/// flags.parse(&["-p", "3000", "extra"]).unwrap();
///
/// assert_eq!(flags.get(&host), "example.com");
/// assert_eq!(flags.get(&port), 3000);
/// assert_eq!(flags.args(), &["extra".to_string()]);
/// ```
pub struct FlagSet {
    about: About,
    registry: Registry,
    positionals: Vec<String>,
    config: ConfigSource,
    env: EnvSource,
    environment: Box<dyn Environment>,
    user_interface: Box<dyn UserInterface>,
}

impl std::fmt::Debug for FlagSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlagSet")
            .field("about", &self.about)
            .field("registry", &self.registry)
            .field("positionals", &self.positionals)
            .field("config", &self.config)
            .field("env", &self.env)
            .finish_non_exhaustive()
    }
}

impl FlagSet {
    /// Create an empty flag set.
    /// The `program` name appears in the help text and drives config file discovery.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            about: About {
                program: program.into(),
                ..About::default()
            },
            registry: Registry::default(),
            positionals: Vec::default(),
            config: ConfigSource::default(),
            env: EnvSource::default(),
            environment: Box::new(ProcessEnvironment),
            user_interface: Box::new(ConsoleInterface::default()),
        }
    }

    /// Replace the process environment with another lookup.
    ///
    /// The lookup serves both environment variables and the `HOME` directory.
    pub fn with_environment(mut self, environment: impl Environment + 'static) -> Self {
        self.environment = Box::new(environment);
        self
    }

    /// Send the help text somewhere other than standard out.
    pub fn with_interface(mut self, user_interface: Box<dyn UserInterface>) -> Self {
        self.user_interface = user_interface;
        self
    }

    /// Document the program in the help text.
    /// If repeated, only the final description applies.
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.about.description.replace(description.into());
    }

    /// Show a version line in the help text.
    pub fn set_version(&mut self, version: impl Into<String>) {
        self.about.version.replace(version.into());
    }

    /// Load this configuration file on every [`FlagSet::parse`].
    ///
    /// A missing file is skipped; an unreadable, malformed, or unsafe one fails the parse.
    /// Takes precedence over the search directories.
    pub fn set_config_file(&mut self, path: impl Into<PathBuf>) {
        self.config.set_file(path);
    }

    /// Search `dir` for `<program>.json`, `<program>.config.json`, then `config.json`.
    /// Directories are searched in the order they were added; the first existing file wins.
    pub fn add_config_path(&mut self, dir: impl Into<PathBuf>) {
        self.config.add_search_dir(dir);
    }

    /// Search the default directories (`.`, `./config`, then `$HOME`) when no search directory was added.
    pub fn enable_config_discovery(&mut self) {
        self.config.enable_discovery();
    }

    /// Allow the configuration file to be read from under the absolute directory `dir`.
    ///
    /// Relative paths are always allowed (unless they contain `..`).
    /// Absolute paths are allowed under `/tmp`, `/opt`, `/etc`, `$HOME`, and any directory added here.
    pub fn allow_config_dir(&mut self, dir: impl Into<PathBuf>) {
        self.config.allow_dir(dir);
    }

    /// Read flags from `<PREFIX>_<NAME>` environment variables.
    /// An empty prefix reads plain `<NAME>` variables.
    pub fn set_env_prefix(&mut self, prefix: impl Into<String>) {
        self.env.set_prefix(prefix);
    }

    /// Read flags from `<NAME>` environment variables, ex: `db-host` from `DB_HOST`.
    pub fn enable_env_lookup(&mut self) {
        self.env.enable();
    }

    /// Read flag `name` from the environment variable `variable`, regardless of the prefix.
    /// Environment lookup must still be enabled.
    pub fn set_env_var(
        &mut self,
        name: &str,
        variable: impl Into<String>,
    ) -> Result<(), ConfigError> {
        self.flag_mut(name)?.set_env_var(variable);
        Ok(())
    }

    /// Register a flag holding the type `T`.
    ///
    /// Registering a name again replaces the earlier flag (and its metadata); the earlier handle then reads the new flag.
    /// Likewise, a `short_key` registered again moves to the newer flag.
    ///
    /// ### Example
    /// ```
    /// # use tierflags_core as tierflags;
    /// use std::time::Duration;
    /// use tierflags::FlagSet;
    ///
    /// let mut flags = FlagSet::new("program");
    /// let timeout = flags.register("timeout", Some('t'), Duration::from_secs(30), "Request timeout");
    ///
    /// flags.parse(&["-t", "1m30s"]).unwrap();
    /// assert_eq!(flags.get(&timeout), Duration::from_secs(90));
    /// ```
    pub fn register<T: FlagType>(
        &mut self,
        name: impl Into<String>,
        short_key: Option<char>,
        default: T,
        usage: impl Into<String>,
    ) -> Handle<T> {
        let name = name.into();
        self.registry.insert(FlagValue::new(
            name.clone(),
            short_key,
            default.into_value(),
            usage,
        ));
        Handle::new(name)
    }

    /// Register a string flag.
    pub fn string(
        &mut self,
        name: impl Into<String>,
        default: impl Into<String>,
        usage: impl Into<String>,
    ) -> Handle<String> {
        self.register(name, None, default.into(), usage)
    }

    /// Register a string flag with a short key.
    pub fn string_var(
        &mut self,
        name: impl Into<String>,
        short_key: char,
        default: impl Into<String>,
        usage: impl Into<String>,
    ) -> Handle<String> {
        self.register(name, Some(short_key), default.into(), usage)
    }

    /// Register an int flag.
    pub fn int(
        &mut self,
        name: impl Into<String>,
        default: i64,
        usage: impl Into<String>,
    ) -> Handle<i64> {
        self.register(name, None, default, usage)
    }

    /// Register an int flag with a short key.
    pub fn int_var(
        &mut self,
        name: impl Into<String>,
        short_key: char,
        default: i64,
        usage: impl Into<String>,
    ) -> Handle<i64> {
        self.register(name, Some(short_key), default, usage)
    }

    /// Register a bool flag.
    /// On the command line, `--name` alone sets it to `true`.
    pub fn bool(
        &mut self,
        name: impl Into<String>,
        default: bool,
        usage: impl Into<String>,
    ) -> Handle<bool> {
        self.register(name, None, default, usage)
    }

    /// Register a bool flag with a short key.
    /// Bool short keys may be combined, ex: `-vd`.
    pub fn bool_var(
        &mut self,
        name: impl Into<String>,
        short_key: char,
        default: bool,
        usage: impl Into<String>,
    ) -> Handle<bool> {
        self.register(name, Some(short_key), default, usage)
    }

    /// Register a float64 flag.
    pub fn float64(
        &mut self,
        name: impl Into<String>,
        default: f64,
        usage: impl Into<String>,
    ) -> Handle<f64> {
        self.register(name, None, default, usage)
    }

    /// Register a float64 flag with a short key.
    pub fn float64_var(
        &mut self,
        name: impl Into<String>,
        short_key: char,
        default: f64,
        usage: impl Into<String>,
    ) -> Handle<f64> {
        self.register(name, Some(short_key), default, usage)
    }

    /// Register a duration flag, written like `300ms` or `1h30m`.
    pub fn duration(
        &mut self,
        name: impl Into<String>,
        default: Duration,
        usage: impl Into<String>,
    ) -> Handle<Duration> {
        self.register(name, None, default, usage)
    }

    /// Register a duration flag with a short key.
    pub fn duration_var(
        &mut self,
        name: impl Into<String>,
        short_key: char,
        default: Duration,
        usage: impl Into<String>,
    ) -> Handle<Duration> {
        self.register(name, Some(short_key), default, usage)
    }

    /// Register a string list flag, written comma separated (ex: `a,b,c`).
    pub fn string_list(
        &mut self,
        name: impl Into<String>,
        default: Vec<String>,
        usage: impl Into<String>,
    ) -> Handle<Vec<String>> {
        self.register(name, None, default, usage)
    }

    /// Register a string list flag with a short key.
    pub fn string_list_var(
        &mut self,
        name: impl Into<String>,
        short_key: char,
        default: Vec<String>,
        usage: impl Into<String>,
    ) -> Handle<Vec<String>> {
        self.register(name, Some(short_key), default, usage)
    }

    /// The current value behind `handle`.
    ///
    /// Falls back to `T::default()` only if the flag was since re-registered with another type.
    pub fn get<T: FlagType>(&self, handle: &Handle<T>) -> T {
        self.try_get(handle).unwrap_or_default()
    }

    /// The current value behind `handle`, or `None` if the flag no longer holds a `T`.
    pub fn try_get<T: FlagType>(&self, handle: &Handle<T>) -> Option<T> {
        self.typed(handle.name())
    }

    fn typed<T: FlagType>(&self, name: &str) -> Option<T> {
        self.registry
            .get(name)
            .and_then(|flag| T::from_value(flag.value()))
            .cloned()
    }

    /// The current value of the string flag `name`.
    pub fn get_string(&self, name: &str) -> Option<String> {
        self.typed(name)
    }

    /// The current value of the int flag `name`.
    pub fn get_int(&self, name: &str) -> Option<i64> {
        self.typed(name)
    }

    /// The current value of the bool flag `name`.
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.typed(name)
    }

    /// The current value of the float64 flag `name`.
    pub fn get_float64(&self, name: &str) -> Option<f64> {
        self.typed(name)
    }

    /// The current value of the duration flag `name`.
    pub fn get_duration(&self, name: &str) -> Option<Duration> {
        self.typed(name)
    }

    /// The current value of the string list flag `name`.
    pub fn get_string_list(&self, name: &str) -> Option<Vec<String>> {
        self.typed(name)
    }

    /// The flag registered as `name`.
    pub fn lookup(&self, name: &str) -> Option<&FlagValue> {
        self.registry.get(name)
    }

    /// Whether any source assigned the flag `name`.
    /// Unknown names are never changed.
    pub fn changed(&self, name: &str) -> bool {
        self.registry
            .get(name)
            .map(FlagValue::changed)
            .unwrap_or(false)
    }

    /// Visit every flag, in registration order.
    pub fn visit_all(&self, mut visitor: impl FnMut(&FlagValue)) {
        for flag in self.registry.iter() {
            visitor(flag);
        }
    }

    /// The number of registered flags.
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// Whether no flag is registered.
    pub fn is_empty(&self) -> bool {
        self.registry.len() == 0
    }

    /// The positional arguments of the last successful parse, in order.
    pub fn args(&self) -> &[String] {
        &self.positionals
    }

    /// The number of positional arguments.
    pub fn narg(&self) -> usize {
        self.positionals.len()
    }

    /// The `i`th positional argument.
    pub fn arg(&self, i: usize) -> Option<&str> {
        self.positionals.get(i).map(String::as_str)
    }

    /// Check every value assigned to flag `name`.
    ///
    /// The validator runs on each assignment (from any source) before the value is kept, and once more over the final value after all sources.
    /// The returned message is reported alongside the flag name.
    ///
    /// ### Example
    /// ```
    /// # use tierflags_core as tierflags;
    /// use tierflags::{FlagSet, Value};
    ///
    /// let mut flags = FlagSet::new("program");
    /// flags.int("port", 8080, "Server port");
    /// flags.set_validator("port", |value| match value {
    ///     Value::Int(port) if *port > 65_535 => Err(format!("{port} is out of range")),
    ///     _ => Ok(()),
    /// }).unwrap();
    ///
    /// let error = flags.parse(&["--port", "70000"]).unwrap_err();
    /// assert_eq!(error.to_string(), "validation failed for flag --port: 70000 is out of range");
    /// ```
    pub fn set_validator(
        &mut self,
        name: &str,
        validator: impl Fn(&Value) -> Result<(), String> + Send + Sync + 'static,
    ) -> Result<(), ConfigError> {
        self.flag_mut(name)?.set_validator(Box::new(validator));
        Ok(())
    }

    /// Like [`FlagSet::set_validator`], but the validator receives the typed value.
    pub fn validate_with<T: FlagType>(
        &mut self,
        handle: &Handle<T>,
        validator: impl Fn(&T) -> Result<(), String> + Send + Sync + 'static,
    ) -> Result<(), ConfigError> {
        let flag = self.flag_mut(handle.name())?;

        if flag.kind() != T::KIND {
            return Err(ConfigError(format!(
                "flag --{} holds {}, not {}",
                handle.name(),
                flag.kind(),
                T::KIND
            )));
        }

        flag.set_validator(Box::new(move |value: &Value| match T::from_value(value) {
            Some(typed) => validator(typed),
            None => Err(format!("expected a {} value", T::KIND)),
        }));
        Ok(())
    }

    /// Fail the parse unless some source sets flag `name`.
    pub fn set_required(&mut self, name: &str) -> Result<(), ConfigError> {
        self.flag_mut(name)?.set_required(true);
        Ok(())
    }

    /// Whenever flag `name` is set, each of `dependencies` must be set too.
    /// Replaces any earlier dependencies; the names are only resolved during validation.
    pub fn set_dependencies<I, S>(&mut self, name: &str, dependencies: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let dependencies = dependencies.into_iter().map(Into::into).collect();
        self.flag_mut(name)?.set_dependencies(dependencies);
        Ok(())
    }

    /// List flag `name` under its own `group` heading in the help text.
    pub fn set_group(&mut self, name: &str, group: impl Into<String>) -> Result<(), ConfigError> {
        self.flag_mut(name)?.set_group(group);
        Ok(())
    }

    /// Replace the help text of flag `name`.
    pub fn set_usage(&mut self, name: &str, usage: impl Into<String>) -> Result<(), ConfigError> {
        self.flag_mut(name)?.set_usage(usage);
        Ok(())
    }

    fn flag_mut(&mut self, name: &str) -> Result<&mut FlagValue, ConfigError> {
        self.registry
            .get_mut(name)
            .ok_or_else(|| ConfigError(format!("flag --{name} not found")))
    }

    /// Return every flag to its default, unset.
    /// The positional arguments are cleared too.
    pub fn reset(&mut self) {
        self.registry.reset();
        self.positionals.clear();
    }

    /// Return flag `name` to its default, unset.
    pub fn reset_flag(&mut self, name: &str) -> Result<(), ConfigError> {
        self.flag_mut(name)?.reset();
        Ok(())
    }

    /// Check the required, dependency and validator constraints against the current values.
    /// [`FlagSet::parse`] already does this after merging the sources.
    pub fn validate_all_constraints(&self) -> Result<(), ParseError> {
        validate_all(&self.registry)
    }

    /// Render the help text.
    pub fn help(&self) -> String {
        Printer::terminal().render(&self.about, &self.registry)
    }

    /// Print the help text to the interface (standard out, by default).
    pub fn print_help(&self) {
        Printer::terminal().print_help(&self.about, &self.registry, &*self.user_interface);
    }

    /// Resolve every flag from the sources, then the `args` (which exclude the program name).
    ///
    /// Parsing happens in stages, and the first failure stops it:
    /// 1. The config file, if configured.
    /// 2. The environment, if enabled.  Overrides the config file.
    /// 3. The `args`, left to right.  Overrides everything.
    /// 4. The constraints: required flags, then dependencies, then validators.
    ///
    /// If `--help` or `-h` is encountered, the help text is printed and [`ParseError::HelpRequested`] is returned, without checking constraints.
    /// Assignments made before a failure are kept.
    pub fn parse<S: AsRef<str>>(&mut self, args: &[S]) -> Result<(), ParseError> {
        let tokens: Vec<&str> = args.iter().map(AsRef::as_ref).collect();
        self.positionals.clear();

        let pipeline = Pipeline {
            about: &self.about,
            config: &self.config,
            env: &self.env,
            environment: &*self.environment,
            user_interface: &*self.user_interface,
        };
        self.positionals = pipeline.run(&mut self.registry, tokens.as_slice())?;
        Ok(())
    }

    /// Run [`FlagSet::parse`] against the Cli [`std::env::args`].
    pub fn parse_args(&mut self) -> Result<(), ParseError> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        self.parse(args.as_slice())
    }
}
