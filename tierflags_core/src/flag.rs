use crate::convert::{self, ConversionError};
use crate::model::{Kind, Source, Value};

/// A user supplied check run against a flag's value.
///
/// Returns a human readable message on failure; the flag name is attached by the parser.
pub type Validator = Box<dyn Fn(&Value) -> Result<(), String> + Send + Sync>;

/// One declared flag: its current value, default, metadata, and where its value came from.
pub struct FlagValue {
    name: String,
    short_key: Option<char>,
    kind: Kind,
    value: Value,
    default_value: Value,
    source: Option<Source>,
    usage: String,
    validator: Option<Validator>,
    required: bool,
    dependencies: Vec<String>,
    group: Option<String>,
    env_var: Option<String>,
}

impl std::fmt::Debug for FlagValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlagValue")
            .field("name", &self.name)
            .field("short_key", &self.short_key)
            .field("kind", &self.kind)
            .field("value", &self.value)
            .field("source", &self.source)
            .field("required", &self.required)
            .field("dependencies", &self.dependencies)
            .finish_non_exhaustive()
    }
}

/// Why an assignment was refused.
/// In both cases the flag is left untouched.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum AssignError {
    Conversion(ConversionError),
    Validation(String),
}

impl FlagValue {
    pub(crate) fn new(
        name: impl Into<String>,
        short_key: Option<char>,
        default_value: Value,
        usage: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            short_key,
            kind: default_value.kind(),
            value: default_value.clone(),
            default_value,
            source: None,
            usage: usage.into(),
            validator: None,
            required: false,
            dependencies: Vec::default(),
            group: None,
            env_var: None,
        }
    }

    /// The long name, used as `--name`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The short key, used as `-k`.
    pub fn short_key(&self) -> Option<char> {
        self.short_key
    }

    /// The kind, fixed at registration.
    pub fn kind(&self) -> Kind {
        self.kind
    }

    /// The current value.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// The value given at registration.
    pub fn default_value(&self) -> &Value {
        &self.default_value
    }

    /// Whether any source (config, environment, command line) has assigned this flag.
    pub fn changed(&self) -> bool {
        self.source.is_some()
    }

    /// The source of the current value, or `None` if the flag still holds its default.
    pub fn source(&self) -> Option<Source> {
        self.source
    }

    /// The help text given at registration.
    pub fn usage(&self) -> &str {
        &self.usage
    }

    /// Whether parsing fails when no source sets this flag.
    pub fn required(&self) -> bool {
        self.required
    }

    /// Flags which must also be set whenever this flag is set.
    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    /// The help section this flag is listed under.
    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    /// The explicit environment variable name, if one overrides the derived name.
    pub fn env_var(&self) -> Option<&str> {
        self.env_var.as_deref()
    }

    /// Run the validator (if any) against the current value.
    pub fn validate(&self) -> Result<(), String> {
        match &self.validator {
            Some(validator) => validator(&self.value),
            None => Ok(()),
        }
    }

    pub(crate) fn has_validator(&self) -> bool {
        self.validator.is_some()
    }

    pub(crate) fn set_validator(&mut self, validator: Validator) {
        self.validator.replace(validator);
    }

    pub(crate) fn set_required(&mut self, required: bool) {
        self.required = required;
    }

    pub(crate) fn set_dependencies(&mut self, dependencies: Vec<String>) {
        self.dependencies = dependencies;
    }

    pub(crate) fn set_group(&mut self, group: impl Into<String>) {
        self.group.replace(group.into());
    }

    pub(crate) fn set_usage(&mut self, usage: impl Into<String>) {
        self.usage = usage.into();
    }

    pub(crate) fn set_env_var(&mut self, env_var: impl Into<String>) {
        self.env_var.replace(env_var.into());
    }

    pub(crate) fn clear_short_key(&mut self) {
        self.short_key = None;
    }

    /// Whether a value from `incoming` must leave this flag alone.
    /// The command line always wins; the other sources only fill flags set by a lower source (or not at all).
    pub(crate) fn outranks(&self, incoming: Source) -> bool {
        match (self.source, incoming) {
            (_, Source::CommandLine) => false,
            (Some(current), incoming) => current >= incoming,
            (None, _) => false,
        }
    }

    /// Convert `raw` to this flag's kind and assign it.
    pub(crate) fn assign_str(&mut self, raw: &str, source: Source) -> Result<(), AssignError> {
        let value = convert::from_str(self.kind, raw).map_err(AssignError::Conversion)?;
        self.assign(value, source)
    }

    /// Convert a decoded JSON value to this flag's kind and assign it.
    pub(crate) fn assign_json(
        &mut self,
        json: &serde_json::Value,
        source: Source,
    ) -> Result<(), AssignError> {
        let value = convert::from_json(self.kind, json).map_err(AssignError::Conversion)?;
        self.assign(value, source)
    }

    /// Assign an already typed value.
    /// The validator sees the candidate first, so a rejected value never becomes current.
    pub(crate) fn assign(&mut self, value: Value, source: Source) -> Result<(), AssignError> {
        debug_assert_eq!(value.kind(), self.kind);

        if let Some(validator) = &self.validator {
            validator(&value).map_err(AssignError::Validation)?;
        }

        self.value = value;
        self.source.replace(source);
        Ok(())
    }

    pub(crate) fn reset(&mut self) {
        self.value = self.default_value.clone();
        self.source = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn port() -> FlagValue {
        FlagValue::new("port", Some('p'), Value::Int(8080), "Server port")
    }

    #[test]
    fn flag_new() {
        let flag = port();
        assert_eq!(flag.name(), "port");
        assert_eq!(flag.short_key(), Some('p'));
        assert_eq!(flag.kind(), Kind::Int);
        assert_eq!(flag.value(), &Value::Int(8080));
        assert_eq!(flag.default_value(), &Value::Int(8080));
        assert_eq!(flag.usage(), "Server port");
        assert!(!flag.changed());
        assert_eq!(flag.source(), None);
    }

    #[test]
    fn flag_assign_str() {
        let mut flag = port();
        flag.assign_str("3000", Source::CommandLine).unwrap();
        assert_eq!(flag.value(), &Value::Int(3000));
        assert_eq!(flag.source(), Some(Source::CommandLine));
        assert!(flag.changed());
    }

    #[test]
    fn flag_assign_invalid() {
        let mut flag = port();
        let result = flag.assign_str("abc", Source::CommandLine);
        assert_matches!(result, Err(AssignError::Conversion(_)));
        // No partial writes.
        assert_eq!(flag.value(), &Value::Int(8080));
        assert!(!flag.changed());
    }

    #[test]
    fn flag_assign_rejected() {
        let mut flag = port();
        flag.set_validator(Box::new(|value| match value {
            Value::Int(port) if *port < 1024 => Err(format!("port {port} is privileged")),
            _ => Ok(()),
        }));

        let result = flag.assign_str("80", Source::Environment);
        assert_eq!(
            result,
            Err(AssignError::Validation("port 80 is privileged".to_string()))
        );
        assert_eq!(flag.value(), &Value::Int(8080));
        assert!(!flag.changed());

        flag.assign_str("8443", Source::Environment).unwrap();
        assert_eq!(flag.value(), &Value::Int(8443));
        assert_eq!(flag.validate(), Ok(()));
    }

    #[test]
    fn flag_assign_json() {
        let mut flag = port();
        flag.assign_json(&serde_json::json!(9000), Source::Config)
            .unwrap();
        assert_eq!(flag.value(), &Value::Int(9000));
        assert_eq!(flag.source(), Some(Source::Config));
    }

    #[test]
    fn flag_reset() {
        let mut flag = port();
        flag.assign_str("1", Source::CommandLine).unwrap();
        flag.reset();
        assert_eq!(flag.value(), &Value::Int(8080));
        assert!(!flag.changed());

        // Idempotent.
        flag.reset();
        assert_eq!(flag.value(), &Value::Int(8080));
        assert!(!flag.changed());
    }

    #[rstest]
    #[case(None, Source::Config, false)]
    #[case(None, Source::Environment, false)]
    #[case(Some(Source::Config), Source::Config, true)]
    #[case(Some(Source::Config), Source::Environment, false)]
    #[case(Some(Source::Environment), Source::Config, true)]
    #[case(Some(Source::Environment), Source::Environment, true)]
    #[case(Some(Source::CommandLine), Source::Environment, true)]
    #[case(Some(Source::CommandLine), Source::CommandLine, false)]
    #[case(Some(Source::Environment), Source::CommandLine, false)]
    fn flag_outranks(
        #[case] current: Option<Source>,
        #[case] incoming: Source,
        #[case] expected: bool,
    ) {
        let mut flag = port();
        if let Some(source) = current {
            flag.assign_str("1", source).unwrap();
        }
        assert_eq!(flag.outranks(incoming), expected);
    }
}
