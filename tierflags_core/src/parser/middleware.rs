use crate::parser::base::*;
use crate::parser::interface::UserInterface;
use crate::parser::printer::{About, Printer};
use crate::registry::Registry;
use crate::source::{ConfigSource, EnvSource, Environment};
use crate::validate::validate_all;

#[cfg(feature = "tracing_debug")]
use tracing::debug;

/// One run of the merge-and-validate pipeline over a registry.
///
/// Sources apply in ascending priority: config file, then environment, then the command line.
/// Constraints are only checked once every source has been applied.
pub(crate) struct Pipeline<'a> {
    pub(crate) about: &'a About,
    pub(crate) config: &'a ConfigSource,
    pub(crate) env: &'a EnvSource,
    pub(crate) environment: &'a dyn Environment,
    pub(crate) user_interface: &'a dyn UserInterface,
}

impl<'a> Pipeline<'a> {
    /// Run every stage, returning the positional arguments.
    ///
    /// On `--help` the help text is printed and [`ParseError::HelpRequested`] is returned, before any constraint is checked.
    pub(crate) fn run(
        self,
        registry: &mut Registry,
        tokens: &[&str],
    ) -> Result<Vec<String>, ParseError> {
        let Pipeline {
            about,
            config,
            env,
            environment,
            user_interface,
        } = self;

        #[cfg(feature = "tracing_debug")]
        {
            debug!("Parsing {} tokens for '{}'.", tokens.len(), about.program);
        }

        config.load(&about.program, registry, environment)?;
        env.load(registry, environment)?;

        match Parser::new(registry).consume(tokens) {
            Ok(positionals) => {
                validate_all(registry)?;
                Ok(positionals)
            }
            Err(ParseError::HelpRequested) => {
                Printer::terminal().print_help(about, registry, user_interface);
                Err(ParseError::HelpRequested)
            }
            Err(error) => Err(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flag::FlagValue;
    use crate::model::{Source, Value};
    use crate::parser::util::InMemoryInterface;
    use crate::source::ConfigFileError;
    use crate::test::assert_contains;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::TempDir;

    struct Fixture {
        about: About,
        config: ConfigSource,
        env: EnvSource,
        environment: HashMap<String, String>,
        interface: InMemoryInterface,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                about: About {
                    program: "server".to_string(),
                    ..About::default()
                },
                config: ConfigSource::default(),
                env: EnvSource::default(),
                environment: HashMap::default(),
                interface: InMemoryInterface::default(),
            }
        }

        fn run(&self, registry: &mut Registry, tokens: &[&str]) -> Result<Vec<String>, ParseError> {
            Pipeline {
                about: &self.about,
                config: &self.config,
                env: &self.env,
                environment: &self.environment,
                user_interface: &self.interface,
            }
            .run(registry, tokens)
        }
    }

    fn registry() -> Registry {
        let mut registry = Registry::default();
        registry.insert(FlagValue::new(
            "host",
            Some('o'),
            Value::String("localhost".to_string()),
            "Server host",
        ));
        registry.insert(FlagValue::new("port", Some('p'), Value::Int(8080), "Server port"));
        registry
    }

    fn value<'a>(registry: &'a Registry, name: &str) -> &'a Value {
        registry.get(name).unwrap().value()
    }

    #[test]
    fn run_empty() {
        // Setup
        let fixture = Fixture::new();
        let mut registry = registry();

        // Execute
        let positionals = fixture.run(&mut registry, &[] as &[&str]).unwrap();

        // Verify
        assert!(positionals.is_empty());
        assert_eq!(value(&registry, "port"), &Value::Int(8080));
        assert_eq!(fixture.interface.consume(), None);
    }

    #[test]
    fn run_source_priority() {
        // Setup
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("server.json");
        fs::write(&path, r#"{"host": "config-host", "port": 1000}"#).unwrap();
        let mut fixture = Fixture::new();
        fixture.config.allow_dir(dir.path());
        fixture.config.set_file(&path);
        fixture.env.set_prefix("APP");
        fixture
            .environment
            .insert("APP_PORT".to_string(), "2000".to_string());
        let mut registry = registry();

        // Execute
        fixture.run(&mut registry, &["--port", "3000"]).unwrap();

        // Verify
        assert_eq!(
            value(&registry, "host"),
            &Value::String("config-host".to_string())
        );
        assert_eq!(registry.get("host").unwrap().source(), Some(Source::Config));
        assert_eq!(value(&registry, "port"), &Value::Int(3000));
        assert_eq!(
            registry.get("port").unwrap().source(),
            Some(Source::CommandLine)
        );
    }

    #[test]
    fn run_env_over_config() {
        // Setup
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("server.json");
        fs::write(&path, r#"{"port": 1000}"#).unwrap();
        let mut fixture = Fixture::new();
        fixture.config.allow_dir(dir.path());
        fixture.config.set_file(&path);
        fixture.env.enable();
        fixture
            .environment
            .insert("PORT".to_string(), "2000".to_string());
        let mut registry = registry();

        // Execute
        fixture.run(&mut registry, &[] as &[&str]).unwrap();

        // Verify
        assert_eq!(value(&registry, "port"), &Value::Int(2000));
        assert_eq!(
            registry.get("port").unwrap().source(),
            Some(Source::Environment)
        );
    }

    #[test]
    fn run_help() {
        // Setup
        let fixture = Fixture::new();
        let mut registry = registry();
        registry.get_mut("port").unwrap().set_required(true);

        // Execute
        let result = fixture.run(&mut registry, &["--help"]);

        // Verify
        assert_matches!(result, Err(ParseError::HelpRequested));
        let message = fixture.interface.consume_message();
        assert_contains!(message, "Usage: server [options]");
        assert_contains!(message, "--port INT");
    }

    #[test]
    fn run_validation() {
        // Setup
        let fixture = Fixture::new();
        let mut registry = registry();
        registry.get_mut("port").unwrap().set_required(true);

        // Execute
        let result = fixture.run(&mut registry, &["--host", "example.com"]);

        // Verify
        assert_matches!(result, Err(ParseError::RequiredMissing { flag }) if flag == "port");
        assert_eq!(fixture.interface.consume(), None);
    }

    #[test]
    fn run_config_error() {
        // Setup
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("server.json");
        fs::write(&path, "not json").unwrap();
        let mut fixture = Fixture::new();
        fixture.config.allow_dir(dir.path());
        fixture.config.set_file(&path);
        let mut registry = registry();

        // Execute
        let error = fixture.run(&mut registry, &["--port", "1"]).unwrap_err();

        // Verify
        assert_matches!(&error, ParseError::Config(ConfigFileError::Decode { .. }));
        assert_contains!(error.to_string(), "config file error: failed to parse config file");
        // Nothing from the command line was applied.
        assert_eq!(value(&registry, "port"), &Value::Int(8080));
    }

    #[test]
    fn run_env_error() {
        // Setup
        let mut fixture = Fixture::new();
        fixture.env.enable();
        fixture
            .environment
            .insert("PORT".to_string(), "eighty".to_string());
        let mut registry = registry();

        // Execute
        let result = fixture.run(&mut registry, &[] as &[&str]);

        // Verify
        assert_matches!(result, Err(ParseError::Environment { variable, .. }) if variable == "PORT");
    }
}
