use std::path::{Component, Path, PathBuf};

use thiserror::Error;

use crate::constant::*;
use crate::model::Source;
use crate::parser::ParseError;
use crate::registry::Registry;
use crate::source::Environment;

#[cfg(feature = "tracing_debug")]
use tracing::{debug, trace};

/// Why the configuration file could not be applied.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigFileError {
    /// The path contains a parent directory component, or is absolute outside the allowed directories.
    #[error("invalid config file path: {}", path.display())]
    UnsafePath {
        /// The rejected path.
        path: PathBuf,
    },

    /// The file exists but could not be read.
    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        /// The file.
        path: PathBuf,
        /// The underlying failure.
        source: std::io::Error,
    },

    /// The file is not valid JSON.
    #[error("failed to parse config file {}: {source}", path.display())]
    Decode {
        /// The file.
        path: PathBuf,
        /// The underlying failure.
        source: serde_json::Error,
    },

    /// The file is valid JSON, but the top level is not an object.
    #[error("config file {} must contain a JSON object", path.display())]
    NotAnObject {
        /// The file.
        path: PathBuf,
    },

    /// A key names a registered flag, but its value is unusable for that flag.
    #[error("failed to set flag {key} from config: {cause}")]
    Apply {
        /// The offending key (the flag name).
        key: String,
        /// The conversion or validation failure.
        #[source]
        cause: Box<ParseError>,
    },
}

/// Where to look for the configuration file, and which absolute locations may be read.
///
/// Inactive (loads nothing) until a file, a search directory, or discovery is configured.
#[derive(Debug, Default)]
pub(crate) struct ConfigSource {
    file: Option<PathBuf>,
    search_dirs: Vec<PathBuf>,
    discovery: bool,
    allowed_dirs: Vec<PathBuf>,
}

impl ConfigSource {
    pub(crate) fn set_file(&mut self, path: impl Into<PathBuf>) {
        self.file.replace(path.into());
    }

    pub(crate) fn add_search_dir(&mut self, dir: impl Into<PathBuf>) {
        self.search_dirs.push(dir.into());
    }

    pub(crate) fn enable_discovery(&mut self) {
        self.discovery = true;
    }

    pub(crate) fn allow_dir(&mut self, dir: impl Into<PathBuf>) {
        self.allowed_dirs.push(dir.into());
    }

    fn active(&self) -> bool {
        self.file.is_some() || !self.search_dirs.is_empty() || self.discovery
    }

    /// Find the file to load, if any.
    ///
    /// An explicit file wins over discovery; it is only used if it exists.
    /// Otherwise the first existing candidate, in directory order and then name order.
    pub(crate) fn locate(
        &self,
        program: &str,
        environment: &(impl Environment + ?Sized),
    ) -> Option<PathBuf> {
        if let Some(file) = &self.file {
            return if file.is_file() {
                Some(file.clone())
            } else {
                None
            };
        }

        let search_dirs = if self.search_dirs.is_empty() {
            let mut defaults: Vec<PathBuf> = CONFIG_DEFAULT_DIRS.iter().map(PathBuf::from).collect();
            defaults.extend(home(environment));
            defaults
        } else {
            self.search_dirs.clone()
        };

        let mut names: Vec<String> = CONFIG_SUFFIXES
            .iter()
            .map(|suffix| format!("{program}{suffix}"))
            .collect();
        names.push(CONFIG_SHARED_NAME.to_string());

        search_dirs
            .iter()
            .flat_map(|dir| names.iter().map(move |name| dir.join(name)))
            .find(|candidate| candidate.is_file())
    }

    /// Reject traversal, and absolute paths outside the allowed directories.
    pub(crate) fn check_path(
        &self,
        path: &Path,
        environment: &(impl Environment + ?Sized),
    ) -> Result<(), ConfigFileError> {
        let unsafe_path = || ConfigFileError::UnsafePath {
            path: path.to_path_buf(),
        };

        if path
            .components()
            .any(|component| component == Component::ParentDir)
        {
            return Err(unsafe_path());
        }

        if path.is_absolute() {
            let allowed = CONFIG_ALLOWED_DIRS
                .iter()
                .map(PathBuf::from)
                .chain(home(environment))
                .chain(self.allowed_dirs.iter().cloned())
                .any(|dir| path.starts_with(dir));

            if !allowed {
                return Err(unsafe_path());
            }
        }

        Ok(())
    }

    /// Locate, read and apply the configuration file onto the registry.
    ///
    /// A missing file is not an error.
    /// Keys are applied in the decoded object's order; keys that name no flag are ignored.
    pub(crate) fn load(
        &self,
        program: &str,
        registry: &mut Registry,
        environment: &(impl Environment + ?Sized),
    ) -> Result<(), ConfigFileError> {
        if !self.active() {
            return Ok(());
        }

        if let Some(file) = &self.file {
            self.check_path(file, environment)?;
        }

        let path = match self.locate(program, environment) {
            Some(path) => path,
            None => {
                #[cfg(feature = "tracing_debug")]
                {
                    debug!("No config file found for '{program}'.");
                }

                return Ok(());
            }
        };

        self.check_path(&path, environment)?;

        #[cfg(feature = "tracing_debug")]
        {
            debug!("Loading config file {}.", path.display());
        }

        let contents = std::fs::read_to_string(&path).map_err(|source| ConfigFileError::Read {
            path: path.clone(),
            source,
        })?;
        let decoded: serde_json::Value =
            serde_json::from_str(&contents).map_err(|source| ConfigFileError::Decode {
                path: path.clone(),
                source,
            })?;
        let object = match decoded {
            serde_json::Value::Object(object) => object,
            _ => return Err(ConfigFileError::NotAnObject { path }),
        };

        apply(&object, registry)
    }
}

pub(crate) fn apply(
    object: &serde_json::Map<String, serde_json::Value>,
    registry: &mut Registry,
) -> Result<(), ConfigFileError> {
    for (key, json) in object {
        let flag = match registry.get_mut(key) {
            Some(flag) => flag,
            None => {
                #[cfg(feature = "tracing_debug")]
                {
                    trace!("Ignoring config key '{key}'.");
                }

                continue;
            }
        };

        if flag.outranks(Source::Config) {
            #[cfg(feature = "tracing_debug")]
            {
                trace!("Config key '{key}' skipped; flag already set.");
            }

            continue;
        }

        flag.assign_json(json, Source::Config)
            .map_err(|error| ConfigFileError::Apply {
                key: key.clone(),
                cause: Box::new(ParseError::from_assign(key, error)),
            })?;

        #[cfg(feature = "tracing_debug")]
        {
            debug!("Config key '{key}' applied.");
        }
    }

    Ok(())
}

fn home(environment: &(impl Environment + ?Sized)) -> Option<PathBuf> {
    environment
        .var(HOME_VARIABLE)
        .ok()
        .filter(|home| !home.is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flag::FlagValue;
    use crate::model::{Kind, Value};
    use rstest::rstest;
    use std::collections::HashMap;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    fn registry() -> Registry {
        let mut registry = Registry::default();
        registry.insert(FlagValue::new(
            "host",
            None,
            Value::String("localhost".to_string()),
            "",
        ));
        registry.insert(FlagValue::new("port", None, Value::Int(8080), ""));
        registry.insert(FlagValue::new("verbose", None, Value::Bool(false), ""));
        registry.insert(FlagValue::new(
            "timeout",
            None,
            Value::Duration(Duration::from_secs(30)),
            "",
        ));
        registry.insert(FlagValue::new("tags", None, Value::StringList(vec![]), ""));
        registry
    }

    fn environment(home: &Path) -> HashMap<String, String> {
        HashMap::from([(
            HOME_VARIABLE.to_string(),
            home.to_string_lossy().to_string(),
        )])
    }

    // Temporary directories live under the system temp dir, which need not be /tmp.
    fn source(dir: &TempDir) -> ConfigSource {
        let mut source = ConfigSource::default();
        source.allow_dir(dir.path());
        source
    }

    #[test]
    fn load_inactive() {
        let mut registry = registry();
        let source = ConfigSource::default();

        source
            .load("server", &mut registry, &HashMap::default())
            .unwrap();

        assert!(registry.iter().all(|flag| !flag.changed()));
    }

    #[test]
    fn load_explicit() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(
            &path,
            r#"{"host": "example.com", "port": 9000, "verbose": true, "timeout": "1m", "tags": ["a", "b"], "unknown": 1}"#,
        )
        .unwrap();
        let mut source = source(&dir);
        source.set_file(&path);
        let mut registry = registry();

        source
            .load("server", &mut registry, &HashMap::default())
            .unwrap();

        assert_eq!(
            registry.get("host").unwrap().value(),
            &Value::String("example.com".to_string())
        );
        assert_eq!(registry.get("port").unwrap().value(), &Value::Int(9000));
        assert_eq!(registry.get("verbose").unwrap().value(), &Value::Bool(true));
        assert_eq!(
            registry.get("timeout").unwrap().value(),
            &Value::Duration(Duration::from_secs(60))
        );
        assert_eq!(
            registry.get("tags").unwrap().value(),
            &Value::StringList(vec!["a".to_string(), "b".to_string()])
        );
        assert!(registry
            .iter()
            .all(|flag| flag.source() == Some(Source::Config)));
    }

    #[test]
    fn load_explicit_missing() {
        let dir = TempDir::new().unwrap();
        let mut source = source(&dir);
        source.set_file(dir.path().join("absent.json"));
        let mut registry = registry();

        source
            .load("server", &mut registry, &HashMap::default())
            .unwrap();

        assert!(registry.iter().all(|flag| !flag.changed()));
    }

    #[rstest]
    #[case("server.json")]
    #[case("server.config.json")]
    #[case("config.json")]
    fn load_discovered(#[case] name: &str) {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(name), r#"{"port": 1}"#).unwrap();
        let mut source = source(&dir);
        source.add_search_dir(dir.path());
        let mut registry = registry();

        source
            .load("server", &mut registry, &HashMap::default())
            .unwrap();

        assert_eq!(registry.get("port").unwrap().value(), &Value::Int(1));
    }

    #[test]
    fn locate_order() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        fs::write(first.path().join("config.json"), "{}").unwrap();
        fs::write(first.path().join("server.config.json"), "{}").unwrap();
        fs::write(second.path().join("server.json"), "{}").unwrap();
        let mut source = ConfigSource::default();
        source.add_search_dir(first.path());
        source.add_search_dir(second.path());

        assert_eq!(
            source.locate("server", &HashMap::default()),
            Some(first.path().join("server.config.json"))
        );
    }

    #[test]
    fn locate_home() {
        let home = TempDir::new().unwrap();
        fs::write(home.path().join("tierflags-home-test.json"), "{}").unwrap();
        let mut source = ConfigSource::default();
        source.enable_discovery();

        assert_eq!(
            source.locate("tierflags-home-test", &environment(home.path())),
            Some(home.path().join("tierflags-home-test.json"))
        );
    }

    #[test]
    fn load_discovery_miss() {
        let dir = TempDir::new().unwrap();
        let mut source = source(&dir);
        source.add_search_dir(dir.path());
        let mut registry = registry();

        source
            .load("server", &mut registry, &HashMap::default())
            .unwrap();

        assert!(registry.iter().all(|flag| !flag.changed()));
    }

    #[rstest]
    #[case("../config.json")]
    #[case("config/../../config.json")]
    #[case("/var/config.json")]
    #[case("/tmpfoo/config.json")]
    #[case("/tmp/../etc/passwd")]
    fn check_path_unsafe(#[case] path: &str) {
        let source = ConfigSource::default();

        assert_matches!(
            source.check_path(Path::new(path), &HashMap::default()),
            Err(ConfigFileError::UnsafePath { .. })
        );
    }

    #[rstest]
    #[case("config.json")]
    #[case("./config/server.json")]
    #[case("/tmp/config.json")]
    #[case("/opt/app/config.json")]
    #[case("/etc/app.json")]
    #[case("/home/user/app.json")]
    #[case("/srv/app/config.json")]
    fn check_path_safe(#[case] path: &str) {
        let mut source = ConfigSource::default();
        source.allow_dir("/srv/app");

        source
            .check_path(Path::new(path), &environment(Path::new("/home/user")))
            .unwrap();
    }

    #[test]
    fn load_explicit_unsafe() {
        let mut source = ConfigSource::default();
        source.set_file("../settings.json");
        let mut registry = registry();

        let result = source.load("server", &mut registry, &HashMap::default());

        assert_matches!(result, Err(ConfigFileError::UnsafePath { .. }));
    }

    #[test]
    fn load_decode_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("server.json");
        fs::write(&path, "{ not json").unwrap();
        let mut source = source(&dir);
        source.set_file(&path);

        let result = source.load("server", &mut registry(), &HashMap::default());

        assert_matches!(result, Err(ConfigFileError::Decode { .. }));
    }

    #[test]
    fn load_not_an_object() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("server.json");
        fs::write(&path, "[1, 2]").unwrap();
        let mut source = source(&dir);
        source.set_file(&path);

        let result = source.load("server", &mut registry(), &HashMap::default());

        assert_matches!(result, Err(ConfigFileError::NotAnObject { .. }));
    }

    #[rstest]
    #[case(serde_json::json!({"port": "abc"}), "port")]
    #[case(serde_json::json!({"host": 7}), "host")]
    #[case(serde_json::json!({"verbose": "true"}), "verbose")]
    #[case(serde_json::json!({"tags": "a,b"}), "tags")]
    fn apply_mismatch(#[case] json: serde_json::Value, #[case] expected: &str) {
        let object = json.as_object().unwrap();
        let mut registry = registry();

        let result = apply(object, &mut registry);

        assert_matches!(
            result,
            Err(ConfigFileError::Apply { key, cause }) if key == expected && matches!(*cause, ParseError::InvalidValue { .. })
        );
    }

    #[test]
    fn apply_int_truncates() {
        let json = serde_json::json!({"port": 3000.9});
        let mut registry = registry();

        apply(json.as_object().unwrap(), &mut registry).unwrap();

        assert_eq!(registry.get("port").unwrap().value(), &Value::Int(3000));
        assert_eq!(registry.get("port").unwrap().kind(), Kind::Int);
    }

    #[test]
    fn apply_skips_higher_sources() {
        let json = serde_json::json!({"port": 1, "host": "config"});
        let mut registry = registry();
        registry
            .get_mut("port")
            .unwrap()
            .assign_str("2", Source::CommandLine)
            .unwrap();
        registry
            .get_mut("host")
            .unwrap()
            .assign_str("env", Source::Environment)
            .unwrap();

        apply(json.as_object().unwrap(), &mut registry).unwrap();

        assert_eq!(registry.get("port").unwrap().value(), &Value::Int(2));
        assert_eq!(
            registry.get("host").unwrap().value(),
            &Value::String("env".to_string())
        );
    }

    #[test]
    fn apply_validator() {
        let json = serde_json::json!({"port": 80});
        let mut registry = registry();
        registry
            .get_mut("port")
            .unwrap()
            .set_validator(Box::new(|_| Err("nope".to_string())));

        let result = apply(json.as_object().unwrap(), &mut registry);

        assert_matches!(
            result,
            Err(ConfigFileError::Apply { cause, .. }) if matches!(*cause, ParseError::Validation { .. })
        );
        assert!(!registry.get("port").unwrap().changed());
    }
}
