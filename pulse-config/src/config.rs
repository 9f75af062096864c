use std::error::Error;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use pulse_log::{Level, LogConfig};
use pulse_metrics::MetricsPublisherConfig;
use pulse_publisher::KafkaConfigParam;
use serde::{Deserialize, Serialize};

/// Name of the configuration file inside a configuration folder.
pub const CONFIG_FILE_NAME: &str = "config.yml";

/// Defines the source of a config error.
#[derive(Debug, Default)]
enum ConfigErrorSource {
    /// An error occurring independently.
    #[default]
    None,
    /// An error originating from a configuration file.
    File(PathBuf),
    /// An error originating in a field override or a single config value.
    Field(String),
}

/// Indicates config related errors.
#[derive(Debug)]
pub struct ConfigError {
    origin: ConfigErrorSource,
    kind: ConfigErrorKind,
    cause: Option<Box<dyn Error + Send + Sync>>,
}

impl ConfigError {
    fn new(kind: ConfigErrorKind) -> Self {
        Self {
            origin: ConfigErrorSource::None,
            kind,
            cause: None,
        }
    }

    fn wrap<E>(cause: E, kind: ConfigErrorKind) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self {
            cause: Some(Box::new(cause)),
            ..Self::new(kind)
        }
    }

    fn for_field<E>(cause: E, field: &str) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self::wrap(cause, ConfigErrorKind::InvalidValue).field(field)
    }

    fn file(mut self, path: impl AsRef<Path>) -> Self {
        self.origin = ConfigErrorSource::File(path.as_ref().to_path_buf());
        self
    }

    fn field(mut self, name: &str) -> Self {
        self.origin = ConfigErrorSource::Field(name.to_owned());
        self
    }

    /// Returns the error kind of the error.
    pub fn kind(&self) -> ConfigErrorKind {
        self.kind
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.origin {
            ConfigErrorSource::None => self.kind.fmt(f),
            ConfigErrorSource::File(path) => write!(f, "{} (file {})", self.kind, path.display()),
            ConfigErrorSource::Field(name) => write!(f, "{} (field {name})", self.kind),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.cause.as_deref().map(|cause| cause as &(dyn Error + 'static))
    }
}

/// Indicates config related errors.
#[derive(thiserror::Error, Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ConfigErrorKind {
    /// Failed to open the file.
    #[error("could not open config file")]
    CouldNotOpenFile,
    /// Parsing YAML failed.
    #[error("could not parse yaml config file")]
    BadYaml,
    /// Parsing JSON failed.
    #[error("could not parse json config")]
    BadJson,
    /// The configuration could not be rendered.
    #[error("could not serialize config")]
    CouldNotSerialize,
    /// Invalid config value.
    #[error("invalid config value")]
    InvalidValue,
}

/// Configuration values that can be overridden on the command line.
#[derive(Debug, Default)]
pub struct OverridableConfig {
    /// The topic to publish metric events to.
    pub topic: Option<String>,
    /// The log level.
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
struct ConfigValues {
    logging: LogConfig,
    metrics: MetricsPublisherConfig,
    kafka: Vec<KafkaConfigParam>,
}

/// Config struct.
pub struct Config {
    values: ConfigValues,
    path: PathBuf,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("path", &self.path)
            .field("values", &self.values)
            .finish()
    }
}

impl Config {
    /// Loads a config from a config folder or an explicit config file.
    ///
    /// If `path` is a directory, the configuration is read from [`CONFIG_FILE_NAME`] inside it.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = std::env::current_dir()
            .map(|dir| dir.join(path.as_ref()))
            .unwrap_or_else(|_| path.as_ref().to_path_buf());

        let file = if path.is_dir() {
            path.join(CONFIG_FILE_NAME)
        } else {
            path
        };

        let contents = fs::read_to_string(&file)
            .map_err(|e| ConfigError::wrap(e, ConfigErrorKind::CouldNotOpenFile).file(&file))?;
        let values = serde_yaml::from_str(&contents)
            .map_err(|e| ConfigError::wrap(e, ConfigErrorKind::BadYaml).file(&file))?;

        let config = Self { values, path: file };
        config.validate()?;
        Ok(config)
    }

    /// Creates a config from a JSON value.
    ///
    /// This is mostly useful for tests.
    pub fn from_json_value(value: serde_json::Value) -> Result<Self, ConfigError> {
        let config = Self {
            values: serde_json::from_value(value)
                .map_err(|e| ConfigError::wrap(e, ConfigErrorKind::BadJson))?,
            path: PathBuf::new(),
        };

        config.validate()?;
        Ok(config)
    }

    /// Creates a config from default values and the given overrides.
    ///
    /// Used when there is no config file. The overrides need to provide at least the topic.
    pub fn from_overrides(overrides: OverridableConfig) -> Result<Self, ConfigError> {
        let mut config = Self {
            values: ConfigValues::default(),
            path: PathBuf::new(),
        };

        config.apply_override(overrides)?;
        Ok(config)
    }

    /// Overrides configuration with values from other sources, such as command line parameters.
    pub fn apply_override(
        &mut self,
        overrides: OverridableConfig,
    ) -> Result<&mut Self, ConfigError> {
        if let Some(topic) = overrides.topic {
            self.values.metrics.topic = topic;
        }

        if let Some(log_level) = overrides.log_level {
            self.values.logging.level = log_level
                .parse::<Level>()
                .map_err(|e| ConfigError::for_field(e, "log_level"))?;
        }

        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if let Err(error) = self.values.metrics.publisher_config().validate() {
            let field = match error {
                pulse_publisher::ConfigError::InvalidMaxAttempts => "metrics.retry.max_attempts",
                _ => "metrics.topic",
            };
            return Err(ConfigError::for_field(error, field));
        }

        Ok(())
    }

    /// Returns the path of the loaded configuration file.
    ///
    /// This is empty for configurations not loaded from a file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the logging configuration.
    pub fn logging(&self) -> &LogConfig {
        &self.values.logging
    }

    /// Returns the configuration of the metrics publisher.
    pub fn metrics(&self) -> &MetricsPublisherConfig {
        &self.values.metrics
    }

    /// Returns the librdkafka parameters of the Kafka transport.
    pub fn kafka_params(&self) -> &[KafkaConfigParam] {
        &self.values.kafka
    }

    /// Renders the effective configuration as YAML.
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(&self.values)
            .map_err(|e| ConfigError::wrap(e, ConfigErrorKind::CouldNotSerialize))
    }
}

#[cfg(test)]
mod tests {
    use pulse_log::LogFormat;
    use serde_json::json;

    use super::*;

    const CONFIG: &str = r#"
logging:
  level: debug
  format: json
metrics:
  topic: metric-events
  retry:
    max_attempts: 5
kafka:
  - name: bootstrap.servers
    value: localhost:9092
"#;

    fn write_config(dir: &Path, contents: &str) -> PathBuf {
        let path = dir.join(CONFIG_FILE_NAME);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_load_from_folder() {
        let dir = tempfile::tempdir().unwrap();
        let file = write_config(dir.path(), CONFIG);

        let config = Config::from_path(dir.path()).unwrap();

        assert_eq!(config.path(), file);
        assert_eq!(config.logging().level, Level::Debug);
        assert_eq!(config.logging().format, LogFormat::Json);
        assert_eq!(config.metrics().topic, "metric-events");
        assert_eq!(config.metrics().retry.max_attempts, 5);
        assert!(config.metrics().retry.enabled);
        assert_eq!(
            config.kafka_params(),
            [KafkaConfigParam {
                name: "bootstrap.servers".to_owned(),
                value: "localhost:9092".to_owned(),
            }]
        );
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("custom.yml");
        fs::write(&file, "metrics:\n  topic: events\n").unwrap();

        let config = Config::from_path(&file).unwrap();

        assert_eq!(config.metrics().topic, "events");
        assert_eq!(config.logging().level, Level::Info);
        assert!(config.kafka_params().is_empty());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let error = Config::from_path(dir.path()).unwrap_err();

        assert_eq!(error.kind(), ConfigErrorKind::CouldNotOpenFile);
        assert!(error.source().is_some());
    }

    #[test]
    fn test_bad_yaml() {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path(), "metrics: [");

        let error = Config::from_path(dir.path()).unwrap_err();
        assert_eq!(error.kind(), ConfigErrorKind::BadYaml);
        assert!(error.to_string().ends_with(&format!("{CONFIG_FILE_NAME})")));
    }

    #[test]
    fn test_missing_topic() {
        let error = Config::from_json_value(json!({})).unwrap_err();

        assert_eq!(error.kind(), ConfigErrorKind::InvalidValue);
        insta::assert_snapshot!(error, @"invalid config value (field metrics.topic)");
    }

    #[test]
    fn test_zero_attempts() {
        let error = Config::from_json_value(json!({
            "metrics": {"topic": "events", "retry": {"max_attempts": 0}}
        }))
        .unwrap_err();

        insta::assert_snapshot!(error, @"invalid config value (field metrics.retry.max_attempts)");
    }

    #[test]
    fn test_apply_override() {
        let mut config = Config::from_json_value(json!({"metrics": {"topic": "events"}})).unwrap();

        config
            .apply_override(OverridableConfig {
                topic: Some("other".to_owned()),
                log_level: Some("trace".to_owned()),
            })
            .unwrap();

        assert_eq!(config.metrics().topic, "other");
        assert_eq!(config.logging().level, Level::Trace);
    }

    #[test]
    fn test_from_overrides() {
        let config = Config::from_overrides(OverridableConfig {
            topic: Some("events".to_owned()),
            ..Default::default()
        })
        .unwrap();

        assert!(config.path().as_os_str().is_empty());
        assert_eq!(config.metrics().topic, "events");
        assert_eq!(config.logging().level, Level::Info);
        assert!(config.kafka_params().is_empty());
    }

    #[test]
    fn test_from_overrides_requires_topic() {
        let error = Config::from_overrides(OverridableConfig::default()).unwrap_err();
        insta::assert_snapshot!(error, @"invalid config value (field metrics.topic)");
    }

    #[test]
    fn test_apply_override_invalid_level() {
        let mut config = Config::from_json_value(json!({"metrics": {"topic": "events"}})).unwrap();

        let error = config
            .apply_override(OverridableConfig {
                log_level: Some("loud".to_owned()),
                ..Default::default()
            })
            .unwrap_err();

        insta::assert_snapshot!(error, @"invalid config value (field log_level)");
    }

    #[test]
    fn test_to_yaml_reloads() {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path(), CONFIG);
        let config = Config::from_path(dir.path()).unwrap();

        let yaml = config.to_yaml().unwrap();
        let other = tempfile::tempdir().unwrap();
        write_config(other.path(), &yaml);
        let reloaded = Config::from_path(other.path()).unwrap();

        assert_eq!(reloaded.metrics(), config.metrics());
        assert_eq!(reloaded.kafka_params(), config.kafka_params());
        assert_eq!(reloaded.logging().level, Level::Debug);
    }
}
