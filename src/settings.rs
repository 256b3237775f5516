use config::builder::{ConfigBuilder, DefaultState};
use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::ConfigError;
use crate::parser::shapes::Shape;

const CONFIG_FILE: &str = "movie_digest";
const ENV_PREFIX: &str = "DIGEST";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MailgunSettings {
    pub sandbox_id: String,
    pub api_key: String,
    pub email_address: String,
    #[serde(default)]
    pub recipient_name: Option<String>,
}

/// Run configuration. Read from `movie_digest.toml` (optional) and then
/// `DIGEST_*` environment variables, e.g. `DIGEST_MAX_NUM_FILMS=5` or
/// `DIGEST_MAILGUN__API_KEY=...`. Limits `<= 0` are unbounded.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub shape: Shape,
    pub max_num_films: i64,
    pub new_limit: i64,
    pub old_limit: i64,
    pub window_days: u64,
    pub timeout_secs: u64,
    pub subject: Option<String>,
    pub mailgun: Option<MailgunSettings>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            shape: Shape::Ratings,
            max_num_films: 10,
            new_limit: 10,
            old_limit: 10,
            window_days: 6,
            timeout_secs: 30,
            subject: None,
            mailgun: None,
        }
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_builder(
            Config::builder()
                .add_source(File::with_name(CONFIG_FILE).required(false))
                .add_source(environment()),
        )
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        Ok(builder.build()?.try_deserialize()?)
    }

    /// Per-bucket limits in the order the shape lists its buckets.
    pub fn limits(&self) -> Vec<i64> {
        match self.shape {
            Shape::Ratings => vec![self.max_num_films],
            Shape::Showtimes => vec![self.new_limit, self.old_limit],
        }
    }

    pub fn subject(&self) -> String {
        if let Some(subject) = &self.subject {
            return subject.clone();
        }
        match self.shape {
            Shape::Ratings => "Popular movies released this week".to_string(),
            Shape::Showtimes => "Movies in theaters".to_string(),
        }
    }
}
