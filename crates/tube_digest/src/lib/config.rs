//! # Configuration
//!
//! Secrets come from environment variables, tunables from a JSON settings
//! file. Both are merged into an [`AppConfig`] that is validated once at
//! startup and then handed to every component constructor.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    time::Duration,
};

use lettre::message::Mailbox;
use serde::{Deserialize, Serialize};

use crate::{llm::prompt::SummaryTemplate, report::markup::MarkupStyle};

pub const DEFAULT_SETTINGS_PATH: &str = "config/settings.json";
pub const DEFAULT_ENV_PATH: &str = "config/.env";

const REQUIRED_KEYS: [&str; 5] = [
    "OPENROUTER_API_KEY",
    "YOUTUBE_ACCESS_TOKEN",
    "EMAIL_USERNAME",
    "EMAIL_PASSWORD",
    "EMAIL_TO",
];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variables: {}", .0.join(", "))]
    MissingKeys(Vec<&'static str>),
    #[error("Invalid value for '{key}': {reason}")]
    Invalid { key: &'static str, reason: String },
    #[error("Failed to read settings file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse settings file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Tunables read from `settings.json`. Every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub max_videos_per_channel: u32,
    pub max_channels_to_process: u32,
    pub days_back_to_fetch: u32,
    /// `HH:MM`, UTC
    pub schedule_time: String,
    pub pdf_output_dir: PathBuf,
    pub log_level: String,
    pub log_dir: PathBuf,
    pub max_workers: usize,
    pub summary_template: SummaryTemplate,
    pub summary_language: String,
    pub markup: MarkupStyle,
    pub max_tokens: u32,
    pub temperature: f32,
    pub request_timeout_secs: u64,
    pub transcript_languages: Vec<String>,
    pub min_transcript_chars: usize,
    pub min_description_chars: usize,
    pub page_break_between_sections: bool,
    pub font_path: Option<PathBuf>,
    pub title_translations: BTreeMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_videos_per_channel: 3,
            max_channels_to_process: 20,
            days_back_to_fetch: 1,
            schedule_time: "08:00".into(),
            pdf_output_dir: PathBuf::from("reports"),
            log_level: "INFO".into(),
            log_dir: PathBuf::from("logs"),
            max_workers: 5,
            summary_template: SummaryTemplate::Analysis,
            summary_language: "English".into(),
            markup: MarkupStyle::Markdown,
            max_tokens: 1500,
            temperature: 0.3,
            request_timeout_secs: 60,
            transcript_languages: ["en", "en-US", "en-GB", "en-CA", "en-AU"]
                .into_iter()
                .map(String::from)
                .collect(),
            min_transcript_chars: 100,
            min_description_chars: 100,
            page_break_between_sections: true,
            font_path: None,
            title_translations: BTreeMap::new(),
        }
    }
}

impl Settings {
    /// Loads settings from `path`; `Ok(None)` when the file does not exist.
    /// Unknown keys are ignored; missing keys take their default.
    ///
    /// Runs before the tracing subscriber is installed, so it does not log.
    pub fn load(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_json(&raw)
            .map(Some)
            .map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Parses `schedule_time` into `(hour, minute)`
    pub fn schedule_hour_minute(&self) -> Result<(u32, u32), ConfigError> {
        let invalid = |reason: &str| ConfigError::Invalid {
            key: "schedule_time",
            reason: format!("{reason} (got '{}')", self.schedule_time),
        };

        let (hour, minute) = self
            .schedule_time
            .trim()
            .split_once(':')
            .ok_or_else(|| invalid("expected HH:MM"))?;
        let hour: u32 = hour.parse().map_err(|_| invalid("hour is not a number"))?;
        let minute: u32 = minute
            .parse()
            .map_err(|_| invalid("minute is not a number"))?;

        if hour > 23 || minute > 59 {
            return Err(invalid("time out of range"));
        }
        Ok((hour, minute))
    }

    /// Six-field cron expression firing once a day at `schedule_time`
    pub fn cron_expression(&self) -> Result<String, ConfigError> {
        let (hour, minute) = self.schedule_hour_minute()?;
        Ok(format!("0 {minute} {hour} * * *"))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Clone)]
pub struct OpenRouterConfig {
    pub api_key: String,
    pub model: String,
}

#[derive(Debug, Clone)]
pub struct YouTubeConfig {
    pub access_token: String,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub smtp_server: String,
    pub smtp_port: u16,
    pub username: String,
    pub password: String,
    pub to: String,
}

#[derive(Debug, Clone, Default)]
pub struct ProxyConfig {
    pub http: Option<String>,
    pub https: Option<String>,
}

/// Fully validated runtime configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub openrouter: OpenRouterConfig,
    pub youtube: YouTubeConfig,
    pub email: EmailConfig,
    pub proxy: ProxyConfig,
    pub settings: Settings,
    pub debug: bool,
}

impl AppConfig {
    pub const DEFAULT_MODEL: &str = "google/gemini-2.5-pro";
    pub const DEFAULT_SMTP_SERVER: &str = "smtp.qq.com";
    pub const DEFAULT_SMTP_PORT: u16 = 587;

    pub fn from_env(settings: Settings) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok(), settings)
    }

    /// Builds the config from an arbitrary key lookup; blank values count as missing.
    pub fn from_lookup<F>(lookup: F, settings: Settings) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let missing = REQUIRED_KEYS
            .iter()
            .copied()
            .filter(|key| get(key).is_none())
            .collect::<Vec<_>>();
        if !missing.is_empty() {
            return Err(ConfigError::MissingKeys(missing));
        }

        let smtp_port = match get("EMAIL_SMTP_PORT") {
            Some(port) => port.parse().map_err(|_| ConfigError::Invalid {
                key: "EMAIL_SMTP_PORT",
                reason: format!("'{port}' is not a valid port"),
            })?,
            None => Self::DEFAULT_SMTP_PORT,
        };

        let http_proxy = get("HTTP_PROXY");
        // HTTPS traffic goes through the HTTP proxy unless told otherwise
        let https_proxy = get("HTTPS_PROXY").or_else(|| http_proxy.clone());

        let config = AppConfig {
            openrouter: OpenRouterConfig {
                api_key: get("OPENROUTER_API_KEY").unwrap_or_default(),
                model: get("OPENROUTER_MODEL").unwrap_or_else(|| Self::DEFAULT_MODEL.into()),
            },
            youtube: YouTubeConfig {
                access_token: get("YOUTUBE_ACCESS_TOKEN").unwrap_or_default(),
                api_key: get("YOUTUBE_API_KEY"),
            },
            email: EmailConfig {
                smtp_server: get("EMAIL_SMTP_SERVER")
                    .unwrap_or_else(|| Self::DEFAULT_SMTP_SERVER.into()),
                smtp_port,
                username: get("EMAIL_USERNAME").unwrap_or_default(),
                password: get("EMAIL_PASSWORD").unwrap_or_default(),
                to: get("EMAIL_TO").unwrap_or_default(),
            },
            proxy: ProxyConfig {
                http: http_proxy,
                https: https_proxy,
            },
            settings,
            debug: get("DEBUG").is_some_and(|v| v.eq_ignore_ascii_case("true")),
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let settings = &self.settings;
        settings.schedule_hour_minute()?;

        if settings.max_workers == 0 {
            return Err(ConfigError::Invalid {
                key: "max_workers",
                reason: "must be greater than zero".into(),
            });
        }
        if settings.transcript_languages.is_empty() {
            return Err(ConfigError::Invalid {
                key: "transcript_languages",
                reason: "at least one language code is required".into(),
            });
        }

        for (key, value) in [("HTTP_PROXY", &self.proxy.http), ("HTTPS_PROXY", &self.proxy.https)] {
            if let Some(url) = value {
                reqwest::Url::parse(url).map_err(|e| ConfigError::Invalid {
                    key,
                    reason: e.to_string(),
                })?;
            }
        }

        for (key, value) in [("EMAIL_USERNAME", &self.email.username), ("EMAIL_TO", &self.email.to)] {
            value.parse::<Mailbox>().map_err(|e| ConfigError::Invalid {
                key,
                reason: e.to_string(),
            })?;
        }

        Ok(())
    }

    /// Effective log level; `DEBUG=true` wins over the settings file
    pub fn log_level(&self) -> &str {
        if self.debug {
            "debug"
        } else {
            &self.settings.log_level
        }
    }

    /// Builds an HTTP client that only uses the proxies configured here,
    /// never the process environment.
    pub fn http_client(&self) -> Result<reqwest::Client, reqwest::Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.settings.request_timeout())
            .no_proxy();

        if let Some(url) = &self.proxy.http {
            builder = builder.proxy(reqwest::Proxy::http(url)?);
        }
        if let Some(url) = &self.proxy.https {
            builder = builder.proxy(reqwest::Proxy::https(url)?);
        }

        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn complete_env() -> HashMap<String, String> {
        env(&[
            ("OPENROUTER_API_KEY", "sk-or-test"),
            ("YOUTUBE_ACCESS_TOKEN", "ya29.token"),
            ("EMAIL_USERNAME", "me@example.com"),
            ("EMAIL_PASSWORD", "secret"),
            ("EMAIL_TO", "you@example.com"),
        ])
    }

    #[test]
    fn settings_defaults_match_documented_values() {
        let settings = Settings::default();
        assert_eq!(settings.max_videos_per_channel, 3);
        assert_eq!(settings.max_channels_to_process, 20);
        assert_eq!(settings.days_back_to_fetch, 1);
        assert_eq!(settings.schedule_time, "08:00");
        assert_eq!(settings.pdf_output_dir, PathBuf::from("reports"));
        assert_eq!(settings.max_workers, 5);
        assert_eq!(settings.min_transcript_chars, 100);
        assert_eq!(settings.transcript_languages[0], "en");
    }

    #[test]
    fn partial_settings_file_merges_with_defaults() {
        let settings = Settings::from_json(
            r#"{"max_videos_per_channel": 5, "markup": "plain", "summary_template": "direct_url"}"#,
        )
        .unwrap();

        assert_eq!(settings.max_videos_per_channel, 5);
        assert_eq!(settings.markup, MarkupStyle::Plain);
        assert_eq!(settings.summary_template, SummaryTemplate::DirectUrl);
        assert_eq!(settings.max_channels_to_process, 20);
    }

    #[test]
    fn missing_settings_file_is_reported_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(settings, None, "caller decides on defaults and logs once tracing is up");
        assert_eq!(settings.unwrap_or_default(), Settings::default());
    }

    #[test]
    fn existing_settings_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"max_workers": 2}"#).unwrap();

        let settings = Settings::load(&path).unwrap().expect("file exists");
        assert_eq!(settings.max_workers, 2);
    }

    #[test]
    fn malformed_settings_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            Settings::load(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn schedule_time_becomes_daily_cron_expression() {
        let settings = Settings {
            schedule_time: "07:30".into(),
            ..Default::default()
        };
        assert_eq!(settings.cron_expression().unwrap(), "0 30 7 * * *");

        for bad in ["7", "25:00", "08:61", "aa:bb"] {
            let settings = Settings {
                schedule_time: bad.into(),
                ..Default::default()
            };
            assert!(settings.schedule_hour_minute().is_err(), "{bad} should fail");
        }
    }

    #[test]
    fn all_missing_required_keys_are_reported_together() {
        let vars = env(&[("OPENROUTER_API_KEY", "sk-or-test"), ("EMAIL_TO", "  ")]);
        let err = AppConfig::from_lookup(|k| vars.get(k).cloned(), Settings::default())
            .unwrap_err();

        match err {
            ConfigError::MissingKeys(keys) => {
                assert_eq!(
                    keys,
                    vec![
                        "YOUTUBE_ACCESS_TOKEN",
                        "EMAIL_USERNAME",
                        "EMAIL_PASSWORD",
                        "EMAIL_TO"
                    ]
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn optional_keys_take_defaults() {
        let vars = complete_env();
        let config =
            AppConfig::from_lookup(|k| vars.get(k).cloned(), Settings::default()).unwrap();

        assert_eq!(config.email.smtp_server, "smtp.qq.com");
        assert_eq!(config.email.smtp_port, 587);
        assert_eq!(config.openrouter.model, "google/gemini-2.5-pro");
        assert!(config.proxy.http.is_none());
        assert!(!config.debug);
        assert_eq!(config.log_level(), "INFO");
    }

    #[test]
    fn https_proxy_falls_back_to_http_proxy() {
        let mut vars = complete_env();
        vars.insert("HTTP_PROXY".into(), "http://127.0.0.1:7890".into());
        let config =
            AppConfig::from_lookup(|k| vars.get(k).cloned(), Settings::default()).unwrap();

        assert_eq!(config.proxy.https.as_deref(), Some("http://127.0.0.1:7890"));
        assert!(config.http_client().is_ok());
    }

    #[test]
    fn invalid_values_fail_validation() {
        let mut vars = complete_env();
        vars.insert("EMAIL_SMTP_PORT".into(), "not-a-port".into());
        assert!(matches!(
            AppConfig::from_lookup(|k| vars.get(k).cloned(), Settings::default()),
            Err(ConfigError::Invalid {
                key: "EMAIL_SMTP_PORT",
                ..
            })
        ));

        let vars = complete_env();
        let settings = Settings {
            max_workers: 0,
            ..Default::default()
        };
        assert!(matches!(
            AppConfig::from_lookup(|k| vars.get(k).cloned(), settings),
            Err(ConfigError::Invalid {
                key: "max_workers",
                ..
            })
        ));

        let mut vars = complete_env();
        vars.insert("EMAIL_TO".into(), "not an address".into());
        assert!(matches!(
            AppConfig::from_lookup(|k| vars.get(k).cloned(), Settings::default()),
            Err(ConfigError::Invalid { key: "EMAIL_TO", .. })
        ));
    }

    #[test]
    fn debug_flag_forces_debug_level() {
        let mut vars = complete_env();
        vars.insert("DEBUG".into(), "True".into());
        let config =
            AppConfig::from_lookup(|k| vars.get(k).cloned(), Settings::default()).unwrap();
        assert_eq!(config.log_level(), "debug");
    }
}
