// src/config.rs

use std::env;
use std::str::FromStr;
use std::time::Duration;

use dotenvy::dotenv;
use url::Url;

/// Number of questions requested from the model when not configured.
pub const DEFAULT_QUESTION_COUNT: usize = 5;

/// Output budget for one inference call.
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

pub const DEFAULT_TEMPERATURE: f32 = 0.7;

const DEFAULT_LLM_BASE_URL: &str = "http://localhost:11434/v1";
const DEFAULT_LLM_MODEL: &str = "openai/gpt-oss-20b";
const DEFAULT_PORT: u16 = 3000;

/// Idle time after which an abandoned session is discarded.
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(30 * 60);

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of an OpenAI-compatible API (e.g. `https://api.openai.com/v1`).
    pub llm_base_url: String,
    pub llm_api_key: Option<String>,
    pub llm_model: String,
    pub llm_max_tokens: u32,
    pub llm_temperature: f32,
    /// No timeout unless set; generation can legitimately take tens of seconds.
    pub llm_timeout: Option<Duration>,
    pub question_count: usize,
    /// Sessions untouched for this long are dropped.
    pub session_ttl: Duration,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm_base_url: DEFAULT_LLM_BASE_URL.to_string(),
            llm_api_key: None,
            llm_model: DEFAULT_LLM_MODEL.to_string(),
            llm_max_tokens: DEFAULT_MAX_TOKENS,
            llm_temperature: DEFAULT_TEMPERATURE,
            llm_timeout: None,
            question_count: DEFAULT_QUESTION_COUNT,
            session_ttl: DEFAULT_SESSION_TTL,
            port: DEFAULT_PORT,
        }
    }
}

/// Log filter directive, read on its own so tracing can start before `Config`.
pub fn log_filter() -> String {
    env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string())
}

impl Config {
    /// Reads configuration from the environment.
    ///
    /// Invalid values fall back to defaults with a warning, so install the
    /// tracing subscriber first.
    pub fn from_env() -> Self {
        dotenv().ok();

        let defaults = Self::default();

        let llm_base_url = match env::var("LLM_BASE_URL") {
            Ok(raw) if Url::parse(&raw).is_ok() => raw.trim_end_matches('/').to_string(),
            Ok(raw) => {
                tracing::warn!("LLM_BASE_URL '{}' is not a valid URL, using default", raw);
                defaults.llm_base_url
            }
            Err(_) => defaults.llm_base_url,
        };

        let llm_api_key = env::var("LLM_API_KEY").ok().filter(|k| !k.trim().is_empty());

        let llm_model = env::var("LLM_MODEL").unwrap_or(defaults.llm_model);

        let llm_timeout = parse_var::<u64>("LLM_TIMEOUT_SECS").map(Duration::from_secs);

        let question_count = parse_var::<usize>("QUIZ_QUESTION_COUNT")
            .filter(|n| *n > 0)
            .unwrap_or(defaults.question_count);

        let session_ttl = parse_var::<u64>("SESSION_TTL_SECS")
            .filter(|secs| *secs > 0)
            .map_or(defaults.session_ttl, Duration::from_secs);

        Self {
            llm_base_url,
            llm_api_key,
            llm_model,
            llm_max_tokens: parse_var("LLM_MAX_TOKENS").unwrap_or(defaults.llm_max_tokens),
            llm_temperature: parse_var("LLM_TEMPERATURE").unwrap_or(defaults.llm_temperature),
            llm_timeout,
            question_count,
            session_ttl,
            port: parse_var("SERVER_PORT").unwrap_or(defaults.port),
        }
    }
}

/// Reads and parses an environment variable, logging (and ignoring) bad values.
fn parse_var<T: FromStr>(key: &str) -> Option<T> {
    let raw = env::var(key).ok()?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring invalid value for {}: '{}'", key, raw);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_defaults_match_generation_contract() {
        let config = Config::default();
        assert_eq!(config.question_count, 5);
        assert_eq!(config.llm_max_tokens, 1000);
        assert!((config.llm_temperature - 0.7).abs() < f32::EPSILON);
        assert!(config.llm_timeout.is_none());
        assert_eq!(config.session_ttl, DEFAULT_SESSION_TTL);
    }

    /// Collects formatted log output in memory.
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_invalid_values_are_logged_and_defaulted() {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        unsafe { env::set_var("QUIZ_QUESTION_COUNT", "lots") };
        let config = tracing::subscriber::with_default(subscriber, Config::from_env);
        unsafe { env::remove_var("QUIZ_QUESTION_COUNT") };

        assert_eq!(config.question_count, DEFAULT_QUESTION_COUNT);
        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(
            output.contains("Ignoring invalid value for QUIZ_QUESTION_COUNT: 'lots'"),
            "missing warning in: {}",
            output
        );
    }

    #[test]
    fn test_parse_var_rejects_garbage() {
        // Unique key so parallel tests do not collide.
        unsafe { env::set_var("QUIZGEN_TEST_PARSE_VAR", "not-a-number") };
        assert_eq!(parse_var::<u32>("QUIZGEN_TEST_PARSE_VAR"), None);

        unsafe { env::set_var("QUIZGEN_TEST_PARSE_VAR", " 42 ") };
        assert_eq!(parse_var::<u32>("QUIZGEN_TEST_PARSE_VAR"), Some(42));

        unsafe { env::remove_var("QUIZGEN_TEST_PARSE_VAR") };
        assert_eq!(parse_var::<u32>("QUIZGEN_TEST_PARSE_VAR"), None);
    }
}
