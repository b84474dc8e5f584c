use std::{env, time::Duration};

use dotenvy::dotenv;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: String,
    pub static_dir: Option<String>,
    pub fetch_timeout_secs: u64,
    pub fetch_user_agent: String,
    pub api_keys: Vec<String>,
    pub max_body_bytes: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            data_dir: "./data".to_string(),
            static_dir: None,
            fetch_timeout_secs: 15,
            fetch_user_agent: "SeoHubBot/1.0 SEO Checker".to_string(),
            api_keys: Vec::new(),
            max_body_bytes: 10 * 1024 * 1024,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        // Load .env file if it exists
        dotenv().ok();

        let defaults = Self::default();

        let host = env::var("HOST").unwrap_or(defaults.host);

        let port = match env::var("PORT") {
            Ok(raw) => raw.parse::<u16>()?,
            Err(_) => defaults.port,
        };

        let data_dir = env::var("DATA_DIR").unwrap_or(defaults.data_dir);

        let static_dir = env::var("STATIC_DIR").ok().filter(|s| !s.is_empty());

        let fetch_timeout_secs = match env::var("FETCH_TIMEOUT_SECS") {
            Ok(raw) => raw.parse::<u64>()?,
            Err(_) => defaults.fetch_timeout_secs,
        };

        let fetch_user_agent = env::var("FETCH_USER_AGENT").unwrap_or(defaults.fetch_user_agent);

        let api_keys = split_keys(&env::var("API_KEYS").unwrap_or_default());

        let max_body_bytes = match env::var("MAX_BODY_BYTES") {
            Ok(raw) => raw.parse::<usize>()?,
            Err(_) => defaults.max_body_bytes,
        };

        Ok(Self {
            host,
            port,
            data_dir,
            static_dir,
            fetch_timeout_secs,
            fetch_user_agent,
            api_keys,
            max_body_bytes,
        })
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

fn split_keys(raw: &str) -> Vec<String> {
    raw.split(':')
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_keys_skips_empty_segments() {
        assert_eq!(split_keys("a::b:"), vec!["a".to_string(), "b".to_string()]);
        assert!(split_keys("").is_empty());
    }

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.port, 3000);
        assert_eq!(cfg.fetch_timeout(), Duration::from_secs(15));
        assert_eq!(cfg.max_body_bytes, 10_485_760);
        assert!(cfg.api_keys.is_empty());
    }
}
