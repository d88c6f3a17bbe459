pub mod clients;
pub mod domain;
pub mod error;
pub mod normalize;
pub mod poller;
pub mod smoke;
pub mod store;
pub mod time;
pub mod transport;

pub mod config {
    use std::path::PathBuf;
    use std::time::Duration;

    pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
    const DEFAULT_API_TIMEOUT_SECS: u64 = 30;
    const DEFAULT_POLL_INTERVAL_MS: u64 = 300;
    const DEFAULT_POLL_TIMEOUT_MS: u64 = 7000;
    const DEFAULT_LOCAL_STORE_PATH: &str = ".etfwise/local-store.json";

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub api_base_url: String,
        pub api_timeout_secs: u64,
        pub poll_interval: Duration,
        pub poll_timeout: Duration,
        pub local_store_path: PathBuf,
        pub sentry_dsn: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self::from_lookup(|key| std::env::var(key).ok()))
        }

        fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
            let var = |key: &str| lookup(key).filter(|s| !s.trim().is_empty());
            let number = |key: &str, default: u64| {
                var(key)
                    .and_then(|s| s.trim().parse::<u64>().ok())
                    .unwrap_or(default)
            };

            Self {
                api_base_url: var("API_BASE_URL")
                    .or_else(|| var("NEXT_PUBLIC_API_BASE_URL"))
                    .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string()),
                api_timeout_secs: number("API_TIMEOUT_SECS", DEFAULT_API_TIMEOUT_SECS),
                poll_interval: Duration::from_millis(number(
                    "POLL_INTERVAL_MS",
                    DEFAULT_POLL_INTERVAL_MS,
                )),
                poll_timeout: Duration::from_millis(number(
                    "POLL_TIMEOUT_MS",
                    DEFAULT_POLL_TIMEOUT_MS,
                )),
                local_store_path: var("LOCAL_STORE_PATH")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_LOCAL_STORE_PATH)),
                sentry_dsn: var("SENTRY_DSN"),
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use std::collections::HashMap;

        fn settings(vars: &[(&str, &str)]) -> Settings {
            let vars: HashMap<String, String> = vars
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            Settings::from_lookup(|key| vars.get(key).cloned())
        }

        #[test]
        fn defaults_apply_when_unset() {
            let s = settings(&[]);
            assert_eq!(s.api_base_url, DEFAULT_API_BASE_URL);
            assert_eq!(s.poll_interval, Duration::from_millis(300));
            assert_eq!(s.poll_timeout, Duration::from_millis(7000));
            assert!(s.sentry_dsn.is_none());
        }

        #[test]
        fn public_base_url_is_a_fallback() {
            let s = settings(&[("NEXT_PUBLIC_API_BASE_URL", "https://api.example.com")]);
            assert_eq!(s.api_base_url, "https://api.example.com");

            let s = settings(&[
                ("API_BASE_URL", "http://10.0.0.2:8000"),
                ("NEXT_PUBLIC_API_BASE_URL", "https://api.example.com"),
            ]);
            assert_eq!(s.api_base_url, "http://10.0.0.2:8000");
        }

        #[test]
        fn garbage_numbers_and_blanks_fall_back() {
            let s = settings(&[("POLL_INTERVAL_MS", "fast"), ("API_BASE_URL", "  ")]);
            assert_eq!(s.poll_interval, Duration::from_millis(300));
            assert_eq!(s.api_base_url, DEFAULT_API_BASE_URL);
        }
    }
}
