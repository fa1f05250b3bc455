//! Environment configuration.

use std::env;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_AGENT: &str = "Alex";
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone)]
pub struct EnvConfig {
    pub base_url: String,
    pub log_filter: String,
    pub default_agent: String,
    pub debug_render: bool,
}

impl EnvConfig {
    pub fn from_env() -> Self {
        Self {
            base_url: env_string_opt("AGENT_CHAT_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            log_filter: env_string_opt("AGENT_CHAT_LOG")
                .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
            default_agent: env_string_opt("AGENT_CHAT_DEFAULT_AGENT")
                .unwrap_or_else(|| DEFAULT_AGENT.to_string()),
            debug_render: env_flag("AGENT_CHAT_DEBUG_RENDER"),
        }
    }
}

fn env_flag(key: &str) -> bool {
    env::var(key).map(|value| value == "1").unwrap_or(false)
}

fn env_string_opt(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        if value.trim().is_empty() {
            None
        } else {
            Some(value)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::EnvConfig;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    struct EnvGuard {
        key: &'static str,
        previous: Option<String>,
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            if let Some(value) = &self.previous {
                env::set_var(self.key, value);
            } else {
                env::remove_var(self.key);
            }
        }
    }

    fn env_lock() -> std::sync::MutexGuard<'static, ()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
            .lock()
            .expect("env lock poisoned")
    }

    fn set_env_guard(key: &'static str, value: Option<&str>) -> EnvGuard {
        let previous = env::var(key).ok();
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
        EnvGuard { key, previous }
    }

    #[test]
    fn env_defaults_apply() {
        let _lock = env_lock();
        let _g1 = set_env_guard("AGENT_CHAT_BASE_URL", None);
        let _g2 = set_env_guard("AGENT_CHAT_LOG", None);
        let _g3 = set_env_guard("AGENT_CHAT_DEFAULT_AGENT", None);
        let _g4 = set_env_guard("AGENT_CHAT_DEBUG_RENDER", None);

        let config = EnvConfig::from_env();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.log_filter, "info");
        assert_eq!(config.default_agent, "Alex");
        assert!(!config.debug_render);
    }

    #[test]
    fn env_values_override_defaults() {
        let _lock = env_lock();
        let _g1 = set_env_guard("AGENT_CHAT_BASE_URL", Some("https://chat.example.test"));
        let _g2 = set_env_guard("AGENT_CHAT_LOG", Some("agent_chat=debug"));
        let _g3 = set_env_guard("AGENT_CHAT_DEFAULT_AGENT", Some("Sam"));
        let _g4 = set_env_guard("AGENT_CHAT_DEBUG_RENDER", Some("1"));

        let config = EnvConfig::from_env();
        assert_eq!(config.base_url, "https://chat.example.test");
        assert_eq!(config.log_filter, "agent_chat=debug");
        assert_eq!(config.default_agent, "Sam");
        assert!(config.debug_render);
    }

    #[test]
    fn blank_values_are_ignored() {
        let _lock = env_lock();
        let _g1 = set_env_guard("AGENT_CHAT_DEFAULT_AGENT", Some("  "));
        let _g2 = set_env_guard("AGENT_CHAT_DEBUG_RENDER", Some("true"));
        let config = EnvConfig::from_env();
        assert_eq!(config.default_agent, "Alex");
        assert!(!config.debug_render);
    }
}
