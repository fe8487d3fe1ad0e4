use secrecy::SecretString;
use std::env;

pub const DEFAULT_OPENAI_API_KEY: &str = "sk-local-dev";

#[derive(Clone, Debug)]
pub struct Config {
    pub app_env: String,
    pub mongo_conn_string: String,
    pub mongo_db_name: String,
    pub mongo_max_pool_size: u32,
    pub mongo_min_pool_size: u32,
    /// Applied to both connect and server selection.
    pub mongo_timeout_secs: u64,
    pub batches_collection: String,
    pub questions_collection: String,
    pub web_server_host: String,
    pub web_server_port: u16,
    pub openai_api_key: SecretString,
    pub openai_api_base: String,
    pub openai_model: String,
    pub openai_timeout_secs: u64,
    /// Upper bound on generation units in flight across all batches.
    pub generation_max_concurrency: usize,
    pub chat_memory_max_messages: usize,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            app_env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            mongo_conn_string: env::var("MONGO_CONN_STRING")
                .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            mongo_db_name: env::var("MONGO_DB_NAME")
                .unwrap_or_else(|_| "teachai-local".to_string()),
            mongo_max_pool_size: env::var("MONGO_MAX_POOL_SIZE")
                .ok()
                .and_then(|p| p.parse().ok())
                .filter(|p: &u32| *p > 0)
                .unwrap_or(10),
            mongo_min_pool_size: env::var("MONGO_MIN_POOL_SIZE")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(2),
            mongo_timeout_secs: env::var("MONGO_TIMEOUT_SECS")
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(5),
            batches_collection: env::var("BATCHES_COLLECTION")
                .unwrap_or_else(|_| "question_batches".to_string()),
            questions_collection: env::var("QUESTIONS_COLLECTION")
                .unwrap_or_else(|_| "questions".to_string()),
            web_server_host: env::var("WEB_SERVER_HOST")
                .unwrap_or_else(|_| "localhost".to_string()),
            web_server_port: env::var("WEB_SERVER_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            openai_api_key: SecretString::from(
                env::var("OPENAI_API_KEY").unwrap_or_else(|_| DEFAULT_OPENAI_API_KEY.to_string()),
            ),
            openai_api_base: env::var("OPENAI_API_BASE")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            openai_model: env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            openai_timeout_secs: env::var("OPENAI_TIMEOUT_SECS")
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(120),
            generation_max_concurrency: env::var("GENERATION_MAX_CONCURRENCY")
                .ok()
                .and_then(|c| c.parse().ok())
                .filter(|c: &usize| *c > 0)
                .unwrap_or(8),
            chat_memory_max_messages: env::var("CHAT_MEMORY_MAX_MESSAGES")
                .ok()
                .and_then(|c| c.parse().ok())
                .filter(|c: &usize| *c > 0)
                .unwrap_or(10),
        }
    }

    pub fn is_production(&self) -> bool {
        self.app_env.eq_ignore_ascii_case("production")
    }

    /// Validate that production-critical configuration is set
    /// Panics if required secrets are using default values
    pub fn validate_for_production(&self) {
        use secrecy::ExposeSecret;

        let api_key = self.openai_api_key.expose_secret();

        if api_key == DEFAULT_OPENAI_API_KEY {
            panic!(
                "FATAL: OPENAI_API_KEY is using default value! Set OPENAI_API_KEY environment variable."
            );
        }

        if api_key.trim().is_empty() {
            panic!("FATAL: OPENAI_API_KEY is empty.");
        }

        if self.mongo_conn_string.contains("localhost") {
            log::warn!("MONGO_CONN_STRING points at localhost in production");
        }
    }

    #[cfg(test)]
    pub fn test_config() -> Self {
        Self {
            app_env: "test".to_string(),
            mongo_conn_string: "mongodb://localhost:27017".to_string(),
            mongo_db_name: "teachai-test".to_string(),
            mongo_max_pool_size: 10,
            mongo_min_pool_size: 2,
            mongo_timeout_secs: 5,
            batches_collection: "question_batches".to_string(),
            questions_collection: "questions".to_string(),
            web_server_host: "127.0.0.1".to_string(),
            web_server_port: 8080,
            openai_api_key: SecretString::from("test_openai_key".to_string()),
            openai_api_base: "http://localhost:9999/v1".to_string(),
            openai_model: "test-model".to_string(),
            openai_timeout_secs: 5,
            generation_max_concurrency: 4,
            chat_memory_max_messages: 10,
        }
    }
}
