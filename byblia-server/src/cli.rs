use clap::{ArgAction, Args, Parser, Subcommand};

use byblia_types::models::config::{
    AppConfig, DatabaseConfig, ModelConfig, OriginConfig, RateLimitConfig, ServerConfig,
    SessionConfig, StreamConfig,
};

pub const DEFAULT_LOG_FILTER: &str = "info,hyper=warn,reqwest=warn,sqlx=warn,tower_http=warn,h2=warn";

#[derive(Parser)]
#[command(
    name = "byblia",
    about = "Byblia - streaming biblical counseling chat service",
    version = env!("CARGO_PKG_VERSION"),
    author,
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub serve: ServeArgs,

    #[arg(short, long, env = "RUST_LOG", default_value = DEFAULT_LOG_FILTER, global = true)]
    pub log_level: String,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Start the chat server (default if no command specified)")]
    Serve,

    #[command(about = "Ask a question against a running server")]
    Ask {
        #[arg(help = "Question to ask; optional with --interactive")]
        question: Option<String>,

        #[arg(short, long, help = "Keep asking until 'exit' or 'quit'")]
        interactive: bool,

        #[command(flatten)]
        target: TargetArgs,
    },

    #[command(about = "List the most recent recorded interactions")]
    Interactions {
        #[arg(short = 'n', long, default_value = "10")]
        limit: u32,

        #[arg(short, long, help = "Output as JSON")]
        json: bool,

        #[command(flatten)]
        target: TargetArgs,
    },
}

/// Which server the client commands talk to.
#[derive(Args, Clone)]
pub struct TargetArgs {
    #[arg(long, env = "BYBLIA_URL", help = "Server URL (probed on localhost when omitted)")]
    pub url: Option<String>,

    #[arg(long, env = "BYBLIA_ORIGIN", help = "Origin header sent with every request")]
    pub origin: Option<String>,
}

/// Server settings, each overridable from the environment or `.env`.
#[derive(Args, Clone)]
pub struct ServeArgs {
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(short, long, env = "PORT", default_value = "8000")]
    pub port: u16,

    #[arg(long, env = "KEEP_ALIVE_SECS", default_value = "120")]
    pub keep_alive_secs: u64,

    #[arg(long, env = "MAX_CONCURRENCY", default_value = "50")]
    pub max_concurrency: usize,

    #[arg(long, env = "BACKLOG", default_value = "100")]
    pub backlog: i32,

    #[arg(long, env = "RATE_LIMIT_REQUESTS", default_value = "5")]
    pub rate_limit_requests: u32,

    #[arg(long, env = "RATE_LIMIT_WINDOW_SECS", default_value = "60")]
    pub rate_limit_window_secs: u64,

    #[arg(long, env = "RATE_LIMIT_SWEEP_SECS", default_value = "300")]
    pub rate_limit_sweep_secs: u64,

    #[arg(
        long,
        env = "ALLOWED_ORIGINS",
        value_delimiter = ',',
        default_value = "byblia.vercel.app"
    )]
    pub allowed_origins: Vec<String>,

    #[arg(long, env = "ENVIRONMENT", default_value = "production")]
    pub environment: String,

    #[arg(long, env = "DISABLE_REFERER_CHECK", action = ArgAction::Set, default_value_t = false)]
    pub disable_referer_check: bool,

    #[arg(long, env = "MAX_PROMPT_LENGTH", default_value = "4000")]
    pub max_prompt_length: usize,

    #[arg(long, env = "COUNSELOR_MODEL", default_value = "deepseek-chat")]
    pub model: String,

    #[arg(long, env = "LLM_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(long, env = "LLM_BASE_URL", default_value = "https://api.deepseek.com")]
    pub base_url: String,

    #[arg(long, env = "LLM_TIMEOUT_SECS", default_value = "120")]
    pub request_timeout_secs: u64,

    #[arg(long, env = "LLM_STREAM_IDLE_SECS", default_value = "30")]
    pub stream_idle_timeout_secs: u64,

    #[arg(long, env = "SYSTEM_PROMPT")]
    pub system_prompt: Option<String>,

    #[arg(long, env = "MIN_TEMPERATURE", default_value = "0.2")]
    pub min_temperature: f64,

    #[arg(long, env = "MAX_TEMPERATURE", default_value = "1.0")]
    pub max_temperature: f64,

    #[arg(long, env = "FALLBACK_TEMPERATURE")]
    pub fallback_temperature: Option<f64>,

    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,

    #[arg(long, env = "HISTORY_ENABLED", action = ArgAction::Set, default_value_t = true)]
    pub history_enabled: bool,

    #[arg(long, env = "MAX_HISTORY_MESSAGES", default_value = "20")]
    pub max_history_messages: usize,
}

impl ServeArgs {
    pub fn is_development(&self) -> bool {
        self.environment.trim().eq_ignore_ascii_case("development")
    }

    pub fn to_config(&self) -> AppConfig {
        let session_defaults = SessionConfig::default();

        AppConfig {
            server: ServerConfig {
                host: self.host.clone(),
                port: self.port,
                keep_alive_secs: self.keep_alive_secs,
                max_concurrency: self.max_concurrency,
                backlog: self.backlog,
            },
            rate_limit: RateLimitConfig {
                max_requests: self.rate_limit_requests,
                window_secs: self.rate_limit_window_secs,
                sweep_interval_secs: self.rate_limit_sweep_secs,
            },
            origin: OriginConfig {
                allowed_origins: self
                    .allowed_origins
                    .iter()
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect(),
                development: self.is_development(),
                disabled: self.disable_referer_check,
            },
            model: ModelConfig {
                model_id: self.model.clone(),
                api_key: self.api_key.clone().unwrap_or_default(),
                base_url: self.base_url.clone(),
                system_prompt: self.system_prompt.clone().filter(|p| !p.trim().is_empty()),
                request_timeout_secs: self.request_timeout_secs,
                stream_idle_timeout_secs: self.stream_idle_timeout_secs,
            },
            session: SessionConfig {
                min_temperature: self.min_temperature,
                max_temperature: self.max_temperature,
                fallback_temperature: self.fallback_temperature,
                max_prompt_chars: self.max_prompt_length,
                history_enabled: self.history_enabled,
                max_history_messages: self.max_history_messages,
                ..session_defaults
            },
            stream: StreamConfig::default(),
            database: DatabaseConfig {
                url: self.database_url.clone().filter(|u| !u.trim().is_empty()),
                ..DatabaseConfig::default()
            },
        }
    }
}
