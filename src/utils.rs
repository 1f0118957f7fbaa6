//! Utils

use std::path::PathBuf;

use clap::{Args, Parser, ValueEnum};

use crate::{
    config::{ConfigError, StoreConfig},
    orders::{HttpOrderGateway, OrderApiConfig},
};

/// Log output format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable logs.
    #[default]
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub struct LoggingArgs {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

/// Arguments for the checkout examples
#[derive(Debug, Parser)]
pub struct ExampleCheckoutArgs {
    /// Store config YAML; the storefront defaults are used when omitted
    #[arg(short, long, env = "FURNISH_STORE_CONFIG")]
    pub store: Option<PathBuf>,

    /// Promo code to apply
    #[arg(short, long)]
    pub promo: Option<String>,

    /// Shipping method id
    #[arg(long, default_value = "white_glove")]
    pub shipping: String,

    /// Order API base URL; orders are not placed when omitted
    #[arg(long, env = "FURNISH_ORDER_API_URL")]
    pub order_api_url: Option<String>,

    /// Order API bearer token
    #[arg(long, env = "FURNISH_ORDER_API_TOKEN", hide_env_values = true)]
    pub order_api_token: Option<String>,

    /// Logging settings
    #[command(flatten)]
    pub logging: LoggingArgs,
}

impl ExampleCheckoutArgs {
    /// Load the store config named by `--store`, or the storefront defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed.
    pub fn load_store(&self) -> Result<StoreConfig, ConfigError> {
        match &self.store {
            Some(path) => StoreConfig::from_path(path),
            None => Ok(StoreConfig::default()),
        }
    }

    /// Gateway for the configured order API, if any.
    pub fn order_gateway(&self) -> Option<HttpOrderGateway> {
        self.order_api_url.as_ref().map(|base_url| {
            HttpOrderGateway::new(OrderApiConfig {
                base_url: base_url.clone(),
                token: self.order_api_token.clone(),
            })
        })
    }
}
