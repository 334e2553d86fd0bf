use std::env;

use serde::Deserialize;
use tracing::info;

#[derive(Clone, Deserialize, Debug)]
pub struct Config {
    pub env: String, // file / server
    pub host: String,
    pub port: u16,
    pub prefix: Option<String>,
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_exp: u16,
    pub jwt_refresh_exp: u16,
    pub redis_url: String,
    #[serde(default = "default_application_link_base_url")]
    pub application_link_base_url: String,
    #[serde(default = "default_application_link_exp_days")]
    pub application_link_exp_days: u16,
}

fn default_application_link_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_application_link_exp_days() -> u16 {
    7
}

fn load_env_file() {
    let env_var = env::var("env").unwrap_or("file".to_string());
    if env_var == "file" {
        info!("using .env file as environtment variable");
        let _ = dotenvy::dotenv();
    } else {
        info!("using server environtment as environtment variable");
    }
}

pub fn get_config() -> anyhow::Result<Config> {
    load_env_file();
    let config = envy::from_env::<Config>()?;
    Ok(config)
}

/// Development proxy settings, read from `PROXY_*` variables.
#[derive(Clone, Deserialize, Debug)]
pub struct ProxyConfig {
    #[serde(default = "default_proxy_host")]
    pub host: String,
    #[serde(default = "default_proxy_port")]
    pub port: u16,
    /// Overrides the target of every proxy rule when set.
    pub target: Option<String>,
}

fn default_proxy_host() -> String {
    "127.0.0.1".to_string()
}

fn default_proxy_port() -> u16 {
    3001
}

pub fn get_proxy_config() -> anyhow::Result<ProxyConfig> {
    load_env_file();
    let config = envy::prefixed("PROXY_").from_env::<ProxyConfig>()?;
    Ok(config)
}
