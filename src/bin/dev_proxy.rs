use std::sync::Arc;

use brehan_dashboard::{
    proxy::{init_proxy_route, DevProxy, ProxyTable, DEFAULT_TARGET},
    settings::get_proxy_config,
};
use poem::listener::TcpListener;
use tracing::Level;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = get_proxy_config()?;
    let target = config.target.as_deref().unwrap_or(DEFAULT_TARGET);
    let table = ProxyTable::default_rules(target);
    for rule in table.rules.iter() {
        tracing::info!("proxy {} -> {}", rule.pattern, rule.target);
    }

    let app = init_proxy_route(Arc::new(DevProxy::new(table)));
    tracing::info!("run dev proxy on {}:{}", config.host, config.port);
    poem::Server::new(TcpListener::bind(format!("{}:{}", config.host, config.port)))
        .run(app)
        .await?;
    Ok(())
}
