use anyhow::{anyhow, Result};
use certifier::{api, Certifier, Config, Shared};
use is_terminal::IsTerminal;
use std::sync::Arc;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_init();

    let mut first_args = std::env::args().take(2);
    let (program_name, config_file) = (
        first_args.next().unwrap_or("certifier".to_string()),
        first_args.next(),
    );

    let config = config_init(&program_name, config_file)?;
    let store = config.store().await?;
    let certifier = Arc::new(Certifier::new(config.clone(), store)?);

    let dns_handle = tokio::spawn({
        let certifier = certifier.clone();
        let addr = config.dns_udp_bind_addr;
        async move { certifier.start(addr).await }
    });

    let api_handle = match config.api_bind_addr {
        Some(addr) => {
            tracing::info!("API listening on {addr}");
            Some(tokio::spawn(api::new(addr, certifier.clone())))
        }
        None => None,
    };
    let api_done = async {
        match api_handle {
            Some(handle) => handle.await,
            None => std::future::pending().await,
        }
    };

    tokio::select! {
        _ = signal::ctrl_c() => {
            tracing::info!("quitting from signal");
            if let Err(err) = certifier.shutdown() {
                tracing::warn!("shutdown: {err}");
            }
        },
        Ok(dns_res) = dns_handle => {
            dns_res?;
        }
        Ok(api_res) = api_done => {
            api_res?;
        }
    }
    tracing::info!("goodbye");
    Ok(())
}

fn tracing_init() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_ansi(std::io::stdout().is_terminal()))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "certifier=info".into()),
        )
        .init();
}

fn config_init(program_name: &str, config_file: Option<String>) -> Result<Shared> {
    match config_file {
        None => Err(anyhow!("usage: {program_name} /path/to/config.json")),
        Some(config_file) => {
            let config = Config::try_from_file(&config_file)?;
            tracing::debug!("loaded config from {config_file}");
            Ok(Arc::new(config))
        }
    }
}
