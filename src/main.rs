use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use std::fs;
use std::path::Path;
use std::sync::Arc;

use bubbacat_bot::actions::{ActionRegistry, Services};
use bubbacat_bot::api::{
    fetch_and_rank_pair, CallistoClient, DexScreenerClient, QueryOptions, ReplicateClient,
};
use bubbacat_bot::cli::{Cli, Command, PairArgs};
use bubbacat_bot::config::Config;
use bubbacat_bot::models::Message;
use bubbacat_bot::resolver::TokenResolver;
use bubbacat_bot::{logging, metrics};

fn load_config(path: &Path) -> Result<Config> {
    let mut config = if path.exists() {
        Config::load(path).with_context(|| format!("Failed to load configuration from {:?}", path))?
    } else {
        warn!("No configuration at {:?}, using defaults", path);
        Config::default()
    };
    config.apply_env();
    Ok(config)
}

fn pair_options(args: PairArgs) -> Result<QueryOptions> {
    if let Some(text) = args.query {
        return Ok(QueryOptions::Query { text });
    }
    if let Some(address) = args.token {
        return Ok(QueryOptions::Token { address });
    }
    let mut values = args.pair.unwrap_or_default().into_iter();
    let chain = values.next().context("--pair needs a chain")?;
    Ok(QueryOptions::Pair {
        chain,
        addresses: values.collect(),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    let show_metrics = cli.metrics;
    logging::init(cli.debug, cli.log_file.as_deref())?;
    metrics::init()?;

    let config_path = cli.config.unwrap_or_else(|| "config/config.toml".into());
    let config = load_config(&config_path)?;
    info!("Configuration loaded.");

    let timeout = config.http.timeout();
    let market = Arc::new(DexScreenerClient::new(
        &config.market_data.base_url,
        &config.market_data.chart_base_url,
        timeout,
    )?);
    let resolver = Arc::new(TokenResolver::new(&config.resolver));

    match cli.command {
        Command::Ask { text, out } => {
            let services = Services {
                market: market.clone(),
                charts: market,
                dca: Arc::new(CallistoClient::new(
                    &config.dca.base_url,
                    config.dca.api_key.clone(),
                    timeout,
                )?),
                images: Arc::new(ReplicateClient::new(
                    &config.image.base_url,
                    &config.image.model,
                    config.image.api_token.clone(),
                    timeout,
                )?),
                resolver,
            };
            let registry = ActionRegistry::with_defaults(&services);

            match registry.dispatch(&Message::new(text).with_source("cli")).await {
                Some(reply) => {
                    println!("[{}] {}", reply.action, reply.text);
                    if !reply.attachments.is_empty() {
                        fs::create_dir_all(&out)?;
                    }
                    for attachment in &reply.attachments {
                        let path = out.join(&attachment.name);
                        fs::write(&path, &attachment.bytes)
                            .with_context(|| format!("Failed to write {:?}", path))?;
                        println!("wrote {} ({} bytes)", path.display(), attachment.bytes.len());
                    }
                }
                None => println!("No action matched the message."),
            }
        }
        Command::Resolve { text } => {
            let address = resolver.resolve(market.as_ref(), &text).await?;
            println!("{}", address);
        }
        Command::Pair(args) => {
            let options = pair_options(args)?;
            match fetch_and_rank_pair(market.as_ref(), &options, resolver.chain()).await? {
                Some(pair) => println!("{}", serde_json::to_string_pretty(&pair)?),
                None => println!("No pairs found."),
            }
        }
    }

    if show_metrics {
        print!("{}", metrics::render()?);
    }
    Ok(())
}
