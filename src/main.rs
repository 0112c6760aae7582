//! mizban - MizbanCloud command line client
//!
//! Cloud servers, CDN and support tickets over the MizbanCloud REST API.
//! Pebble v1.1 output in `--agent` mode.

mod api;
mod cli;
mod commands;
mod config;
mod output;
mod types;

use api::ApiClient;
use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use output::{Output, PebbleError};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let out = Output::new(cli.agent, cli.json, cli.verbose);

    let command = match cli.command {
        Some(cmd) => cmd,
        None => {
            eprintln!("Error: no command provided. Use --help for usage.");
            std::process::exit(1);
        }
    };

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => out.error(PebbleError::input("CONFIG_INVALID", &format!("{:#}", e))),
    };

    if let Err(e) = dispatch(command, config, cli.api_url, &out).await {
        out.error(output::classify(&e));
    }
}

async fn dispatch(
    command: Commands,
    mut config: Config,
    api_url: Option<String>,
    out: &Output,
) -> anyhow::Result<()> {
    let command = match command {
        Commands::Login(args) => return commands::auth::login(args, config, api_url, out).await,
        Commands::Logout => return commands::auth::logout(config, out),
        other => other,
    };

    if let Some(url) = api_url {
        config.base_url = url;
    }
    if !config.is_logged_in() {
        out.log("debug", "No saved token; run `mizban login` first");
    }
    let client = ApiClient::new(&config)?;
    out.log("debug", &format!("Using API at {}", client.base_url()));

    match command {
        Commands::Profile(cmd) => commands::auth::run(cmd, &client, out).await,
        Commands::Server(cmd) => commands::server::run(cmd, &client, out).await,
        Commands::Volume(cmd) => commands::volume::run(cmd, &client, out).await,
        Commands::Snapshot(cmd) => commands::snapshot::run(cmd, &client, out).await,
        Commands::SshKey(cmd) => commands::ssh_key::run(cmd, &client, out).await,
        Commands::Firewall(cmd) => commands::firewall::run(cmd, &client, out).await,
        Commands::Network(cmd) => commands::network::run(cmd, &client, out).await,
        Commands::Domain(cmd) => commands::domain::run(cmd, &client, out).await,
        Commands::Dns(cmd) => commands::dns::run(cmd, &client, out).await,
        Commands::Ssl(cmd) => commands::ssl::run(cmd, &client, out).await,
        Commands::Cache(cmd) => commands::cache::run(cmd, &client, out).await,
        Commands::Waf(cmd) => commands::waf::run(cmd, &client, out).await,
        Commands::Cluster(cmd) => commands::cluster::run(cmd, &client, out).await,
        Commands::Ddos(cmd) => commands::ddos::run(cmd, &client, out).await,
        Commands::Ratelimit(cmd) => commands::ratelimit::run(cmd, &client, out).await,
        Commands::AccessRules(cmd) => commands::access_rules::run(cmd, &client, out).await,
        Commands::CustomPages(cmd) => commands::custom_pages::run(cmd, &client, out).await,
        Commands::PageRules(cmd) => commands::page_rules::run(cmd, &client, out).await,
        Commands::LogForwarder(cmd) => commands::log_forwarder::run(cmd, &client, out).await,
        Commands::Plan(cmd) => commands::plan::run(cmd, &client, out).await,
        Commands::Ticket(cmd) => commands::ticket::run(cmd, &client, out).await,
        Commands::Login(_) | Commands::Logout => Ok(()),
    }
}
