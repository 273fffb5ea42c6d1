use std::sync::Arc;

use anyhow::{Context, Result, bail};
use futures_util::StreamExt;
use serversee_client::text;
use serversee_client::{
    AgentApi, Monitor, PublicStatusClient, ServerSnapshot, ServerStatus, StatusService,
    TransportOptions, TransportRegistry,
};
use serversee_config::{ServerConfig, ServerSeeConfig};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::{Command, WhitelistAction};

pub async fn run(config: ServerSeeConfig, command: Command) -> Result<()> {
    let registry = Arc::new(TransportRegistry::new(TransportOptions::from(&config.client)));
    let mut service = StatusService::new(registry.clone(), config.client.clone());
    if matches!(&command, Command::Status { public: true, .. }) {
        service = service.with_public_api(PublicStatusClient::new(config.client.probe_timeout)?);
    }
    let service = Arc::new(service);

    let result = dispatch(&config, &service, command).await;
    registry.close_all().await;
    result
}

async fn dispatch(
    config: &ServerSeeConfig,
    service: &Arc<StatusService>,
    command: Command,
) -> Result<()> {
    match command {
        Command::Status { name, public, json } => {
            let servers = match &name {
                Some(name) => vec![find(config, name)?.clone()],
                None => config.servers.clone(),
            };
            for server in &servers {
                let status = if public {
                    service.public_status(server).await
                } else {
                    service.status(server).await
                };
                match status {
                    Ok(status) if json => println!("{}", serde_json::to_string_pretty(&status)?),
                    Ok(status) => println!("{}", summary(server, &status)),
                    Err(e) => println!("{:<16} offline ({e})", server.display_name()),
                }
            }
        }
        Command::Watch => watch(config, service.clone()).await?,
        Command::Metrics { name, history } => {
            let api = admin(config, service, &name)?;
            match history {
                Some(limit) => {
                    let samples = api.history(limit).await?;
                    println!("{}", serde_json::to_string_pretty(&samples)?);
                }
                None => {
                    let metrics = api.metrics().await?;
                    println!("{}", serde_json::to_string_pretty(&metrics)?);
                }
            }
        }
        Command::Logs { name, raw } => {
            let api = admin(config, service, &name)?;
            follow_logs(&api, raw).await?;
        }
        Command::Command { name, command } => {
            let api = admin(config, service, &name)?;
            let output = api.execute_command(&command.join(" ")).await?;
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Command::Whitelist { name, action } => {
            let api = admin(config, service, &name)?;
            match action {
                None => {
                    let whitelist = api.whitelist().await?;
                    let state = if whitelist.enabled { "on" } else { "off" };
                    println!("whitelist {state}, {} players", whitelist.players.len());
                    for player in whitelist.players {
                        println!("  {player}");
                    }
                }
                Some(WhitelistAction::On) => api.toggle_whitelist(true).await?,
                Some(WhitelistAction::Off) => api.toggle_whitelist(false).await?,
                Some(WhitelistAction::Add { player }) => api.add_whitelist(&player).await?,
                Some(WhitelistAction::Remove { player }) => api.remove_whitelist(&player).await?,
            }
        }
    }
    Ok(())
}

fn find<'a>(config: &'a ServerSeeConfig, name: &str) -> Result<&'a ServerConfig> {
    config
        .server(name)
        .with_context(|| format!("no server named '{name}' in the configuration"))
}

fn admin(config: &ServerSeeConfig, service: &StatusService, name: &str) -> Result<AgentApi> {
    Ok(service.admin(find(config, name)?)?)
}

fn summary(server: &ServerConfig, status: &ServerStatus) -> String {
    format!(
        "{:<16} {:>4}/{:<4} {:<12} {}",
        server.display_name(),
        status.players,
        status.max_players,
        status.version,
        text::strip(&status.motd).replace('\n', " | ")
    )
}

fn snapshot_line(snapshot: &ServerSnapshot) -> String {
    let time = snapshot.refreshed_at.format("%H:%M:%S");
    match (&snapshot.status, &snapshot.metrics) {
        (Ok(status), Some(metrics)) => format!(
            "[{time}] {:<16} {}/{} online, {:.1} TPS, {:.1} mspt",
            snapshot.name, status.players, status.max_players, metrics.tps_1m, metrics.mspt
        ),
        (Ok(status), None) => format!(
            "[{time}] {:<16} {}/{} online",
            snapshot.name, status.players, status.max_players
        ),
        (Err(e), _) => format!("[{time}] {:<16} offline ({e})", snapshot.name),
    }
}

async fn watch(config: &ServerSeeConfig, service: Arc<StatusService>) -> Result<()> {
    if config.servers.is_empty() {
        bail!("no servers configured");
    }

    let monitor = Arc::new(Monitor::new(service, config.servers.clone()));
    let mut updates = monitor.subscribe();
    let cancel = CancellationToken::new();
    let task = tokio::spawn(monitor.clone().run(config.client.poll_interval, cancel.clone()));

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, stopping");
                break;
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshots = updates.borrow_and_update().clone();
                let mut names: Vec<&String> = snapshots.keys().collect();
                names.sort();
                for name in names {
                    println!("{}", snapshot_line(&snapshots[name]));
                }
            }
        }
    }

    cancel.cancel();
    if let Err(e) = task.await {
        warn!("Monitor task ended abnormally: {}", e);
    }
    Ok(())
}

async fn follow_logs(api: &AgentApi, raw: bool) -> Result<()> {
    let mut lines = api.subscribe_logs().await?;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            line = lines.next() => match line {
                Some(line) if raw => println!("{line}"),
                Some(line) => println!("{}", text::strip(&line)),
                None => bail!("agent closed the log stream"),
            },
        }
    }
    Ok(())
}
