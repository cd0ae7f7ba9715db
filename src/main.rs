//! Match history sync binary: follows one player's match history and logs every update.
//!
//! Type `r` followed by Enter to request a manual refresh.

use std::{env, sync::Arc};

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use match_history_sync::{
    config::SyncConfig,
    dao::{
        match_store::{
            MatchStore,
            http::{HttpMatchStore, HttpStoreConfig},
        },
        models::PlayerIdentity,
    },
    services::{
        rank_service::load_ranks,
        sync_controller::{MatchSyncController, RefreshOutcome},
    },
    state::SyncSnapshot,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let puuid = env::var("PUUID").context("PUUID must name the player to follow")?;
    let region = env::var("REGION").ok().filter(|region| !region.is_empty());
    let identity = PlayerIdentity::from(puuid);

    let config = SyncConfig::load();
    let store_config = HttpStoreConfig::from_env().with_timeout(config.request_timeout);
    info!(backend = %store_config.backend_url, "connecting to match backend");
    let store: Arc<dyn MatchStore> =
        Arc::new(HttpMatchStore::new(store_config).context("building match store")?);

    if let Some(region) = region {
        tokio::spawn(log_ranks(store.clone(), identity.clone(), region));
    }

    let controller = MatchSyncController::new(store, config);
    let mut updates = controller.subscribe();
    controller.initialize(identity);

    let mut commands = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                report(&snapshot);
            }
            line = commands.next_line(), if stdin_open => match line {
                Ok(Some(line)) if line.trim() == "r" => match controller.request_manual_refresh() {
                    RefreshOutcome::Accepted => info!("manual refresh requested"),
                    RefreshOutcome::Throttled { seconds_remaining } => {
                        info!(seconds_remaining, "refresh throttled; wait before retrying")
                    }
                    RefreshOutcome::NotReady => info!("nothing to refresh yet"),
                },
                Ok(Some(_)) => {}
                // stdin closed; keep following updates until shutdown.
                Ok(None) => stdin_open = false,
                Err(err) => warn!(error = %err, "failed to read command"),
            },
        }
    }

    controller.dispose();
    info!("stopped following match history");
    Ok(())
}

async fn log_ranks(store: Arc<dyn MatchStore>, identity: PlayerIdentity, region: String) {
    match load_ranks(store.as_ref(), &identity, &region).await {
        Ok(entries) => {
            for entry in entries {
                info!(
                    queue = ?entry.queue_type,
                    rank = %entry.label(),
                    lp = entry.league_points,
                    wins = entry.wins,
                    losses = entry.losses,
                    "ranked standing"
                );
            }
        }
        Err(err) => warn!(error = %err, "failed to fetch rank info"),
    }
}

fn report(snapshot: &SyncSnapshot) {
    if let Some(error) = &snapshot.error {
        warn!(phase = ?snapshot.phase, %error, "match history unavailable");
        return;
    }

    info!(
        phase = ?snapshot.phase,
        matches = snapshot.matches.len(),
        builds = snapshot.enrichment.len(),
        loading = snapshot.is_loading,
        "match history state"
    );
    for view in snapshot.views() {
        debug!(
            match_id = %view.record.match_id,
            champion = %view.record.champion_name,
            position = %view.position_name(),
            kda = %view.kda_line(),
            cs = view.total_cs(),
            duration = %view.formatted_duration(),
            win = view.record.win,
            build = view.build.is_some(),
            "match"
        );
    }
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,match_history_sync=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
