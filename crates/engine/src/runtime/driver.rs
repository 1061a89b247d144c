//! Fixed-rate frame loop.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior, interval};
use tracing::{debug, error, info, warn};

use super::cluster::{ClusterServer, spawn_cluster_client};
use super::relay::run_relay;
use crate::config::Config;
use crate::node::{ClientNode, FrameHooks, MasterNode};

/// Log a frame summary this often.
const SUMMARY_INTERVAL: Duration = Duration::from_secs(10);

struct FrameClock {
    ticker: tokio::time::Interval,
    origin: Instant,
    budget: Duration,
    last_summary: Instant,
    frames: u64,
}

impl FrameClock {
    fn new(frame_rate: u32) -> Self {
        let budget = Duration::from_secs_f64(1.0 / f64::from(frame_rate.max(1)));
        let mut ticker = interval(budget);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let now = Instant::now();
        Self {
            ticker,
            origin: now,
            budget,
            last_summary: now,
            frames: 0,
        }
    }

    /// Wait for the next frame and return the driver time in seconds.
    async fn tick(&mut self) -> f32 {
        self.ticker.tick().await;
        self.frames += 1;
        self.origin.elapsed().as_secs_f32()
    }

    fn finish(&mut self, started: Instant, node: &dyn FrameHooks) {
        let took = started.elapsed();
        if took > self.budget {
            warn!(
                "Slow frame #{}: {:.3}ms (budget: {:.1}ms)",
                self.frames,
                took.as_secs_f64() * 1000.0,
                self.budget.as_secs_f64() * 1000.0
            );
        }
        if self.last_summary.elapsed() >= SUMMARY_INTERVAL {
            self.last_summary = Instant::now();
            let game = node.game();
            debug!(
                "Frame #{}: {} players ({} enabled), {} collectibles, t={:.1}s",
                self.frames,
                game.players().len(),
                game.players().enabled_count(),
                game.collectibles().num_enabled(),
                game.session().total_time()
            );
        }
    }
}

/// Run the authoritative node until Ctrl-C.
pub async fn run_master(config: Config) -> anyhow::Result<()> {
    let (inbox_tx, inbox_rx) = mpsc::unbounded_channel();
    let (outbox_tx, outbox_rx) = mpsc::unbounded_channel();

    let relay_config = config.relay.clone();
    tokio::spawn(async move {
        if let Err(e) = run_relay(relay_config, inbox_tx, outbox_rx).await {
            error!("Relay link stopped: {}", e);
        }
    });

    let mut cluster = ClusterServer::bind(&config.node.sync_bind).await?;
    let mut node = MasterNode::new(&config, inbox_rx, outbox_tx);
    let mut clock = FrameClock::new(config.node.frame_rate);
    info!("Master running at {} fps", config.node.frame_rate);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        let now = tokio::select! {
            now = clock.tick() => now,
            _ = &mut shutdown => break,
        };
        let started = Instant::now();

        if cluster.take_resyncs() > 0 {
            node.game_mut().resync();
        }
        node.pre_sync(now);
        if let Some(frame) = node.encode() {
            cluster.publish(frame);
        }
        node.post_sync();

        clock.finish(started, &node);
    }

    info!("Shutting down\n{}", node.game().leaderboard());
    Ok(())
}

/// Run a render replica until Ctrl-C.
pub async fn run_client(config: Config) -> anyhow::Result<()> {
    let mut frames = spawn_cluster_client(
        config.node.master_addr.clone(),
        Duration::from_millis(config.relay.reconnect_delay_ms),
    );
    let mut node = ClientNode::new(&config);
    let mut clock = FrameClock::new(config.node.frame_rate);
    info!(
        "Client running at {} fps, master {}",
        config.node.frame_rate, config.node.master_addr
    );

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        let now = tokio::select! {
            now = clock.tick() => now,
            _ = &mut shutdown => break,
        };
        let started = Instant::now();

        node.pre_sync(now);
        while let Ok(data) = frames.try_recv() {
            node.decode(data);
        }
        node.post_sync();

        clock.finish(started, &node);
    }

    info!("Shutting down");
    Ok(())
}
