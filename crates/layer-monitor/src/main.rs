//! Kanata Layer Monitor entry point.
//!
//! Wires the configuration, icon cache, tray menu and cache file together,
//! starts the connection pipeline on a Tokio runtime, and hands the main
//! thread to the tray front-end.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  ├─ load_initial()          -- ~/.config/kanata-layer-monitor/config.yaml
//!  ├─ build_icon_cache()      -- per-layer icons, relative to the config dir
//!  ├─ install_tray_menu()     -- "Listening host:port", separator, "Quit"
//!  ├─ runtime (background)
//!  │    ├─ quit watcher       -- Quit click or Ctrl-C -> on_exit() -> exit(0)
//!  │    └─ pipeline           -- "..." -> ConnectionLoop::run -> LayerMonitor
//!  └─ tray front-end (main thread, blocks)
//! ```
//!
//! # Log level
//!
//! Logging starts at `info`.  Once the configuration is loaded the filter
//! is swapped for its `log_level` directive through a reload handle.

use std::path::Path;
use std::sync::{Arc, RwLock};

use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, reload, EnvFilter, Registry};

use layer_monitor::application::monitor_layer::LayerMonitor;
use layer_monitor::application::show_layer::{
    DisplayContext, LayerDisplay, LayerSink, TrayAdapter,
};
use layer_monitor::application::tray_menu::{install_tray_menu, on_exit, wait_for_quit};
use layer_monitor::infrastructure::network::ConnectionLoop;
use layer_monitor::infrastructure::storage::{
    self,
    cache_file::{CacheFile, NoCacheFile},
    config::load_initial,
    icons::build_icon_cache,
};
use layer_monitor::infrastructure::tray::{self, TrayFrontEnd, DEFAULT_ICON};
use layer_monitor_core::domain::config::DEFAULT_LOG_LEVEL;
use layer_monitor_core::SyntheticState;

type LogHandle = reload::Handle<EnvFilter, Registry>;

fn main() -> anyhow::Result<()> {
    let log_handle = init_logging();
    info!("Kanata Layer Monitor starting");

    // ── Configuration ─────────────────────────────────────────────────────────
    let home = storage::home_dir();
    let loaded = load_initial(home.as_deref());
    apply_log_level(&log_handle, &loaded.config.log_level);

    let icon_dir = loaded.source_dir().map(Path::to_path_buf).unwrap_or_default();
    let icons = Arc::new(build_icon_cache(&loaded.config, &icon_dir));

    // ── Tray ──────────────────────────────────────────────────────────────────
    let (channel_tray, front_end, mut tray_events) = tray::channel();
    let tray: Arc<dyn TrayAdapter> = Arc::new(channel_tray);
    let quit_id = install_tray_menu(tray.as_ref(), &loaded.config, DEFAULT_ICON)
        .context("failed to build the tray menu")?;

    // ── Cache file ────────────────────────────────────────────────────────────
    let sink: Arc<dyn LayerSink> = match home.as_deref() {
        Some(home) => {
            let cache = CacheFile::in_home(home);
            info!(path = %cache.path().display(), "mirroring current layer");
            Arc::new(cache)
        }
        None => {
            warn!("HOME is not set; current-layer cache file disabled");
            Arc::new(NoCacheFile)
        }
    };

    let mut connection = ConnectionLoop::from_config(&loaded.config);
    let ctx = DisplayContext {
        config: Arc::new(RwLock::new(loaded.config)),
        icons,
        default_icon: DEFAULT_ICON,
        tray: Arc::clone(&tray),
        sink,
    };

    // ── Background runtime ────────────────────────────────────────────────────
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("layer-monitor")
        .build()
        .context("failed to start the Tokio runtime")?;

    runtime.spawn(async move {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("cannot listen for Ctrl-C: {e}");
                std::future::pending::<()>().await;
            }
        };

        tokio::select! {
            trigger = wait_for_quit(&mut tray_events, &quit_id) => {
                info!(?trigger, "quit requested");
            }
            () = ctrl_c => info!("shutdown signal received"),
        }

        on_exit();
        std::process::exit(0);
    });

    runtime.spawn(async move {
        let mut monitor = LayerMonitor::new(LayerDisplay::new(ctx));
        monitor.show_state(SyntheticState::Booting);
        info!("Listening on {}", connection.address());

        connection.run(&mut monitor).await;
        warn!("connection to kanata stopped; restart the monitor to reconnect");
    });

    // ── Tray front-end (blocks the main thread) ───────────────────────────────
    // `tray` stays alive here so the front-end keeps running after the
    // pipeline stops; only Quit ends the process.
    // A front-end error is reported once, by `main`'s return value.
    let result = run_front_end(front_end);
    on_exit();
    runtime.shutdown_background();
    result
}

/// Installs the `fmt` subscriber behind a reloadable filter.
fn init_logging() -> LogHandle {
    let (filter, handle) = reload::Layer::new(EnvFilter::new(DEFAULT_LOG_LEVEL));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();
    handle
}

/// Switches the log filter to `directive`, keeping the current one if it
/// does not parse.
fn apply_log_level(handle: &LogHandle, directive: &str) {
    match EnvFilter::try_new(directive) {
        Ok(filter) => {
            if let Err(e) = handle.reload(filter) {
                warn!("failed to apply log_level {directive:?}: {e}");
            }
        }
        Err(e) => warn!("invalid log_level {directive:?}: {e}; keeping {DEFAULT_LOG_LEVEL:?}"),
    }
}

#[cfg(feature = "native-tray")]
fn run_front_end(front_end: TrayFrontEnd) -> anyhow::Result<()> {
    tray::native::run(front_end).context("system tray failed")
}

#[cfg(not(feature = "native-tray"))]
fn run_front_end(front_end: TrayFrontEnd) -> anyhow::Result<()> {
    tray::headless::run(front_end);
    Ok(())
}
