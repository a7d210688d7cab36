//! Integration tests for the layer pipeline.
//!
//! These tests wire the real storage adapters (config file, icon files,
//! cache file, all under a temporary `HOME`) and a real TCP socket to the
//! application layer, with only the tray replaced by the recording mock:
//!
//! ```text
//! TcpListener ──lines──► stream_lines / ConnectionLoop ──► LayerMonitor
//!                                                            │
//!                                     RecordingTray ◄────────┤
//!                                     CacheFile (tempdir) ◄──┘
//! ```

use std::path::Path;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use tempfile::TempDir;
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};

use layer_monitor::application::monitor_layer::LayerMonitor;
use layer_monitor::application::show_layer::{DisplayContext, LayerDisplay};
use layer_monitor::infrastructure::network::{stream_lines, ConnectionLoop, ConnectionState};
use layer_monitor::infrastructure::storage::cache_file::CacheFile;
use layer_monitor::infrastructure::storage::config::{config_dir, load_initial, LoadedConfig};
use layer_monitor::infrastructure::storage::icons::build_icon_cache;
use layer_monitor::infrastructure::tray::mock::RecordingTray;
use layer_monitor::infrastructure::tray::DEFAULT_ICON;
use layer_monitor_core::{encode_layer_change, SyntheticState};

const TEST_TIMEOUT: Duration = Duration::from_secs(5);

// ── Helpers ───────────────────────────────────────────────────────────────────

struct Harness {
    monitor: LayerMonitor,
    tray: Arc<RecordingTray>,
    cache: CacheFile,
}

impl Harness {
    fn new(home: &Path, loaded: LoadedConfig) -> Self {
        let icon_dir = loaded.source_dir().map(Path::to_path_buf).unwrap_or_default();
        let icons = build_icon_cache(&loaded.config, &icon_dir);
        let tray = Arc::new(RecordingTray::new());
        let cache = CacheFile::in_home(home);

        let display = LayerDisplay::new(DisplayContext {
            config: Arc::new(RwLock::new(loaded.config)),
            icons: Arc::new(icons),
            default_icon: DEFAULT_ICON,
            tray: Arc::clone(&tray) as _,
            sink: Arc::new(cache.clone()),
        });

        Self {
            monitor: LayerMonitor::new(display),
            tray,
            cache,
        }
    }

    fn cache_content(&self) -> String {
        std::fs::read_to_string(self.cache.path()).unwrap()
    }
}

fn write_config(home: &Path, content: &str) {
    let dir = config_dir(home);
    std::fs::create_dir_all(dir.join("icons")).unwrap();
    std::fs::write(dir.join("config.yaml"), content).unwrap();
}

/// Serves `payload` to one client over a real socket and returns the
/// client end.
async fn serve_once(payload: Vec<u8>) -> TcpStream {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        socket.write_all(&payload).await.unwrap();
    });
    TcpStream::connect(addr).await.unwrap()
}

fn layer_lines(layers: &[&str]) -> Vec<u8> {
    layers
        .iter()
        .flat_map(|layer| encode_layer_change(layer).unwrap())
        .collect()
}

// ── Scenarios ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_absent_config_and_failed_dial_show_error() {
    // Arrange: no config file, so the defaults apply.
    let home = TempDir::new().unwrap();
    let loaded = load_initial(Some(home.path()));
    assert_eq!(loaded.config.host, "127.0.0.1");
    assert_eq!(loaded.config.port, 4444);

    // Point at a port nobody listens on so the dial fails deterministically.
    let closed = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = closed.local_addr().unwrap().port();
    drop(closed);

    let mut config = loaded.config.clone();
    config.port = port;
    let mut connection = ConnectionLoop::from_config(&config);
    let mut harness = Harness::new(home.path(), loaded);

    // Act
    harness.monitor.show_state(SyntheticState::Booting);
    tokio::time::timeout(TEST_TIMEOUT, connection.run(&mut harness.monitor))
        .await
        .expect("default policy gives up after one failed dial");

    // Assert
    assert_eq!(connection.state(), ConnectionState::Terminated);
    assert_eq!(harness.tray.titles(), vec![" ...", " Error"]);
    assert_eq!(harness.cache_content(), "Error");
}

#[tokio::test]
async fn test_duplicate_layer_change_updates_tray_and_file_once() {
    // Arrange
    let home = TempDir::new().unwrap();
    let mut harness = Harness::new(home.path(), load_initial(Some(home.path())));
    let stream = serve_once(layer_lines(&["base", "nav", "nav"])).await;

    // Act
    tokio::time::timeout(
        TEST_TIMEOUT,
        stream_lines(BufReader::new(stream), &mut harness.monitor),
    )
    .await
    .expect("stream must end")
    .unwrap();

    // Assert
    assert_eq!(harness.tray.titles(), vec![" base", " nav"]);
    assert_eq!(harness.tray.icons().len(), 2);
    assert_eq!(harness.cache_content(), "nav");
}

#[tokio::test]
async fn test_configured_labels_icons_and_hidden_layers() {
    // Arrange
    let home = TempDir::new().unwrap();
    write_config(
        home.path(),
        r#"
layers:
  nav:
    label:
      text: "NAV"
    icon:
      path: icons/nav.png
  mouse:
    label:
      hidden: true
    icon:
      path: icons/mouse.png
  broken:
    icon:
      path: icons/does-not-exist.png
"#,
    );
    let icons = config_dir(home.path()).join("icons");
    std::fs::write(icons.join("nav.png"), b"nav-icon").unwrap();
    std::fs::write(icons.join("mouse.png"), b"mouse-icon").unwrap();

    let loaded = load_initial(Some(home.path()));
    assert!(loaded.source.is_some(), "config.yaml must be discovered");
    let mut harness = Harness::new(home.path(), loaded);
    let stream = serve_once(layer_lines(&["nav", "mouse", "broken", "qwerty"])).await;

    // Act
    tokio::time::timeout(
        TEST_TIMEOUT,
        stream_lines(BufReader::new(stream), &mut harness.monitor),
    )
    .await
    .expect("stream must end")
    .unwrap();

    // Assert
    assert_eq!(harness.tray.titles(), vec![" NAV", " ", " broken", " qwerty"]);
    assert_eq!(
        harness.tray.icons(),
        vec![
            b"nav-icon".to_vec(),
            b"mouse-icon".to_vec(),
            DEFAULT_ICON.to_vec(),
            DEFAULT_ICON.to_vec(),
        ]
    );
    assert_eq!(harness.cache_content(), "qwerty");
}

#[tokio::test]
async fn test_invalid_json_shows_na_and_stream_recovers() {
    // Arrange
    let home = TempDir::new().unwrap();
    let mut harness = Harness::new(home.path(), load_initial(Some(home.path())));
    let mut payload = layer_lines(&["base"]);
    payload.extend_from_slice(b"this is not json\n");
    payload.extend_from_slice(b"{\"ConfigFileReload\":{\"new\":\"x.kbd\"}}\n");
    payload.extend(layer_lines(&["base"]));
    let stream = serve_once(payload).await;

    // Act
    tokio::time::timeout(
        TEST_TIMEOUT,
        stream_lines(BufReader::new(stream), &mut harness.monitor),
    )
    .await
    .expect("stream must end")
    .unwrap();

    // Assert: "base" is shown again after "N/A"; the other message kind is skipped.
    assert_eq!(harness.tray.titles(), vec![" base", " N/A", " base"]);
    assert_eq!(harness.cache_content(), "base");
}
