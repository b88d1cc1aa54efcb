mod form;
mod input;
mod nav;
mod store;
mod ui;
#[cfg(test)]
mod testing;

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::info;

use crate::form::FormController;
use crate::nav::PendingRoute;
use crate::store::JsonFileStore;

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let cfg = Config::from_env();
    init_tracing(cfg.log_file.as_deref())?;

    let store = JsonFileStore::new(&cfg.store_path);
    info!(store = %store.path().display(), "booting room-entry-tui");

    let mut controller = FormController::mount(store, PendingRoute::default());
    ui::run(&mut controller, cfg.max_field_len)?;

    let (_, _, pending) = controller.into_parts();
    if let Some(route) = pending.take() {
        println!("{}", nav::resolve(cfg.base_url.as_deref(), &route));
    }
    Ok(())
}

fn init_tracing(log_file: Option<&Path>) -> Result<()> {
    // the screen owns the terminal, so stay quiet there unless asked
    let default = if log_file.is_some() { "info" } else { "warn" };
    let env = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    let fmt = tracing_subscriber::fmt()
        .with_env_filter(env)
        .json()
        .with_current_span(false)
        .with_span_list(false);
    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("open log file {}", path.display()))?;
            fmt.with_writer(Mutex::new(file)).init();
        }
        None => fmt.with_writer(std::io::stderr).init(),
    }
    Ok(())
}

struct Config {
    pub store_path: PathBuf,
    pub base_url: Option<String>,
    pub log_file: Option<PathBuf>,
    pub max_field_len: usize,
}

impl Config {
    fn from_env() -> Self {
        let store_path = std::env::var("ROOM_ENTRY_STORE")
            .ok()
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                default_store_path(
                    std::env::var("XDG_DATA_HOME").ok(),
                    std::env::var("HOME").ok(),
                )
            });
        let base_url = std::env::var("ROOM_ENTRY_BASE_URL").ok();
        let log_file = std::env::var("ROOM_ENTRY_LOG_FILE").ok().map(PathBuf::from);
        let max_field_len = parse_field_len(std::env::var("ROOM_ENTRY_MAX_FIELD_LEN").ok());
        Self { store_path, base_url, log_file, max_field_len }
    }
}

const DEFAULT_FIELD_LEN: usize = 64;

fn parse_field_len(raw: Option<String>) -> usize {
    raw.and_then(|v| v.trim().parse().ok())
        .filter(|n| *n > 0)
        .unwrap_or(DEFAULT_FIELD_LEN)
}

fn default_store_path(xdg_data_home: Option<String>, home: Option<String>) -> PathBuf {
    let data_dir = xdg_data_home
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| {
            home.filter(|v| !v.is_empty())
                .map(|h| Path::new(&h).join(".local/share"))
        });
    match data_dir {
        Some(dir) => dir.join("room-entry").join("store.json"),
        None => PathBuf::from("room-entry.json"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_path_prefers_xdg_then_home() {
        assert_eq!(
            default_store_path(Some("/data".into()), Some("/home/a".into())),
            PathBuf::from("/data/room-entry/store.json")
        );
        assert_eq!(
            default_store_path(Some(String::new()), Some("/home/a".into())),
            PathBuf::from("/home/a/.local/share/room-entry/store.json")
        );
        assert_eq!(default_store_path(None, None), PathBuf::from("room-entry.json"));
    }

    #[test]
    fn field_len_falls_back_to_default() {
        assert_eq!(parse_field_len(None), 64);
        assert_eq!(parse_field_len(Some("128".into())), 128);
        assert_eq!(parse_field_len(Some(" 32 ".into())), 32);
        assert_eq!(parse_field_len(Some("0".into())), 64);
        assert_eq!(parse_field_len(Some("-5".into())), 64);
        assert_eq!(parse_field_len(Some("lots".into())), 64);
        assert_eq!(parse_field_len(Some(String::new())), 64);
    }
}
