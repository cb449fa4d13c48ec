use std::path::PathBuf;

use floorwatch_bridge::{config::Config, connection::ConnectionState};

/// Backend state that lives next to the pipeline on the backend task.
#[derive(Debug, Clone)]
pub struct State {
    /// The loaded application configuration.
    pub config: Config,
    /// Where `config` is persisted; `None` keeps changes in memory only.
    pub config_path: Option<PathBuf>,
    /// Store revision last sent to the host.
    pub published_revision: Option<u64>,
    /// Connection state last sent to the host.
    pub published_connection: Option<ConnectionState>,
}

impl State {
    pub fn new(config: Config, config_path: Option<PathBuf>) -> Self {
        Self {
            config,
            config_path,
            published_revision: None,
            published_connection: None,
        }
    }
}
