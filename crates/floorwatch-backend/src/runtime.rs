//! Backend runtime setup and orchestration.
//!
//! This module wires together configuration, the presentation channel, the
//! event stream transport and the loop that serves bridge commands.

use std::{io, path::PathBuf, sync::Arc, thread, time::Duration};

use floorwatch_bridge::{MessageFromBackend, MessageToBackend, config::Config};
use floorwatch_presenter::{PresentationDispatcher, navigation::Navigator};
use tokio::sync::mpsc::{Receiver, Sender};

use crate::app::AppContext;
use crate::navigation::BridgeNavigator;
use crate::pipeline::{NotificationPipeline, connection::ReconnectPolicy};
use crate::state::State;
use crate::transport::{HttpEventSource, Transport};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Builds the presentation dispatcher once the configuration is known. The
/// navigator forwards activation routes to the host.
pub type PresenterFactory =
    Box<dyn FnOnce(Arc<dyn Navigator>, &Config) -> PresentationDispatcher + Send>;

fn apply_log_level(level: &str) {
    match level.parse::<log::LevelFilter>() {
        Ok(filter) => log::set_max_level(filter),
        Err(_) => log::warn!("Unknown log level `{level}`, keeping the current one"),
    }
}

/// Serves bridge commands with an already built pipeline collaborator set.
///
/// Wires the presenter callbacks, starts the permission handshake in the
/// background, connects to the configured stream if `auto_connect` is set and
/// then runs until the host closes the bridge. `config_path` is where an
/// explicitly connected URL gets persisted.
pub async fn serve<T: Transport>(
    config: Config,
    config_path: Option<PathBuf>,
    transport: T,
    dispatcher: PresentationDispatcher,
    rx: Receiver<MessageToBackend>,
    tx: Sender<MessageFromBackend>,
) {
    if let Err(error) = dispatcher.wire_callbacks() {
        log::error!("Failed to register notification callbacks: {error}");
    }

    let presenter = dispatcher.presenter();
    tokio::spawn(async move {
        match presenter.initialize().await {
            Ok(()) => log::info!("Notification channel ready"),
            Err(error) => log::warn!("Notification channel not ready: {error}"),
        }
    });

    let policy = ReconnectPolicy::from(&config.reconnect);
    let startup_url = config
        .stream
        .url
        .clone()
        .filter(|_| config.stream.auto_connect);

    let mut context = AppContext {
        state: State::new(config, config_path),
        pipeline: NotificationPipeline::new(transport, policy, dispatcher),
        tx,
    };

    if let Some(url) = startup_url {
        context.pipeline.connect(&url);
    }

    context.run(rx).await;
}

/// Initialize backend state and start processing host messages.
async fn setup_backend(
    rx: Receiver<MessageToBackend>,
    tx: Sender<MessageFromBackend>,
    presenters: PresenterFactory,
) {
    let (config, config_path) = match crate::config::load_config().await {
        Ok((config, path)) => (config, Some(path)),
        Err(error) => {
            log::error!("Failed to load config, using defaults: {error}");
            (Config::default(), None)
        }
    };
    apply_log_level(&config.log_level);

    let request_client = match reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .build()
    {
        Ok(client) => client,
        Err(error) => {
            log::error!("Failed to build HTTP client: {error}");
            return;
        }
    };

    let navigator: Arc<dyn Navigator> = Arc::new(BridgeNavigator::new(tx.clone()));
    let dispatcher = presenters(navigator, &config);

    serve(
        config,
        config_path,
        HttpEventSource::new(request_client),
        dispatcher,
        rx,
        tx,
    )
    .await;
}

/// Spawn the backend runtime on its own thread and begin processing bridge
/// messages.
pub fn run(
    rx: Receiver<MessageToBackend>,
    tx: Sender<MessageFromBackend>,
    presenters: PresenterFactory,
) -> io::Result<thread::JoinHandle<()>> {
    thread::Builder::new()
        .name("floorwatch-backend".to_string())
        .spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(error) => {
                    log::error!("Failed to build backend runtime: {error}");
                    return;
                }
            };
            runtime.block_on(setup_backend(rx, tx, presenters));
        })
}
