mod console;
mod shell;

use std::sync::Arc;

use floorwatch_backend::PresenterFactory;
use floorwatch_presenter::{
    PresentationDispatcher, Presenter,
    browser::{BrowserNotifications, BrowserPresenter},
    native::{NativeNotifications, NativePresenter},
};

use crate::console::{ConsoleHost, EnvProbe};

fn console_presenters(host: Arc<ConsoleHost>) -> PresenterFactory {
    Box::new(move |navigator, config| {
        PresentationDispatcher::select(
            &EnvProbe,
            || -> Arc<dyn Presenter> {
                let platform: Arc<dyn NativeNotifications> = host.clone();
                Arc::new(NativePresenter::new(
                    platform,
                    navigator.clone(),
                    config.native.clone(),
                ))
            },
            || -> Arc<dyn Presenter> {
                let platform: Arc<dyn BrowserNotifications> = host.clone();
                Arc::new(BrowserPresenter::new(
                    platform,
                    navigator.clone(),
                    config.browser.clone(),
                ))
            },
        )
    })
}

fn main() -> anyhow::Result<()> {
    simple_logger::SimpleLogger::new()
        .with_colors(true)
        .with_threads(true)
        .with_local_timestamps()
        .init()?;

    let host = Arc::new(ConsoleHost::new());
    let channels = floorwatch_bridge::BridgeChannels::default();
    floorwatch_backend::run(
        channels.backend_rx,
        channels.backend_tx,
        console_presenters(host.clone()),
    )?;
    shell::run(channels.frontend_rx, channels.frontend_tx, host)
}
