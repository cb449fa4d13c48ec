use floorwatch_bridge::{MessageFromBackend, navigation::Route};
use floorwatch_presenter::navigation::Navigator;
use tokio::sync::mpsc::Sender;

/// Forwards activation routes to the host as
/// [`MessageFromBackend::NavigationRequest`].
///
/// Platform callbacks may fire on any thread, so the route is queued without
/// waiting; it is dropped with a warning if the bridge is full or closed.
#[derive(Debug, Clone)]
pub struct BridgeNavigator {
    tx: Sender<MessageFromBackend>,
}

impl BridgeNavigator {
    pub fn new(tx: Sender<MessageFromBackend>) -> Self {
        Self { tx }
    }
}

impl Navigator for BridgeNavigator {
    fn navigate(&self, route: Route) {
        log::debug!("Requesting navigation to {route}");
        if let Err(error) = self.tx.try_send(MessageFromBackend::NavigationRequest(route)) {
            log::warn!("Failed to forward navigation request: {error}");
        }
    }
}
