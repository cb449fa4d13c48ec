use floorwatch_bridge::MessageFromBackend;

use crate::transport::Transport;

/// Handles an incoming configuration request (see
/// [`floorwatch_bridge::MessageToBackend::ConfigurationRequest`]).
pub async fn handle_config_request<T: Transport>(context: super::AppContextHandle<'_, T>) {
    let config = context.state.config.clone();
    context
        .send(MessageFromBackend::ConfigurationResponse(config))
        .await;
}
