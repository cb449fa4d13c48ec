use crate::transport::Transport;

/// Handles [`floorwatch_bridge::MessageToBackend::Connect`]: starts a fresh
/// connection and remembers the URL for the next start.
pub async fn handle_connect<T: Transport>(context: super::AppContextHandle<'_, T>, url: String) {
    context.pipeline.connect(&url);

    if context.state.config.stream.url.as_deref() == Some(url.as_str()) {
        return;
    }
    context.state.config.stream.url = Some(url);

    if let Some(config_path) = &context.state.config_path {
        if let Err(error) = crate::config::save_config(&context.state.config, config_path).await {
            log::warn!("Failed to persist stream URL: {error}");
        }
    }
}

/// Handles [`floorwatch_bridge::MessageToBackend::Disconnect`].
pub fn handle_disconnect<T: Transport>(context: super::AppContextHandle<'_, T>) {
    context.pipeline.disconnect();
}
