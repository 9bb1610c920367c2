//! Event domain — Docker engine event streaming.

use super::client::{DockerClient, DockerError};
use futures_util::stream::StreamExt;
use std::collections::HashMap;

impl DockerClient {
    /// Stream Docker engine events for containers and services — the only
    /// two event types the multiplexer (§4.5) ever forwards.
    pub fn stream_events(
        &self,
    ) -> impl futures_util::Stream<Item = Result<bollard::models::EventMessage, DockerError>> + '_
    {
        use bollard::query_parameters::EventsOptionsBuilder;

        let mut filters = HashMap::new();
        filters.insert("type", vec!["container", "service"]);

        let options = EventsOptionsBuilder::default().filters(&filters).build();

        self.client
            .events(Some(options))
            .map(|r| r.map_err(DockerError::from))
    }
}
