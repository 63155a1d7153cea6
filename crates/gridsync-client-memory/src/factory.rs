//! [`ClientFactory`] over an [`InMemoryGrid`].

use std::sync::Arc;

use async_trait::async_trait;
use gridsync_client::{ApiError, ClientFactory, Clients};
use gridsync_core::ResourceId;

use crate::grid::InMemoryGrid;

/// Hands out clients that all share one grid.
#[derive(Debug, Clone)]
pub struct MemoryClientFactory {
    grid: Arc<InMemoryGrid>,
}

impl MemoryClientFactory {
    pub fn new(grid: Arc<InMemoryGrid>) -> Self {
        Self { grid }
    }

    pub fn grid(&self) -> &Arc<InMemoryGrid> {
        &self.grid
    }
}

#[async_trait]
impl ClientFactory for MemoryClientFactory {
    async fn clients(
        &self,
        namespace: &str,
        name: &str,
        scope: &ResourceId,
    ) -> Result<Clients, ApiError> {
        if let Some(err) = self.grid.credentials_error() {
            tracing::debug!(namespace, name, %scope, "refusing in-memory clients");
            return Err(err);
        }

        Ok(Clients {
            topics: self.grid.clone(),
            hubs: self.grid.clone(),
            subscriptions: self.grid.clone(),
            scopes: self.grid.clone(),
            resource_groups: self.grid.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use gridsync_client::default_classifier;
    use gridsync_core::ErrorKind;

    use super::*;
    use crate::grid::CredentialsFault;

    #[tokio::test]
    async fn credential_faults_surface_as_api_errors() {
        let grid = Arc::new(InMemoryGrid::new("0000"));
        let factory = MemoryClientFactory::new(grid.clone());
        let scope = ResourceId::account("0000");

        assert!(factory.clients("ns", "src", &scope).await.is_ok());

        grid.fail_credentials(Some(CredentialsFault::MissingSecret));
        let err = factory.clients("ns", "src", &scope).await.unwrap_err();
        assert_eq!(default_classifier().classify(&err), ErrorKind::NoCredentials);

        grid.fail_credentials(Some(CredentialsFault::TokenRefresh));
        let err = factory.clients("ns", "src", &scope).await.unwrap_err();
        assert_eq!(default_classifier().classify(&err), ErrorKind::Unclassified);
        assert_eq!(default_classifier().describe(&err), "Invalid client secret");

        grid.fail_credentials(Some(CredentialsFault::Forbidden));
        let err = factory.clients("ns", "src", &scope).await.unwrap_err();
        assert_eq!(default_classifier().classify(&err), ErrorKind::AccessDenied);
    }
}
