// system-tests/tests/helpers/fixture.rs
// ============================================================================
// Module: Resource Fixtures
// Description: Created resources that delete themselves on drop.
// Purpose: Keep the backend clean when a case fails midway.
// Dependencies: cloudbar-client, cloudbar-resources
// ============================================================================

use std::ops::Deref;
use std::ops::DerefMut;

use cloudbar_client::ApiClient;
use cloudbar_client::ApiResponse;
use cloudbar_resources::ResourceEndpoint;
use cloudbar_resources::ResourceError;
use tracing::warn;

/// A created resource bound to the client that owns its cleanup.
pub struct Fixture<'a, E: ResourceEndpoint + ?Sized> {
    client: &'a ApiClient,
    endpoint: Box<E>,
    create_response: ApiResponse,
    deleted: bool,
}

impl<'a, E: ResourceEndpoint + ?Sized> Fixture<'a, E> {
    /// Creates `endpoint` on the backend.
    pub fn create(client: &'a ApiClient, mut endpoint: Box<E>) -> Result<Self, ResourceError> {
        let create_response = endpoint.create(client)?;
        Ok(Self {
            client,
            endpoint,
            create_response,
            deleted: false,
        })
    }

    /// Returns the create response.
    pub fn create_response(&self) -> &ApiResponse {
        &self.create_response
    }

    /// Returns the natural key assigned at create.
    pub fn id(&self) -> Result<String, ResourceError> {
        self.endpoint.require_id()
    }

    /// Deletes the resource now; drop will not repeat it.
    pub fn delete(&mut self) -> Result<ApiResponse, ResourceError> {
        self.deleted = true;
        self.endpoint.delete(self.client)
    }
}

impl<E: ResourceEndpoint + ?Sized> Deref for Fixture<'_, E> {
    type Target = E;

    fn deref(&self) -> &E {
        &self.endpoint
    }
}

impl<E: ResourceEndpoint + ?Sized> DerefMut for Fixture<'_, E> {
    fn deref_mut(&mut self) -> &mut E {
        &mut self.endpoint
    }
}

impl<E: ResourceEndpoint + ?Sized> Drop for Fixture<'_, E> {
    fn drop(&mut self) {
        if self.deleted {
            return;
        }
        let kind = self.endpoint.kind();
        if let Err(err) = self.endpoint.delete(self.client) {
            warn!(%kind, id = self.endpoint.resource_id(), error = %err, "fixture cleanup failed");
        }
    }
}
