//! Model availability lookup with a per-backend listing cache.

use crate::ports::clock::Clock;
use crate::ports::inference_gateway::{GatewayError, InferenceGateway};
use chrono::{DateTime, Utc};
use parley_domain::{BackendId, ModelId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::debug;

/// Tag the runtime assumes when a model name has none
const DEFAULT_TAG: &str = "latest";

/// Caches `list_models` per backend; shared by every session and chat call.
pub struct ModelCatalog<G: InferenceGateway + 'static> {
    gateway: Arc<G>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    listings: Mutex<HashMap<BackendId, (Vec<ModelId>, DateTime<Utc>)>>,
}

impl<G: InferenceGateway + 'static> ModelCatalog<G> {
    pub fn new(gateway: Arc<G>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            gateway,
            clock,
            ttl,
            listings: Mutex::new(HashMap::new()),
        }
    }

    /// Installed models on `backend`, served from cache while fresh.
    pub async fn models(&self, backend: &BackendId) -> Result<Vec<ModelId>, GatewayError> {
        if let Some(models) = self.cached(backend, self.clock.now()) {
            return Ok(models);
        }
        self.refresh(backend).await
    }

    /// Fetch the listing for `backend` now and replace the cached copy.
    pub async fn refresh(&self, backend: &BackendId) -> Result<Vec<ModelId>, GatewayError> {
        debug!("Listing models on backend {}", backend);
        let models = self.gateway.list_models(backend).await?;
        self.listings
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(backend.clone(), (models.clone(), self.clock.now()));
        Ok(models)
    }

    /// Whether `model` is installed on `backend`.
    ///
    /// `llama3` matches an installed `llama3:latest`.
    pub async fn is_available(
        &self,
        backend: &BackendId,
        model: &ModelId,
    ) -> Result<bool, GatewayError> {
        let models = self.models(backend).await?;
        Ok(models.iter().any(|m| same_model(m, model)))
    }

    /// Like [`is_available`](Self::is_available), but asks the backend
    /// instead of trusting a cached listing.
    pub async fn is_installed_now(
        &self,
        backend: &BackendId,
        model: &ModelId,
    ) -> Result<bool, GatewayError> {
        let models = self.refresh(backend).await?;
        Ok(models.iter().any(|m| same_model(m, model)))
    }

    /// Fail with [`GatewayError::ModelNotAvailable`] unless `model` is installed.
    pub async fn require(&self, backend: &BackendId, model: &ModelId) -> Result<(), GatewayError> {
        if self.is_available(backend, model).await? {
            Ok(())
        } else {
            Err(GatewayError::ModelNotAvailable(model.to_string()))
        }
    }

    fn cached(&self, backend: &BackendId, now: DateTime<Utc>) -> Option<Vec<ModelId>> {
        let listings = self.listings.lock().unwrap_or_else(|e| e.into_inner());
        let (models, fetched_at) = listings.get(backend)?;
        let age = (now - *fetched_at).to_std().unwrap_or_default();
        (age <= self.ttl).then(|| models.clone())
    }
}

fn same_model(installed: &ModelId, wanted: &ModelId) -> bool {
    let installed = installed.as_str();
    let wanted = wanted.as_str();
    installed == wanted
        || (!wanted.contains(':')
            && installed.strip_prefix(wanted).and_then(|rest| rest.strip_prefix(':'))
                == Some(DEFAULT_TAG))
}
