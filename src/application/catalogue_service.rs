// Catalogue service - Use case for listing sensors and locations
use crate::application::sources::{resolve_identities, CatalogueSource, Location};
use crate::domain::identity::SensorIdentity;
use std::sync::Arc;

#[derive(Clone)]
pub struct CatalogueService {
    catalogue: Arc<dyn CatalogueSource>,
}

impl CatalogueService {
    pub fn new(catalogue: Arc<dyn CatalogueSource>) -> Self {
        Self { catalogue }
    }

    /// All catalogue sensors as canonical identities, locations joined
    /// in.
    pub async fn list_identities(&self) -> anyhow::Result<Vec<SensorIdentity>> {
        let sensors = self.catalogue.sensors().await?;
        let locations = self.catalogue.locations().await?;
        Ok(resolve_identities(&sensors, &locations))
    }

    pub async fn list_locations(&self) -> anyhow::Result<Vec<Location>> {
        self.catalogue.locations().await
    }
}
