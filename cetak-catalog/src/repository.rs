use crate::{Customer, Finishing, Material};
use async_trait::async_trait;
use uuid::Uuid;

/// Read access to the customer and material/finishing catalogs. The
/// catalogs are owned elsewhere; the engine only resolves references.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn customer(
        &self,
        id: Uuid,
    ) -> Result<Option<Customer>, Box<dyn std::error::Error + Send + Sync>>;

    async fn material(
        &self,
        id: Uuid,
    ) -> Result<Option<Material>, Box<dyn std::error::Error + Send + Sync>>;

    async fn finishing(
        &self,
        id: Uuid,
    ) -> Result<Option<Finishing>, Box<dyn std::error::Error + Send + Sync>>;
}
