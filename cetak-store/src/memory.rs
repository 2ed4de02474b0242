use async_trait::async_trait;
use cetak_catalog::{CatalogRepository, Customer, Finishing, Material};
use cetak_order::models::NotaSetting;
use cetak_order::repository::{NotaCounter, OrderRepository};
use cetak_order::Order;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Order not found: {0}")]
    NotFound(Uuid),

    #[error("Concurrent modification of order {id}: expected version {expected}, got {actual}")]
    VersionConflict { id: Uuid, expected: u64, actual: u64 },

    #[error("Nota start number '{0}' is not numeric")]
    BadStartNumber(String),
}

/// In-memory stand-in for the hosted customer/material/finishing catalogs.
#[derive(Default)]
pub struct MemoryCatalog {
    inner: RwLock<CatalogData>,
}

#[derive(Default)]
struct CatalogData {
    customers: HashMap<Uuid, Customer>,
    materials: HashMap<Uuid, Material>,
    finishings: HashMap<Uuid, Finishing>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn upsert_customer(&self, customer: Customer) {
        self.inner.write().await.customers.insert(customer.id, customer);
    }

    pub async fn upsert_material(&self, material: Material) {
        self.inner.write().await.materials.insert(material.id, material);
    }

    pub async fn upsert_finishing(&self, finishing: Finishing) {
        self.inner.write().await.finishings.insert(finishing.id, finishing);
    }
}

#[async_trait]
impl CatalogRepository for MemoryCatalog {
    async fn customer(&self, id: Uuid) -> Result<Option<Customer>, BoxError> {
        Ok(self.inner.read().await.customers.get(&id).cloned())
    }

    async fn material(&self, id: Uuid) -> Result<Option<Material>, BoxError> {
        Ok(self.inner.read().await.materials.get(&id).cloned())
    }

    async fn finishing(&self, id: Uuid) -> Result<Option<Finishing>, BoxError> {
        Ok(self.inner.read().await.finishings.get(&id).cloned())
    }
}

/// In-memory order store. The optimistic version check on `save` is the
/// per-order serialization boundary a production backend would get from a
/// transaction scoped to the order and its items/payments.
#[derive(Default)]
pub struct MemoryOrderStore {
    orders: RwLock<HashMap<Uuid, Order>>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderRepository for MemoryOrderStore {
    async fn save(&self, order: &Order) -> Result<(), BoxError> {
        let mut orders = self.orders.write().await;
        if let Some(stored) = orders.get(&order.id) {
            if stored.version != order.version {
                return Err(Box::new(StoreError::VersionConflict {
                    id: order.id,
                    expected: stored.version,
                    actual: order.version,
                }));
            }
        }
        let mut saved = order.clone();
        saved.version = order.version + 1;
        orders.insert(saved.id, saved);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Order>, BoxError> {
        Ok(self.orders.read().await.get(&id).cloned())
    }

    async fn delete(&self, id: Uuid) -> Result<(), BoxError> {
        let mut orders = self.orders.write().await;
        orders
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| Box::new(StoreError::NotFound(id)) as BoxError)
    }

    async fn list(&self, customer_id: Option<Uuid>) -> Result<Vec<Order>, BoxError> {
        let orders = self.orders.read().await;
        let mut result: Vec<Order> = orders
            .values()
            .filter(|o| customer_id.is_none_or(|c| o.customer_id == c))
            .cloned()
            .collect();
        result.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(result)
    }
}

/// In-memory invoice counter: a single atomically incremented value, the
/// shape a database sequence takes in production.
pub struct MemoryNotaCounter {
    last: AtomicI64,
    setting: RwLock<NotaSetting>,
}

impl MemoryNotaCounter {
    pub fn new(prefix: &str, start_number: &str) -> Result<Self, StoreError> {
        let setting = NotaSetting {
            prefix: prefix.to_string(),
            start_number: start_number.to_string(),
        };
        let first = setting
            .start_value()
            .ok_or_else(|| StoreError::BadStartNumber(start_number.to_string()))?;
        Ok(Self {
            last: AtomicI64::new(first - 1),
            setting: RwLock::new(setting),
        })
    }

    pub fn from_config(nota: &crate::app_config::NotaConfig) -> Result<Self, StoreError> {
        Self::new(&nota.prefix, &nota.start_number)
    }
}

#[async_trait]
impl NotaCounter for MemoryNotaCounter {
    async fn setting(&self) -> Result<NotaSetting, BoxError> {
        Ok(self.setting.read().await.clone())
    }

    async fn next_value(&self) -> Result<i64, BoxError> {
        Ok(self.last.fetch_add(1, Ordering::SeqCst) + 1)
    }

    async fn update_setting(
        &self,
        setting: NotaSetting,
        reset_to: Option<i64>,
    ) -> Result<(), BoxError> {
        let mut stored = self.setting.write().await;
        *stored = setting;
        if let Some(value) = reset_to {
            self.last.store(value - 1, Ordering::SeqCst);
        }
        Ok(())
    }
}
