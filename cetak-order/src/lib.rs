pub mod billing;
pub mod events;
pub mod ledger;
pub mod lifecycle;
pub mod manager;
pub mod models;
pub mod nota;
pub mod repository;

pub use billing::BillingCalculator;
pub use ledger::{PaymentLedger, RevenueBySource};
pub use lifecycle::{FulfillmentEvent, OrderLifecycle};
pub use manager::{NewOrder, NewOrderItem, OrderManager, OrderUpdate};
pub use models::{
    FulfillmentStatus, NotaSetting, Order, OrderItem, Payment, PaymentStatus, ProductionStatus,
};
pub use nota::NotaSequencer;
pub use repository::{NotaCounter, OrderRepository};
