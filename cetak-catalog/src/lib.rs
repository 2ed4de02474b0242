pub mod customer;
pub mod finishing;
pub mod material;
pub mod pricing;
pub mod repository;

pub use customer::{Customer, Tier};
pub use finishing::Finishing;
pub use material::Material;
pub use pricing::PriceBook;
pub use repository::CatalogRepository;
