pub mod database;
pub mod memory;
pub mod metrics;
pub mod store;

pub use database::MongoCoffeeStore;
pub use memory::InMemoryCoffeeStore;
pub use metrics::{get_metrics, init_metrics, record_operation};
pub use store::CoffeeStore;
