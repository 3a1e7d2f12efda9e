pub mod coffees;
pub mod health;

pub use coffees::{create_coffee, delete_coffee, get_coffee, list_coffees, update_coffee};
pub use health::{health_check, index, metrics, readiness_check};
