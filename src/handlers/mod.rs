pub mod coffee_types;
pub mod common;
pub mod dashboard;
pub mod health;
pub mod inventory;
pub mod orders;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;
