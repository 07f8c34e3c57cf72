pub mod manager;
pub mod utils;

pub use manager::GameManager;
