pub mod models;
pub mod services;
pub mod state;
pub mod utils;

pub use models::*;
pub use state::AppState;
