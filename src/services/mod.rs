pub mod fact_service;
pub mod game_service;
pub mod roster_service;
