//! CLI command implementations.

mod config;
mod doctor;
mod generate;
mod serve;

pub use config::run_config;
pub use doctor::run_doctor;
pub use generate::run_generate;
pub use serve::{create_router, run_serve, AppState};
