pub mod account_handlers;
pub mod app;
pub mod auth_handlers;
pub mod authz;
pub mod config;
pub mod management_handlers;
pub mod metrics;
pub mod models;
pub mod password;
pub mod tool_handlers;
pub mod upgrade;

pub use app::AppState;
