mod audit_backend;
mod database;
mod state_builder;

pub use audit_backend::AuditBackend;
pub use database::connect_and_migrate;
pub use state_builder::build_app_state;
