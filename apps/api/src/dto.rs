mod audits;
mod catalog;
mod common;

pub use audits::{AuditRecordResponse, AuditSearchParams};
pub use catalog::{LoginRequest, LoginResponse, ProductRequest, ProductResponse};
pub use common::HealthResponse;
