use bazaar_application::AuditQueryService;

use crate::catalog::{CatalogService, LoginService};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub audit_backend: &'static str,
    pub audit_query_service: AuditQueryService,
    pub catalog_service: CatalogService,
    pub login_service: LoginService,
}
