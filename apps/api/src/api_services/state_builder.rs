use std::sync::Arc;

use bazaar_application::{
    AuditInterceptor, AuditQueryService, MonotonicAuditClock, OperationDispatcher,
    PerformanceInterceptor,
};
use bazaar_core::AppError;
use bazaar_infrastructure::TaskLocalActorResolver;

use crate::api_config::ApiConfig;
use crate::catalog::{CatalogService, LoginService, operation_registry};
use crate::state::AppState;

use super::AuditBackend;

pub fn build_app_state(backend: &AuditBackend, config: &ApiConfig) -> Result<AppState, AppError> {
    let gateway = backend.gateway();

    let audit_interceptor = AuditInterceptor::new(
        gateway.clone(),
        Arc::new(TaskLocalActorResolver::new()),
        Arc::new(MonotonicAuditClock::new()),
    )
    .with_write_timeout(config.audit_write_timeout);
    let performance_interceptor =
        PerformanceInterceptor::new().with_slow_threshold(config.performance_slow_threshold);
    let dispatcher = OperationDispatcher::new(
        operation_registry()?,
        audit_interceptor,
        performance_interceptor,
    );

    Ok(AppState {
        audit_backend: backend.name(),
        audit_query_service: AuditQueryService::new(gateway),
        catalog_service: CatalogService::new(&dispatcher)?,
        login_service: LoginService::new(
            &dispatcher,
            config.admin_email.clone(),
            config.admin_password.clone(),
        )?,
    })
}
