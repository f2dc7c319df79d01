use std::future::Future;

use bazaar_application::ActorResolver;
use bazaar_core::{AppResult, UserIdentity};

tokio::task_local! {
    static CURRENT_PRINCIPAL: UserIdentity;
}

/// Runs `future` with `principal` bound as the current security context.
pub async fn with_principal<F>(principal: UserIdentity, future: F) -> F::Output
where
    F: Future,
{
    CURRENT_PRINCIPAL.scope(principal, future).await
}

/// Resolves the principal bound by `with_principal` on the current task.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskLocalActorResolver;

impl TaskLocalActorResolver {
    /// Creates a resolver.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl ActorResolver for TaskLocalActorResolver {
    fn current_principal(&self) -> AppResult<Option<UserIdentity>> {
        Ok(CURRENT_PRINCIPAL.try_with(UserIdentity::clone).ok())
    }
}
