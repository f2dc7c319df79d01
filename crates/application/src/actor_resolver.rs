use bazaar_core::{AppResult, UserIdentity};
use bazaar_domain::ANONYMOUS_ACTOR;
use tracing::debug;

/// Port onto the security context of the current call.
pub trait ActorResolver: Send + Sync {
    /// Returns the principal bound to the current call, if any.
    fn current_principal(&self) -> AppResult<Option<UserIdentity>>;
}

/// Resolves the actor login for the current call.
///
/// Never fails: a missing principal and a resolver error both yield
/// `ANONYMOUS_ACTOR`.
pub fn resolve_actor(resolver: &dyn ActorResolver) -> String {
    match resolver.current_principal() {
        Ok(Some(identity)) => identity.login().to_owned(),
        Ok(None) => ANONYMOUS_ACTOR.to_owned(),
        Err(error) => {
            debug!(error = %error, "actor resolution failed, recording anonymous actor");
            ANONYMOUS_ACTOR.to_owned()
        }
    }
}

/// Resolver that always reports the same principal.
#[derive(Debug, Clone, Default)]
pub struct FixedActorResolver {
    principal: Option<UserIdentity>,
}

impl FixedActorResolver {
    /// Creates a resolver bound to one principal.
    #[must_use]
    pub fn new(principal: UserIdentity) -> Self {
        Self {
            principal: Some(principal),
        }
    }

    /// Creates a resolver with no bound principal.
    #[must_use]
    pub fn anonymous() -> Self {
        Self { principal: None }
    }
}

impl ActorResolver for FixedActorResolver {
    fn current_principal(&self) -> AppResult<Option<UserIdentity>> {
        Ok(self.principal.clone())
    }
}

#[cfg(test)]
mod tests {
    use bazaar_core::{AppError, AppResult, UserIdentity};
    use bazaar_domain::ANONYMOUS_ACTOR;

    use super::{ActorResolver, FixedActorResolver, resolve_actor};

    struct BrokenResolver;

    impl ActorResolver for BrokenResolver {
        fn current_principal(&self) -> AppResult<Option<UserIdentity>> {
            Err(AppError::Internal("security context poisoned".to_owned()))
        }
    }

    #[test]
    fn bound_principal_resolves_to_login() {
        let resolver = FixedActorResolver::new(UserIdentity::from_email("admin@admin.ru"));
        assert_eq!(resolve_actor(&resolver), "admin@admin.ru");
    }

    #[test]
    fn missing_principal_resolves_to_anonymous() {
        assert_eq!(resolve_actor(&FixedActorResolver::anonymous()), ANONYMOUS_ACTOR);
    }

    #[test]
    fn resolver_error_resolves_to_anonymous() {
        assert_eq!(resolve_actor(&BrokenResolver), ANONYMOUS_ACTOR);
    }
}
