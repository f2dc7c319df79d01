//! In-memory product catalog and login collaborators routed through the
//! operation registry, so every call is audited and timed by registration.

use std::collections::BTreeMap;
use std::sync::Arc;

use bazaar_application::{BoundOperation, OperationDispatcher, OperationRegistry};
use bazaar_core::{AppError, AppResult, NonEmptyString, UserIdentity};
use bazaar_domain::AuditAction;
use serde::Serialize;
use tokio::sync::Mutex;

pub const PRODUCT_SERVICE: &str = "products";
pub const AUTH_SERVICE: &str = "auth";

/// Registration table for every operation the API exposes.
pub fn operation_registry() -> AppResult<OperationRegistry> {
    OperationRegistry::builder()
        .audited(PRODUCT_SERVICE, "create", AuditAction::Create)
        .audited(PRODUCT_SERVICE, "read", AuditAction::Read)
        .audited(PRODUCT_SERVICE, "update", AuditAction::Update)
        .audited(PRODUCT_SERVICE, "delete", AuditAction::Delete)
        .timed_service(PRODUCT_SERVICE)
        .audited(AUTH_SERVICE, "login", AuditAction::Login)
        .timed(AUTH_SERVICE, "login")
        .build()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    pub id: u64,
    pub name: String,
    pub price_cents: i64,
}

#[derive(Debug)]
struct ProductDraft {
    name: NonEmptyString,
    price_cents: i64,
}

impl ProductDraft {
    fn new(name: String, price_cents: i64) -> AppResult<Self> {
        if price_cents < 0 {
            return Err(AppError::Validation(format!(
                "price_cents must not be negative, got {price_cents}"
            )));
        }

        Ok(Self {
            name: NonEmptyString::for_field("name", name)?,
            price_cents,
        })
    }
}

#[derive(Debug)]
struct ProductStore {
    next_id: u64,
    products: BTreeMap<u64, Product>,
}

impl Default for ProductStore {
    fn default() -> Self {
        Self {
            next_id: 1,
            products: BTreeMap::new(),
        }
    }
}

/// Product catalog whose operations are bound to their interceptors once.
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<Mutex<ProductStore>>,
    create_operation: BoundOperation,
    read_operation: BoundOperation,
    update_operation: BoundOperation,
    delete_operation: BoundOperation,
}

impl CatalogService {
    pub fn new(dispatcher: &OperationDispatcher) -> AppResult<Self> {
        Ok(Self {
            store: Arc::new(Mutex::new(ProductStore::default())),
            create_operation: dispatcher.bind(PRODUCT_SERVICE, "create")?,
            read_operation: dispatcher.bind(PRODUCT_SERVICE, "read")?,
            update_operation: dispatcher.bind(PRODUCT_SERVICE, "update")?,
            delete_operation: dispatcher.bind(PRODUCT_SERVICE, "delete")?,
        })
    }

    pub async fn create(&self, name: String, price_cents: i64) -> AppResult<Product> {
        let input_text = format!("name={name:?} price_cents={price_cents}");
        let store = &self.store;

        self.create_operation
            .invoke(input_text, move || async move {
                let draft = ProductDraft::new(name, price_cents)?;
                let mut store = store.lock().await;
                let id = store.next_id;
                store.next_id += 1;

                let product = Product {
                    id,
                    name: draft.name.into(),
                    price_cents: draft.price_cents,
                };
                store.products.insert(id, product.clone());
                Ok(product)
            })
            .await
    }

    pub async fn find(&self, id: u64) -> AppResult<Product> {
        let store = &self.store;

        self.read_operation
            .invoke(format!("id={id}"), move || async move {
                store
                    .lock()
                    .await
                    .products
                    .get(&id)
                    .cloned()
                    .ok_or_else(|| AppError::NotFound(format!("product {id}")))
            })
            .await
    }

    pub async fn update(&self, id: u64, name: String, price_cents: i64) -> AppResult<Product> {
        let input_text = format!("id={id} name={name:?} price_cents={price_cents}");
        let store = &self.store;

        self.update_operation
            .invoke(input_text, move || async move {
                let draft = ProductDraft::new(name, price_cents)?;
                let mut store = store.lock().await;
                let product = store
                    .products
                    .get_mut(&id)
                    .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

                product.name = draft.name.into();
                product.price_cents = draft.price_cents;
                Ok(product.clone())
            })
            .await
    }

    pub async fn delete(&self, id: u64) -> AppResult<Product> {
        let store = &self.store;

        self.delete_operation
            .invoke(format!("id={id}"), move || async move {
                store
                    .lock()
                    .await
                    .products
                    .remove(&id)
                    .ok_or_else(|| AppError::NotFound(format!("product {id}")))
            })
            .await
    }
}

/// Credential check standing in for the authentication subsystem.
#[derive(Clone)]
pub struct LoginService {
    admin_email: String,
    admin_password: Option<String>,
    login_operation: BoundOperation,
}

impl LoginService {
    pub fn new(
        dispatcher: &OperationDispatcher,
        admin_email: String,
        admin_password: Option<String>,
    ) -> AppResult<Self> {
        Ok(Self {
            admin_email,
            admin_password,
            login_operation: dispatcher.bind(AUTH_SERVICE, "login")?,
        })
    }

    pub async fn login(&self, email: String, password: String) -> AppResult<UserIdentity> {
        // Credentials never reach the audit trail.
        let input_text = format!("email={email}");

        self.login_operation
            .invoke_with(
                input_text,
                move || async move {
                    let accepted = self.admin_password.as_deref().is_some_and(|expected| {
                        expected == password && self.admin_email.eq_ignore_ascii_case(email.trim())
                    });

                    if accepted {
                        Ok(UserIdentity::from_email(self.admin_email.clone()))
                    } else {
                        Err(AppError::Unauthorized("invalid credentials".to_owned()))
                    }
                },
                |identity| format!("login={}", identity.login()),
            )
            .await
    }
}

#[cfg(test)]
mod tests;
