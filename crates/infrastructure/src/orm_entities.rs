//! SeaORM entities for the ORM-managed audit backend.

pub(crate) mod audit_entry;
pub(crate) mod audit_user;
