pub mod audits;
pub mod auth;
pub mod health;
pub mod products;
