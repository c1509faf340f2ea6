//! Storefront Payment Engine
//!
//! Core logic for the storefront's order-payment integrity subsystem. This library contains the
//! persistent order store, the input validation rules for incoming orders, and the cryptographic
//! verification of payment-gateway notifications. It is HTTP-framework agnostic.
//!
//! The library is divided into two main sections:
//! 1. Database management ([`mod@db`]). SQLite is the supported backend. You should never need to
//!    access the database directly; use the public API instead. The exception is the data types,
//!    which are defined in the `db_types` module and are public.
//! 2. The public API ([`OrderFlowApi`]). This drives the order lifecycle: intake of validated
//!    orders, binding of gateway order handles, idempotent payment confirmation, and expiry of
//!    stale pending orders. Backends implement the traits in [`mod@db`] to plug in.
mod db;

pub mod db_types;
pub mod helpers;
mod sfe_api;

#[cfg(feature = "sqlite")]
pub use db::sqlite::SqliteDatabase;
pub use db::traits::PaymentGatewayDatabase;
pub use sfe_api::{errors::OrderFlowError, order_flow_api::OrderFlowApi};
