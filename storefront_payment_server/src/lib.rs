//! # Storefront payment server
//! This crate hosts the HTTP surface of the order-payment subsystem. It is responsible for:
//! * Accepting new order submissions from the storefront and persisting them via the engine.
//! * Initiating payment-gateway orders on behalf of clients.
//! * Receiving payment notifications (gateway redirect callbacks and direct client
//!   confirmations), handing them to the engine for verification, and shaping the responses.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more
//! information.
//!
//! ## Routes
//! * `/health`: A health check route that returns a 200 OK response.
//! * `/create-order`: Order intake.
//! * `/create-razorpay-order`: Gateway order initiation.
//! * `/razorpay-callback`: Gateway redirect callback (form-encoded, always answers with a 302).
//! * `/verify-razorpay-payment`: Direct client payment confirmation.

pub mod config;
pub mod data_objects;
pub mod errors;
pub mod expiry_worker;
pub mod routes;
pub mod server;

#[cfg(test)]
mod endpoint_tests;
