mod api;
mod config;
mod error;

mod data_objects;

pub use api::RazorpayApi;
pub use config::RazorpayConfig;
pub use data_objects::{RazorpayOrder, RazorpayOrderRequest};
pub use error::RazorpayApiError;
