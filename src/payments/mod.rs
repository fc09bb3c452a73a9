//! Payment gateway adapter: customers, bank sources and charges.

use crate::state::AppState;
use axum::Router;

pub mod client;
mod dto;
pub mod handlers;
pub mod services;
pub mod types;

pub use client::{PaymentError, PaymentGateway, StripeGateway};

pub fn router() -> Router<AppState> {
    handlers::payment_routes()
}
