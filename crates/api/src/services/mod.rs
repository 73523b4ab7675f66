//! Business services.
//!
//! - [`auth`] - Registration, login, and the bearer-token auth gate
//! - [`checkout`] - The cart-to-order transition
//! - [`upload`] - Product image storage

pub mod auth;
pub mod checkout;
pub mod upload;
