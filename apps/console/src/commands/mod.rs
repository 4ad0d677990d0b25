//! # Commands
//!
//! The operations the storefront and the admin console call. Each returns
//! `Result<T, ApiError>`; callers wrap it in [`crate::error::Outcome`].
//!
//! ## Command Categories
//! - [`quote`]: catering quotes
//! - [`order`]: checkout, admin status and payment changes
//! - [`subscription`]: signup, pause/resume/cancel, payments, due lists
//! - [`account`]: signup, login, admin accounts

pub mod account;
pub mod order;
pub mod quote;
pub mod subscription;
