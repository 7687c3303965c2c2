//! Core business logic - framework-agnostic account, catalog, cart, and
//! invoice operations. Every guarded operation takes the caller's
//! [`crate::auth::AuthContext`] and evaluates its capability gate before the
//! operation body runs.

/// User administration and self-service profile operations
pub mod account;
/// Cart operations, scoped to the authenticated caller
pub mod cart;
/// Product management and public catalog discovery
pub mod catalog;
/// Category management
pub mod category;
/// Checkout workflow and invoice administration
pub mod invoice;
