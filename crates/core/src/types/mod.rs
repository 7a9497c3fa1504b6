//! Core types for Tienda.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod customer;
pub mod id;
pub mod order;
pub mod product;

pub use customer::{Customer, CustomerError, Dni, Email, EmailError};
pub use id::*;
pub use order::{ORDER_TOKEN_PREFIX, Order, OrderLine, Sale};
pub use product::{
    Category, MediaAsset, Product, SizeVariant, normalize_category_label, normalize_size_code,
};
