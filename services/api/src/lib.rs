//! services/api/src/lib.rs
//!
//! The HTTP service around `lumiere_core`: configuration, the Gemini
//! adapter, the product catalog, upload handling and the Axum web layer.

pub mod adapters;
pub mod catalog;
pub mod config;
pub mod error;
pub mod imaging;
pub mod web;
