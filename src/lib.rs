//! Taste twin: user-based, item-based and content-based movie recommendations
//! over a MovieLens-style ratings dataset.

pub mod api;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod services;
