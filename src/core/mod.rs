//! Core translation engine module

pub mod config;
pub mod engine;
pub mod errors;
pub mod models;
pub mod registry;
