pub mod api;
pub mod config;
pub mod error;
pub mod geo;
pub mod geocode;
pub mod matcher;
pub mod models;
pub mod observability;
pub mod state;
