pub mod api;
pub mod config;
pub mod data_models;
pub mod error;
pub mod ranking;
pub mod render;
pub mod search_client;
pub mod session;
