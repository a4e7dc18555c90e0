pub mod api_connection;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod explanation;
pub mod footprint;
pub mod history_store;
pub mod schemas;
pub mod server;
pub mod supervisor;
