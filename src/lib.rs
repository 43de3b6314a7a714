pub mod client;
pub mod config;
pub mod console;
pub mod error;
pub mod models;
pub mod services;
pub mod state;
