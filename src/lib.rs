pub mod assets;
pub mod config;
pub mod database;
pub mod errors;
pub mod export;
pub mod ingestor;
pub mod models;
pub mod repositories;
pub mod services;
pub mod utils;
