pub mod api;
pub mod auth;
pub mod backup;
pub mod cli;
pub mod config;
pub mod db;
pub mod dispatch;
pub mod errors;
pub mod models;
pub mod pipeline;
pub mod reporting;
pub mod utils;
