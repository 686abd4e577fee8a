pub mod calendar;
pub mod catalog;
pub mod commands;
pub mod config;
pub mod context;
pub mod errors;
pub mod history;
pub mod http_client;
pub mod llm;
pub mod models;
pub mod output;
pub mod performance;
pub mod quotes;
pub mod snapshot;
pub mod summary;
pub mod yahoo;
