pub mod clean;
pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod flatten;
pub mod pipeline;
pub mod project;
pub mod query;
pub mod reader;
