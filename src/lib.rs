pub mod cli;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod filter;
pub mod github;
pub mod http;
pub mod orchestrator;
pub mod paginate;
pub mod prompt;
pub mod render;
pub mod token;
pub mod types;
