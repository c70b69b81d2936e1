pub mod config;
pub mod error;
pub mod labels;
pub mod platform;
pub mod server;
pub mod webhook;
pub mod workflow;
