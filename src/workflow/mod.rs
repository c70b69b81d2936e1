pub mod provision;
pub mod pull_request;
pub mod types;
