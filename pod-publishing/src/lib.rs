pub mod cli;
pub mod collector;
pub mod core;
pub mod error;
pub mod metadata;
pub mod publish;
pub mod retry;
pub mod types;
pub mod utils;

#[cfg(test)]
pub mod tests;

// Re-export commonly used item
pub use error::{PublishError, PublishResult};
