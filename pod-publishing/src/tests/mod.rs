pub mod collector;
pub mod common;
pub mod retry;
