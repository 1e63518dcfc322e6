pub mod config;
pub mod error;
pub mod keys;
pub mod openrouter;
pub mod registration;
pub mod web;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
