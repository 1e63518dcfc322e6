pub mod client;

pub use client::{OpenRouterClient, PAGE_SIZE};
