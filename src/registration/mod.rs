pub mod store;

pub use store::{ConfigProvider, FileConfigProvider, MemoryConfigProvider, RegistrationConfig};
