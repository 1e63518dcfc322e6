pub mod bulk;
pub mod naming;
pub mod service;
pub mod types;

pub use bulk::{for_each_key, BatchFailure, BatchReport};
pub use naming::{key_label, key_name, KEY_NAME_PREFIX};
pub use service::KeyService;
pub use types::{CreateKeyRequest, CreatedKey, ProvisionedKey};
