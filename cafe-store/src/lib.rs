pub mod app_config;
pub mod sequence;
pub mod file_repo;
pub mod local_repo;
pub mod upi;
pub mod http_client;

pub use sequence::OrderNumberAllocator;
pub use file_repo::JsonFileOrderStore;
pub use local_repo::LocalOrderStore;
pub use upi::{UpiPayee, UpiQrGenerator};
pub use http_client::HttpOrderGateway;
