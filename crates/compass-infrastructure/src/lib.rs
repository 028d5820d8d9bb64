pub mod config_service;
pub mod paths;
pub mod upload_loader;

pub use config_service::{ConfigService, env_api_key};
pub use paths::CompassPaths;
pub use upload_loader::{load_upload, load_uploads};
