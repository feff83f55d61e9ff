//! Domain layer - core rules and types.
//!
//! This layer contains pure models, validation rules and error types
//! without any external dependencies (processes, filesystem, terminal).

pub mod config;
pub mod error;
pub mod mount;
pub mod request;
pub mod unit;
pub mod validate;

pub use config::AppConfig;
pub use error::{AppError, Result};
pub use mount::{MountQuery, MountStatus, MountTable};
pub use request::MountRequest;
pub use unit::{service_name_for, unit_file_name, ServiceUnitSpec};
