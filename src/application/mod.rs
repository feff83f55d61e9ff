//! Application layer - use cases and orchestration.
//!
//! Contains request resolution, the mount flow, the periodic automount
//! loop and the systemd service use cases.

pub mod automount;
pub mod mounter;
pub mod request;
pub mod service;

pub use automount::{cancel_on_signal, shutdown_channel, PeriodicTask};
pub use mounter::{MountOutcome, Mounter};
pub use request::{resolve_request, RequestInput};
pub use service::{install_service, remove_service, service_status, unit_spec};
