pub mod environment;
pub mod errors;
pub mod id;
pub mod types;

pub use environment::{EnvironmentProbe, Viewport};
pub use errors::{BridgeError, ConfigError, SimplePayError};
pub use id::{new_correlation_id, SessionId};
pub use types::{HostFamily, LayoutMode, ModalState};
