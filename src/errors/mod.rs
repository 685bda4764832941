//! Error taxonomy and result envelope for the Playforge client.

mod error;

pub use error::{ApiError, ApiResult, ConfigError, ErrorKind};
