pub mod context;
pub mod credentials;
pub mod error;

// Re-export the core types to provide a clean public API.
pub use context::{CancelHandle, Context};
pub use credentials::Credentials;
pub use error::ContextError;
