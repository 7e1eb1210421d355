//! Tree-walking executor for validated kite programs.

pub mod environment;
pub mod error;
pub mod executor;

pub use error::{RuntimeError, RuntimeResult};
pub use executor::Executor;
