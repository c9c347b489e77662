pub mod error;
pub mod scope;
pub mod types;
pub mod warning;

pub use error::BgError;
pub use scope::*;
pub use types::*;
pub use warning::*;
