//! Discord command implementations organized by category.

#![allow(clippy::too_long_first_doc_paragraph)]

/// General utility commands
pub mod general;

/// Mapping management commands
pub mod mapping;

/// Premium and payment commands
pub mod premium;

/// Helpers shared by the commands
pub mod utils;

// Export commands
pub use general::*;
pub use mapping::*;
pub use premium::*;
