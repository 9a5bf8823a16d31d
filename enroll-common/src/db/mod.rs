//! Database schema and enrollment persistence

pub mod enrollment;
pub mod init;

pub use enrollment::*;
pub use init::*;
