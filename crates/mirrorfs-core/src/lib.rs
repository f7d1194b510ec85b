//! # mirrorfs-core
//!
//! Core crate for MirrorFS. Contains the path-resolution rules, the remote
//! store trait and its wire types, configuration schemas, the uniform
//! response envelope, and the unified error system.
//!
//! This crate has **no** internal dependencies on other MirrorFS crates.

pub mod config;
pub mod error;
pub mod path;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
