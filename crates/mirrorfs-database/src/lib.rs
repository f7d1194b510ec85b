//! # mirrorfs-database
//!
//! PostgreSQL layer for MirrorFS: connection pool management, migrations,
//! and the repositories implementing the metadata mirror.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
