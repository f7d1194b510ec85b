//! Traits that define the seams between MirrorFS crates.

pub mod remote;
