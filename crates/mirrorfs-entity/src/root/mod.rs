//! Root (top-level namespace) entity.

mod model;

pub use model::Root;
