//! Asset entity: real mirrored objects and virtual-folder marker rows.

mod model;
mod status;
mod upload;

pub use model::{Asset, AssetRename};
pub use status::UploadStatus;
pub use upload::{AssetUpload, UpsertOutcome};
