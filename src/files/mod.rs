pub mod content_type;
pub mod listing;
pub mod path;
pub mod upload;

pub use content_type::content_type_for;
pub use listing::{directory_listing, DirectoryEntry};
pub use path::resolve_within_share;
pub use upload::{save_upload, UploadOutcome};
