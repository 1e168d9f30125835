pub mod etag;
pub mod logs;
pub mod pid_file;

pub use etag::{etag_for_bytes, etag_for_file};
