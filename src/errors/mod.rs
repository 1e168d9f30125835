mod types;

pub use types::{AppError, FileServiceError, RelayError, RepositoryError};
