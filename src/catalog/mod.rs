pub mod apps;
pub mod shares;

pub use apps::AppCatalog;
pub use shares::ShareCatalog;
