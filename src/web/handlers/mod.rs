pub mod apps;
pub mod auth;
pub mod debug;
pub mod files;
pub mod logs;
pub mod metadata;
pub mod proxy;
pub mod shares;
