mod admin;
mod files;
mod static_files;

pub use admin::health;
pub use files::{delete_file, list_files, upload_file};
pub use static_files::serve_static;
