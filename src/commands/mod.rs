pub mod create;
pub mod delete;
pub mod export;
pub mod image;
pub mod import;
pub mod list;
pub mod paths;
pub mod start;
pub mod status;
pub mod stop;
