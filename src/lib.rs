pub mod config;
pub mod db;
pub mod http;
pub mod service;
pub mod user;

pub use config::Config;
pub use db::Database;
pub use service::UserService;
