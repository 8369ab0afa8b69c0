pub mod db;
pub mod log;
pub mod models;
pub mod preferences;
pub mod reminders;
pub mod schema;

mod error;

pub use error::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;
