pub mod calculations;
pub mod db;
pub mod drafts;
pub mod form;
pub mod models;
pub mod preferences;

pub use db::repository::{BookingRepository, RepositoryError};
pub use models::*;
