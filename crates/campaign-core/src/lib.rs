pub mod campaign;
pub mod config;
pub mod error;
pub mod io;
pub mod milestone;
pub mod mutate;
pub mod note;
pub mod paths;
pub mod record;
pub mod resolve;
pub mod store;
pub mod vault;

pub use error::{CampaignError, Result};
