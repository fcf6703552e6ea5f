pub mod error;
pub mod models;
pub mod notify;
pub mod storage;
pub mod validation;

pub use error::{Error, Result};
