pub mod config;
pub mod error;
pub mod io;
pub mod manager;
pub mod model;
pub mod remote;
pub mod sync;

pub use error::{Result, SyncError};
