mod config;
mod matcher;
mod store;

pub use config::*;
pub use store::*;
