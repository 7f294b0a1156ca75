pub mod cli;
pub mod loader;
pub mod schema;
pub mod units;

pub use cli::Cli;
pub use loader::ConfigLoader;
pub use schema::{FetchConfig, Settings};
