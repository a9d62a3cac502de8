pub mod types;
pub mod config;
pub mod fetcher;
pub mod parser;
pub mod store;
pub mod traits;
pub mod sources;
pub mod stats;
pub mod history;
pub mod pipeline;
pub mod utils;

pub use types::*;
pub use config::PulseConfig;
pub use fetcher::Fetcher;
pub use store::SnapshotStore;
pub use traits::{SnapshotDoc, SourceAdapter};
pub use history::History;
pub use pipeline::{Pipeline, RunReport};
