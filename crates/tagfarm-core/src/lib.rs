pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod linkfarm;
pub mod platform;
pub mod progress;

pub use catalog::{Catalog, CatalogItem, Category, Scene, SceneFile};
pub use config::AppConfig;
pub use engine::{BuildSummary, CategorySummary, CleanSummary, TagFarm};
pub use error::Error;
pub use linkfarm::{LinkFarm, LinkOutcome, LinkRecord, PlacementReport, RemovalReport};
pub use progress::{ProgressReporter, SilentReporter};
