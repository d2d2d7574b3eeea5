//! Catalog records and the interface the build loop pulls them through.
//!
//! The engine never sees the wire format: a [`Catalog`] turns whatever the
//! remote service returns into [`CatalogItem`]s and [`Scene`]s.

pub mod stash;

use crate::error::Error;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

pub use stash::StashClient;

/// Top-level grouping of the farm. Each category gets its own subdirectory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Tag,
    Performer,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Tag, Category::Performer];

    /// Name of the directory directly below the farm root.
    pub fn dir_name(self) -> &'static str {
        match self {
            Category::Tag => "tags",
            Category::Performer => "performers",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Tag => write!(f, "tag"),
            Category::Performer => write!(f, "performer"),
        }
    }
}

/// A tag or performer as known to the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CatalogItem {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SceneFile {
    pub path: PathBuf,
    pub basename: String,
}

/// A media item. Only the first file is ever linked.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub files: Vec<SceneFile>,
}

impl Scene {
    pub fn primary_file(&self) -> Option<&SceneFile> {
        self.files.first()
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.primary_file().map(|file| file.path.as_path())
    }
}

/// Read-only source of items and scenes.
///
/// Every method is fatal on failure: an unreachable or unauthenticated
/// catalog aborts the whole run.
pub trait Catalog {
    /// Items of `category` the user marked as favourite.
    fn list_favourites(&self, category: Category) -> Result<Vec<CatalogItem>, Error>;

    /// Exact-name lookup, `None` when the catalog has no such item.
    fn find_by_name(&self, category: Category, name: &str) -> Result<Option<CatalogItem>, Error>;

    /// Every scene associated with the item `id`.
    fn list_scenes(&self, category: Category, id: &str) -> Result<Vec<Scene>, Error>;
}
