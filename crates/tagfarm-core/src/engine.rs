use crate::catalog::{Catalog, Category, Scene};
use crate::config::{AppConfig, SelectionConfig};
use crate::error::Error;
use crate::linkfarm::{LinkFarm, PlacementReport, RemovalReport, Tally};
use crate::progress::ProgressReporter;
use std::path::PathBuf;
use tracing::{debug, info, warn};

pub struct TagFarm {
    config: AppConfig,
}

#[derive(Debug)]
pub struct BuildSummary {
    pub dry_run: bool,
    pub categories: Vec<CategorySummary>,
}

#[derive(Debug)]
pub struct CategorySummary {
    pub category: Category,
    pub items: Vec<PlacementReport>,
    /// Manually configured names the catalog does not know.
    pub not_found: Vec<String>,
}

#[derive(Debug)]
pub struct CleanSummary {
    pub dry_run: bool,
    pub dangling: Vec<PathBuf>,
    pub removal: RemovalReport,
}

/// An item selected for the farm: directory name plus catalog id.
struct Selected {
    name: String,
    id: String,
}

impl BuildSummary {
    pub fn category(&self, category: Category) -> Option<&CategorySummary> {
        self.categories.iter().find(|c| c.category == category)
    }

    pub fn tally(&self) -> Tally {
        let mut total = Tally::default();
        for category in &self.categories {
            total.merge(&category.tally());
        }
        total
    }
}

impl CategorySummary {
    pub fn tally(&self) -> Tally {
        let mut total = Tally::default();
        for item in &self.items {
            total.merge(&item.tally());
        }
        total
    }
}

impl TagFarm {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Pull the configured tags and performers from `catalog` and link their
    /// scenes into the farm.
    ///
    /// Only catalog and farm-root failures abort the build; everything that
    /// goes wrong with an individual link ends up in the summary.
    pub fn build(
        &self,
        catalog: &dyn Catalog,
        dry_run: bool,
        reporter: &dyn ProgressReporter,
    ) -> Result<BuildSummary, Error> {
        let farm = LinkFarm::new(&self.config.farm_path, self.config.use_title, dry_run)?;
        info!(
            "Building linkfarm at {}{}",
            farm.root().display(),
            if dry_run { " (dry run)" } else { "" }
        );

        let mut categories = Vec::new();
        for category in Category::ALL {
            let Some(selection) = self.config.selection(category) else {
                debug!("No {} selection configured", category);
                continue;
            };
            categories.push(self.build_category(catalog, &farm, category, selection, reporter)?);
        }

        Ok(BuildSummary {
            dry_run,
            categories,
        })
    }

    fn build_category(
        &self,
        catalog: &dyn Catalog,
        farm: &LinkFarm,
        category: Category,
        selection: &SelectionConfig,
        reporter: &dyn ProgressReporter,
    ) -> Result<CategorySummary, Error> {
        info!("Processing {}s...", category);
        let (selected, not_found) = select_items(catalog, category, selection)?;

        reporter.on_category_start(category, selected.len());
        for name in &not_found {
            reporter.on_item_not_found(category, name);
        }

        let mut items = Vec::with_capacity(selected.len());
        for item in selected {
            reporter.on_item_start(category, &item.name);
            let scenes = self.localize(catalog.list_scenes(category, &item.id)?);
            let report = farm.place_links(category, &item.name, &scenes);
            reporter.on_item_complete(&report);
            items.push(report);
        }
        reporter.on_category_complete(category);

        Ok(CategorySummary {
            category,
            items,
            not_found,
        })
    }

    /// Rewrite scene file paths through the configured `path_map`.
    fn localize(&self, mut scenes: Vec<Scene>) -> Vec<Scene> {
        if self.config.path_map.is_empty() {
            return scenes;
        }
        for file in scenes.iter_mut().flat_map(|scene| scene.files.iter_mut()) {
            file.path = self.config.map_path(&file.path);
        }
        scenes
    }

    /// Find and remove links below the farm root whose targets are gone.
    pub fn clean(&self, dry_run: bool, reporter: &dyn ProgressReporter) -> Result<CleanSummary, Error> {
        let farm = LinkFarm::new(&self.config.farm_path, self.config.use_title, dry_run)?;
        info!("Cleaning linkfarm at {}", farm.root().display());

        reporter.on_scan_start();
        let dangling = farm.find_dangling_links();
        reporter.on_scan_complete(dangling.len());
        info!("Found {} dangling links", dangling.len());

        let removal = farm.remove_dangling_links(&dangling);
        reporter.on_removal_complete(&removal);

        Ok(CleanSummary {
            dry_run,
            dangling,
            removal,
        })
    }
}

/// Favourites first, under their catalog names, then the manual names in
/// configured order. Returns the selection and the names that were not found.
fn select_items(
    catalog: &dyn Catalog,
    category: Category,
    selection: &SelectionConfig,
) -> Result<(Vec<Selected>, Vec<String>), Error> {
    let mut selected = Vec::new();
    let mut not_found = Vec::new();

    if selection.favourite {
        for item in catalog.list_favourites(category)? {
            selected.push(Selected {
                name: item.name,
                id: item.id,
            });
        }
    }

    for name in selection.names.iter().flatten() {
        match catalog.find_by_name(category, name)? {
            Some(item) => selected.push(Selected {
                name: name.clone(),
                id: item.id,
            }),
            None => {
                warn!("{} '{}' not found", category, name);
                not_found.push(name.clone());
            }
        }
    }

    Ok((selected, not_found))
}
