//! Symlink farm reconciliation.
//!
//! [`LinkFarm`] owns the directory tree below its root. It places one link per
//! scene under `<root>/<category>/<item>/`, resolving name collisions with a
//! numeric suffix, and sweeps the tree for links whose target has vanished.
//!
//! Every decision is made against the current filesystem state, so a run that
//! was interrupted can simply be repeated. In dry-run mode nothing under the
//! root is created, replaced or removed; outcomes are reported as
//! [`LinkOutcome::WouldLink`] / [`LinkOutcome::WouldRemove`] instead.

mod naming;
mod outcome;

pub use naming::{resolve_extension, resolve_link_name, sanitize_name, UNNAMED};
pub use outcome::{LinkOutcome, LinkRecord, PlacementReport, RemovalReport, Severity, Tally};

use crate::catalog::{Category, Scene};
use crate::platform;
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

pub struct LinkFarm {
    root: PathBuf,
    use_title: bool,
    dry_run: bool,
}

impl LinkFarm {
    /// Open the farm at `root`, creating it unless `dry_run` is set.
    pub fn new(root: impl Into<PathBuf>, use_title: bool, dry_run: bool) -> io::Result<Self> {
        let root = root.into();
        if !dry_run {
            fs::create_dir_all(&root)?;
        }
        Ok(Self {
            root,
            use_title,
            dry_run,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn resolve_link_name(&self, scene: &Scene) -> String {
        resolve_link_name(scene, self.use_title)
    }

    /// Directory holding the links of one item.
    pub fn item_dir(&self, category: Category, item_name: &str) -> PathBuf {
        self.root
            .join(category.dir_name())
            .join(sanitize_name(item_name))
    }

    /// Link every scene that has a file into the item's directory.
    ///
    /// Collisions are resolved per directory in scene order: the first scene
    /// keeps the plain name, later ones get `_1`, `_2`, ... before the
    /// extension. A path already linked to the same source is reused and
    /// does not consume a suffix.
    pub fn place_links(&self, category: Category, item_name: &str, scenes: &[Scene]) -> PlacementReport {
        let directory = self.item_dir(category, item_name);
        let mut report = PlacementReport {
            category,
            item_name: item_name.to_string(),
            directory: directory.clone(),
            created: 0,
            skipped: 0,
            records: Vec::with_capacity(scenes.len()),
        };

        if !self.dry_run {
            if let Err(e) = fs::create_dir_all(&directory) {
                error!("Error creating directory {}: {}", directory.display(), e);
                report.records.push(LinkRecord {
                    path: directory,
                    source: None,
                    outcome: LinkOutcome::Failed(e.to_string()),
                });
                return report;
            }
        }

        for scene in scenes {
            let Some(source) = scene.source_path() else {
                report.skipped += 1;
                continue;
            };

            let stem = self.resolve_link_name(scene);
            let extension = resolve_extension(scene);
            let target = self.free_link_path(&directory, &stem, &extension, source);

            let outcome = self.create_link(source, &target);
            if outcome.is_new_link() {
                report.created += 1;
            }
            report.records.push(LinkRecord {
                path: target,
                source: Some(source.to_path_buf()),
                outcome,
            });
        }

        if self.dry_run {
            let planned = report.tally().planned;
            info!("Would create {} links for {} '{}'", planned, category, item_name);
        } else {
            info!("Created {} links for {} '{}'", report.created, category, item_name);
        }
        report
    }

    /// First `stem[_N]extension` path in `directory` that is not a live link
    /// to some other source. Dry runs never probe and return the plain name.
    fn free_link_path(&self, directory: &Path, stem: &str, extension: &str, source: &Path) -> PathBuf {
        let mut candidate = directory.join(format!("{}{}", stem, extension));
        let mut counter = 1;
        while !self.dry_run && links_elsewhere(&candidate, source) {
            candidate = directory.join(format!("{}_{}{}", stem, counter, extension));
            counter += 1;
        }
        candidate
    }

    /// Make `target` a symlink to `source`.
    ///
    /// Existing links are replaced, but only ever links: a regular file or
    /// directory at `target` is reported as [`LinkOutcome::Occupied`] and left
    /// alone.
    pub fn create_link(&self, source: &Path, target: &Path) -> LinkOutcome {
        if !source.exists() {
            warn!("Source file does not exist: {}", source.display());
            return LinkOutcome::SourceMissing;
        }

        if self.dry_run {
            debug!("Would create: {} -> {}", target.display(), source.display());
            return LinkOutcome::WouldLink;
        }

        let outcome = match fs::symlink_metadata(target) {
            Ok(meta) if meta.file_type().is_symlink() => match fs::read_link(target) {
                Ok(existing) if existing == source => LinkOutcome::AlreadyCorrect,
                Ok(existing) => {
                    warn!("Overwriting existing link: {}", target.display());
                    match replace_link(source, target) {
                        Ok(()) => LinkOutcome::Overwritten { previous: existing },
                        Err(e) => LinkOutcome::Failed(e.to_string()),
                    }
                }
                Err(e) => LinkOutcome::Failed(e.to_string()),
            },
            Ok(_) => LinkOutcome::Occupied,
            Err(e) if e.kind() == io::ErrorKind::NotFound => match platform::symlink(source, target) {
                Ok(()) => LinkOutcome::Created,
                Err(e) => LinkOutcome::Failed(e.to_string()),
            },
            Err(e) => LinkOutcome::Failed(e.to_string()),
        };

        match &outcome {
            LinkOutcome::Occupied => {
                error!("Regular file exists at link location: {}", target.display())
            }
            LinkOutcome::Failed(msg) => {
                error!("Error creating symlink {}: {}", target.display(), msg)
            }
            other => debug!("{} -> {}: {}", target.display(), source.display(), other),
        }
        outcome
    }

    /// Every symlink below the root whose target does not exist, in
    /// depth-first order with siblings sorted by name.
    pub fn find_dangling_links(&self) -> Vec<PathBuf> {
        if !self.root.exists() {
            return Vec::new();
        }

        WalkDir::new(&self.root)
            .min_depth(1)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(err) => {
                    warn!("Skipping unreadable entry in {}: {}", self.root.display(), err);
                    None
                }
            })
            .filter(|entry| entry.path_is_symlink() && !entry.path().exists())
            .map(|entry| entry.into_path())
            .collect()
    }

    /// Unlink each path, continuing past failures. Paths that are not
    /// symlinks are refused rather than deleted.
    pub fn remove_dangling_links(&self, paths: &[PathBuf]) -> RemovalReport {
        let records = paths
            .iter()
            .map(|path| {
                let outcome = if self.dry_run {
                    debug!("Would remove: {}", path.display());
                    LinkOutcome::WouldRemove
                } else {
                    match remove_link(path) {
                        Ok(()) => {
                            info!("Removed: {}", path.display());
                            LinkOutcome::Removed
                        }
                        Err(e) => {
                            error!("Error removing {}: {}", path.display(), e);
                            LinkOutcome::Failed(e.to_string())
                        }
                    }
                };
                LinkRecord {
                    path: path.clone(),
                    source: None,
                    outcome,
                }
            })
            .collect();

        RemovalReport { records }
    }
}

/// True when `path` resolves to an existing entry and is a symlink to
/// something other than `source`. Dangling links do not count: they are
/// replaced in place.
fn links_elsewhere(path: &Path, source: &Path) -> bool {
    if !path.exists() {
        return false;
    }
    match fs::read_link(path) {
        Ok(existing) => existing != source,
        Err(_) => false,
    }
}

/// Swap the link at `target` for one pointing at `source` without a window
/// where `target` is missing: the new link is built beside it and renamed
/// over it.
fn replace_link(source: &Path, target: &Path) -> io::Result<()> {
    let staging = staging_path(target);
    if fs::symlink_metadata(&staging).is_ok() {
        remove_link(&staging)?;
    }
    platform::symlink(source, &staging)?;
    if let Err(e) = fs::rename(&staging, target) {
        let _ = fs::remove_file(&staging);
        return Err(e);
    }
    Ok(())
}

fn staging_path(target: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(target.file_name().unwrap_or_default());
    name.push(".tagfarm-tmp");
    target.with_file_name(name)
}

fn remove_link(path: &Path) -> io::Result<()> {
    let meta = fs::symlink_metadata(path)?;
    if !meta.file_type().is_symlink() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} is not a symbolic link", path.display()),
        ));
    }
    fs::remove_file(path)
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_new_creates_root_unless_dry_run() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().join("a").join("farm");

        LinkFarm::new(&root, true, true).unwrap();
        assert!(!root.exists());

        LinkFarm::new(&root, true, false).unwrap();
        assert!(root.is_dir());
    }

    #[test]
    fn test_item_dir_is_sanitized() {
        let farm = LinkFarm::new("/nonexistent/farm", true, true).unwrap();
        assert_eq!(
            farm.item_dir(Category::Performer, " AC/DC. "),
            PathBuf::from("/nonexistent/farm/performers/AC_DC")
        );
    }

    #[test]
    fn test_staging_path_is_hidden_sibling() {
        assert_eq!(
            staging_path(Path::new("/farm/tags/A/A.mp4")),
            PathBuf::from("/farm/tags/A/.A.mp4.tagfarm-tmp")
        );
    }

    #[test]
    fn test_replace_link_swaps_target() {
        let tmp = tempdir().unwrap();
        let old = tmp.path().join("old.mp4");
        let new = tmp.path().join("new.mp4");
        fs::write(&old, b"old").unwrap();
        fs::write(&new, b"new").unwrap();
        let link = tmp.path().join("link.mp4");
        platform::symlink(&old, &link).unwrap();

        replace_link(&new, &link).unwrap();

        assert_eq!(fs::read_link(&link).unwrap(), new);
        assert!(!staging_path(&link).exists());
        assert!(old.exists());
    }

    #[test]
    fn test_remove_link_refuses_regular_files() {
        let tmp = tempdir().unwrap();
        let file = tmp.path().join("keep.txt");
        fs::write(&file, b"data").unwrap();

        let err = remove_link(&file).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        assert!(file.exists());
    }

    #[test]
    fn test_links_elsewhere_ignores_dangling_and_matching_links() {
        let tmp = tempdir().unwrap();
        let a = tmp.path().join("a.mp4");
        let b = tmp.path().join("b.mp4");
        fs::write(&a, b"a").unwrap();
        fs::write(&b, b"b").unwrap();

        let link = tmp.path().join("link.mp4");
        assert!(!links_elsewhere(&link, &a));

        platform::symlink(&a, &link).unwrap();
        assert!(!links_elsewhere(&link, &a));
        assert!(links_elsewhere(&link, &b));

        fs::remove_file(&a).unwrap();
        assert!(!links_elsewhere(&link, &b));
    }
}
