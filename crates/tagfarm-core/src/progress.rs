use crate::catalog::Category;
use crate::linkfarm::{PlacementReport, RemovalReport};

/// Trait for reporting build and clean progress.
///
/// CLI implements with indicatif; tests use [`SilentReporter`].
/// All methods have default no-op implementations.
pub trait ProgressReporter {
    fn on_category_start(&self, _category: Category, _items: usize) {}
    fn on_item_start(&self, _category: Category, _item_name: &str) {}
    fn on_item_complete(&self, _report: &PlacementReport) {}
    fn on_item_not_found(&self, _category: Category, _item_name: &str) {}
    fn on_category_complete(&self, _category: Category) {}
    fn on_scan_start(&self) {}
    fn on_scan_complete(&self, _dangling: usize) {}
    fn on_removal_complete(&self, _report: &RemovalReport) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
