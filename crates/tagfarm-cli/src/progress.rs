use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;
use tagfarm_core::{Category, PlacementReport, ProgressReporter};

const TICK_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// CLI progress reporter using indicatif progress bars.
///
/// - Build: one bar per category, advancing per item
/// - Clean: spinner while the farm is walked
pub struct CliReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn set_bar(&self, pb: ProgressBar) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(old) = guard.replace(pb) {
                old.finish_and_clear();
            }
        }
    }

    fn finish_bar(&self) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(pb) = guard.take() {
                pb.finish_and_clear();
            }
        }
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Ok(guard) = self.bar.lock() {
            if let Some(pb) = guard.as_ref() {
                f(pb);
            }
        }
    }

    /// Print above the bar if one is running.
    fn println(&self, line: String) {
        let mut printed = false;
        self.with_bar(|pb| {
            pb.println(&line);
            printed = true;
        });
        if !printed {
            eprintln!("{}", line);
        }
    }
}

fn style(template: &str) -> ProgressStyle {
    ProgressStyle::with_template(template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("━╸─")
        .tick_chars(TICK_CHARS)
}

impl ProgressReporter for CliReporter {
    fn on_category_start(&self, category: Category, items: usize) {
        let pb = ProgressBar::new(items as u64);
        pb.set_style(style(&format!(
            "  {{spinner:.cyan}} {} [{{bar:30.cyan/dim}}] {{pos}}/{{len}} {{msg}}",
            category.dir_name()
        )));
        pb.enable_steady_tick(Duration::from_millis(80));
        self.set_bar(pb);
    }

    fn on_item_start(&self, _category: Category, item_name: &str) {
        let name = item_name.to_string();
        self.with_bar(|pb| pb.set_message(name));
    }

    fn on_item_complete(&self, report: &PlacementReport) {
        for record in report.issues() {
            self.println(format!(
                "  {} {}: {}",
                "!".yellow(),
                record.path.display(),
                record.outcome
            ));
        }
        self.with_bar(|pb| pb.inc(1));
    }

    fn on_item_not_found(&self, category: Category, item_name: &str) {
        self.println(format!(
            "  {} {} '{}' not found",
            "Warning:".yellow(),
            category,
            item_name
        ));
    }

    fn on_category_complete(&self, category: Category) {
        self.finish_bar();
        eprintln!("  {} Processed {}", "✓".green(), category.dir_name());
    }

    fn on_scan_start(&self) {
        let pb = ProgressBar::new_spinner();
        pb.set_style(style("{spinner:.cyan} {msg}"));
        pb.set_message("Scanning for dangling links...");
        pb.enable_steady_tick(Duration::from_millis(80));
        self.set_bar(pb);
    }

    fn on_scan_complete(&self, _dangling: usize) {
        self.finish_bar();
    }
}
