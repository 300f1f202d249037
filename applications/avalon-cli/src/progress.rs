/// Terminal progress bars
use avalon_client::PageProgress;
use avalon_export::ExtractionProgress;
use indicatif::{ProgressBar, ProgressStyle};

const TEMPLATE: &str = "{msg} [{bar:40.cyan/blue}] {pos}/{len} ({elapsed})";

/// A bar labelled `message`, hidden when `quiet`.
pub fn bar(message: &'static str, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }

    let bar = ProgressBar::new(0);
    if let Ok(style) = ProgressStyle::with_template(TEMPLATE) {
        bar.set_style(style.progress_chars("=> "));
    }
    bar.set_message(message);
    bar
}

pub fn track_pages(bar: &ProgressBar, progress: &PageProgress) {
    bar.set_length(progress.total_pages);
    bar.set_position(progress.page);
}

pub fn track_extraction(bar: &ProgressBar, progress: &ExtractionProgress) {
    bar.set_length(progress.total as u64);
    bar.set_position(progress.index as u64);
}
