//! Live progress display driven by scan notifications.

use super::plain::print_warning;
use crate::scanner::ScanObserver;
use indicatif::{ProgressBar, ProgressStyle};
use std::net::IpAddr;
use std::sync::Mutex;

const TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}";

/// Shows one progress bar per host on stderr.
pub struct ConsoleReporter {
    quiet: bool,
    bar: Mutex<Option<ProgressBar>>,
}

impl ConsoleReporter {
    pub fn new(quiet: bool) -> Self {
        Self {
            quiet,
            bar: Mutex::new(None),
        }
    }

    fn new_bar(&self, host: &str) -> ProgressBar {
        if self.quiet {
            return ProgressBar::hidden();
        }

        let style = ProgressStyle::default_bar()
            .template(TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-");
        let bar = ProgressBar::new(0).with_style(style);
        bar.set_message(host.to_string());
        bar
    }

    /// Remove the current host's bar so results can be printed cleanly.
    pub fn finish_host(&self) {
        if let Ok(mut slot) = self.bar.lock() {
            if let Some(bar) = slot.take() {
                bar.finish_and_clear();
            }
        }
    }
}

impl ScanObserver for ConsoleReporter {
    fn on_host_start(&self, host: &str, address: Option<IpAddr>) {
        self.finish_host();

        if address.is_none() {
            if !self.quiet {
                print_warning(&format!("could not resolve {host}, skipping"));
            }
            return;
        }

        if let Ok(mut slot) = self.bar.lock() {
            *slot = Some(self.new_bar(host));
        }
    }

    fn on_progress(&self, completed: usize, total: usize, _host: &str) {
        if let Ok(slot) = self.bar.lock() {
            if let Some(bar) = slot.as_ref() {
                bar.set_length(total as u64);
                bar.set_position(completed as u64);
            }
        }
    }
}
