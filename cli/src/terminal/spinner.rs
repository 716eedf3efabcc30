use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

use crate::terminal::colors;

static ACTIVE: Mutex<Option<ProgressBar>> = Mutex::new(None);

const TICKS: &[&str] = &[
    "▁▁▁▁▁",
    "▁▂▂▂▁",
    "▁▄▂▄▁",
    "▂▄▆▄▂",
    "▄▆█▆▄",
    "▂▄▆▄▂",
    "▁▄▂▄▁",
    "▁▂▂▂▁",
];

/// The running spinner, if one is drawn to a terminal.
pub fn active() -> Option<ProgressBar> {
    ACTIVE
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
        .filter(|pb| !pb.is_hidden() && !pb.is_finished())
}

pub struct ScanProgress {
    pb: ProgressBar,
    total: usize,
}

impl ScanProgress {
    pub fn start(total: usize) -> Self {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
            pb.set_style(style.tick_strings(TICKS));
        }
        pb.enable_steady_tick(Duration::from_millis(100));

        *ACTIVE.lock().unwrap_or_else(PoisonError::into_inner) = Some(pb.clone());

        let progress = Self { pb, total };
        progress.update(0);
        progress
    }

    fn update(&self, done: usize) {
        self.pb.set_message(progress_message(done, self.total));
    }

    /// Callback for the scheduler, fed with the number of finished hosts.
    pub fn tracker(&self) -> Arc<dyn Fn(usize) + Send + Sync> {
        let pb = self.pb.clone();
        let total = self.total;
        Arc::new(move |done| pb.set_message(progress_message(done, total)))
    }

    pub fn finish(self) {
        self.pb.finish_and_clear();
        *ACTIVE.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

fn progress_message(done: usize, total: usize) -> String {
    format!(
        "Scanned {} of {} hosts...",
        done.to_string().green().bold(),
        total.to_string().bold()
    )
    .color(colors::TEXT_DEFAULT)
    .to_string()
}
