//! Terminal progress bar following the loader's focused progress.

use std::io::{self, IsTerminal};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use census_store::LoadProgress;

const TEMPLATE: &str = "{spinner:.cyan} {bar:40.cyan/blue} {pos:>3}% {msg}";

/// Draws load progress until [`finish`](Self::finish) is called.
pub struct LoadProgressBar {
    bar: ProgressBar,
    task: JoinHandle<()>,
}

impl LoadProgressBar {
    /// Start following `progress`. Hidden when stderr is not a terminal.
    pub fn start(mut progress: watch::Receiver<LoadProgress>) -> Self {
        let bar = ProgressBar::with_draw_target(Some(100), draw_target());
        bar.set_style(
            ProgressStyle::with_template(TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("##-"),
        );
        bar.enable_steady_tick(Duration::from_millis(120));

        let shown = bar.clone();
        let task = tokio::spawn(async move {
            while progress.changed().await.is_ok() {
                let snapshot = progress.borrow_and_update().clone();
                update(&shown, &snapshot);
            }
        });
        Self { bar, task }
    }

    /// Stop following and clear the bar.
    pub fn finish(self) {
        self.task.abort();
        self.bar.finish_and_clear();
    }
}

fn update(bar: &ProgressBar, progress: &LoadProgress) {
    bar.set_position(u64::from(progress.percentage));
    bar.set_message(progress.message());
}

fn draw_target() -> ProgressDrawTarget {
    if io::stderr().is_terminal() {
        ProgressDrawTarget::stderr()
    } else {
        ProgressDrawTarget::hidden()
    }
}
