// src/utils/progress.rs
//
// Progress and status reporting for long-running operations. Host shells
// implement `ProgressObserver`; the core never sees a UI toolkit type.

use indicatif::{ProgressBar, ProgressStyle};
use log::info;

pub trait ProgressObserver {
    /// Called after each processed row with a 1-based position.
    fn on_progress(&self, _current: usize, _total: usize) {}

    /// Called at each phase transition (loading, reading, matching, saving).
    fn on_status(&self, _message: &str) {}
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ProgressObserver for NoopObserver {}

/// Adapts a pair of closures to `ProgressObserver`.
pub struct FnObserver<P, S>
where
    P: Fn(usize, usize),
    S: Fn(&str),
{
    progress: P,
    status: S,
}

impl<P, S> FnObserver<P, S>
where
    P: Fn(usize, usize),
    S: Fn(&str),
{
    pub fn new(progress: P, status: S) -> Self {
        Self { progress, status }
    }
}

impl<P, S> ProgressObserver for FnObserver<P, S>
where
    P: Fn(usize, usize),
    S: Fn(&str),
{
    fn on_progress(&self, current: usize, total: usize) {
        (self.progress)(current, total)
    }

    fn on_status(&self, message: &str) {
        (self.status)(message)
    }
}

/// Terminal progress bar for command-line runs.
pub struct ProgressBarObserver {
    bar: ProgressBar,
}

impl ProgressBarObserver {
    pub fn new() -> Self {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} rows ({eta}) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style);
        Self { bar }
    }

    pub fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}

impl Default for ProgressBarObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressObserver for ProgressBarObserver {
    fn on_progress(&self, current: usize, total: usize) {
        if self.bar.length() != Some(total as u64) {
            self.bar.set_length(total as u64);
        }
        self.bar.set_position(current as u64);
    }

    fn on_status(&self, message: &str) {
        info!("{}", message);
        self.bar.set_message(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn closures_receive_every_call() {
        let progress = RefCell::new(Vec::new());
        let status = RefCell::new(Vec::new());
        let observer = FnObserver::new(
            |c, t| progress.borrow_mut().push((c, t)),
            |m: &str| status.borrow_mut().push(m.to_string()),
        );

        observer.on_status("Reading input file...");
        observer.on_progress(1, 2);
        observer.on_progress(2, 2);

        assert_eq!(*progress.borrow(), vec![(1, 2), (2, 2)]);
        assert_eq!(*status.borrow(), vec!["Reading input file...".to_string()]);
    }
}
