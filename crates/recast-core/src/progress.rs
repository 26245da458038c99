//! Progress reporting for batch operations.

/// Receives progress updates from a running batch.
pub trait ProgressReporter {
    /// A batch of `total` items is starting.
    fn start(&mut self, total: usize);

    /// `completed` items are done.
    fn update(&mut self, completed: usize, message: &str);

    /// The batch ended, successfully or not.
    fn finish(&mut self);
}

/// Plain progress state: counts, percentage and status line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgressState {
    completed: usize,
    total: usize,
    message: String,
    active: bool,
}

impl ProgressState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn completed(&self) -> usize {
        self.completed
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// `round(100 * completed / total)`, 0 when nothing is scheduled.
    pub fn percent(&self) -> u8 {
        percent(self.completed, self.total)
    }
}

impl ProgressReporter for ProgressState {
    fn start(&mut self, total: usize) {
        self.completed = 0;
        self.total = total;
        self.message = "Preparing conversion...".into();
        self.active = true;
    }

    fn update(&mut self, completed: usize, message: &str) {
        self.completed = completed.min(self.total);
        self.message = message.to_string();
    }

    fn finish(&mut self) {
        self.active = false;
    }
}

/// Rounded completion percentage.
pub(crate) fn percent(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let pct = (100.0 * completed as f64 / total as f64).round();
    pct.min(100.0) as u8
}

/// Starts a reporter and finishes it when dropped, on every exit path.
pub struct ProgressGuard<'a> {
    reporter: &'a mut dyn ProgressReporter,
}

impl<'a> ProgressGuard<'a> {
    pub fn start(reporter: &'a mut dyn ProgressReporter, total: usize) -> Self {
        reporter.start(total);
        Self { reporter }
    }

    pub fn update(&mut self, completed: usize, message: &str) {
        self.reporter.update(completed, message);
    }
}

impl Drop for ProgressGuard<'_> {
    fn drop(&mut self) {
        self.reporter.finish();
    }
}
