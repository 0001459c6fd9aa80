/// Receives one call per processed file, failed ones included.
///
/// `current` is 1-based; `label` is the object name.
pub trait ProgressSink {
    fn on_progress(&mut self, current: usize, total: usize, label: &str);
}

impl<F> ProgressSink for F
where
    F: FnMut(usize, usize, &str),
{
    fn on_progress(&mut self, current: usize, total: usize, label: &str) {
        self(current, total, label)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_progress(&mut self, _current: usize, _total: usize, _label: &str) {}
}
