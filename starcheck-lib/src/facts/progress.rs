/// Receives progress updates while stargazers are listed and their contributions fetched.
pub trait Progress: Send + Sync {
    /// Label the stage currently running, such as "Listing" or "Fetching".
    fn set_phase(&self, phase: &str);

    /// Switch to a bounded progress display.
    ///
    /// The callback is polled periodically and returns `(total, current, message)`.
    fn set_determinate(&self, callback: Box<dyn Fn() -> (u64, u64, String) + Send + Sync + 'static>);

    /// Switch to an unbounded progress display, for stages whose length is not known
    /// up front. The callback is polled periodically for the message to show.
    fn set_indeterminate(&self, callback: Box<dyn Fn() -> String + Send + Sync + 'static>);

    /// Remove the progress display.
    fn done(&self);
}

/// Progress sink that discards every update.
#[cfg(test)]
#[derive(Debug)]
pub struct NoProgress;

#[cfg(test)]
impl Progress for NoProgress {
    fn set_phase(&self, _phase: &str) {}
    fn set_determinate(&self, _callback: Box<dyn Fn() -> (u64, u64, String) + Send + Sync + 'static>) {}
    fn set_indeterminate(&self, _callback: Box<dyn Fn() -> String + Send + Sync + 'static>) {}
    fn done(&self) {}
}
