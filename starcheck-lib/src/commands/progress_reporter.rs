use crate::facts::Progress;
use core::fmt::{Debug, Formatter};
use core::sync::atomic::{AtomicBool, Ordering};
use core::time::Duration;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tokio::task::JoinHandle;

type ProgressCallback = Box<dyn Fn() -> (u64, u64, String) + Send + Sync>;

/// Refresh rate for progress updates (10 Hz).
const REFRESH_INTERVAL: Duration = Duration::from_millis(100);

const DETERMINATE_TEMPLATE: &str = "{prefix:>12.bold.cyan} [{bar:25}] {msg}";
const DETERMINATE_TEMPLATE_NO_COLOR: &str = "{prefix:>12} [{bar:25}] {msg}";
const INDETERMINATE_TEMPLATE: &str = "{prefix:>12.bold.cyan} [{spinner}] {msg}";
const INDETERMINATE_TEMPLATE_NO_COLOR: &str = "{prefix:>12} [{spinner}] {msg}";

const SPINNER_WIDTH: usize = 25;
const SPINNER_ARROW: &str = "===>";

#[derive(Debug)]
struct DisplayState {
    visible_after: Instant,
    visible: AtomicBool,
    indeterminate: AtomicBool,
    phase_started: Mutex<Instant>,
}

/// A progress bar on stderr that stays hidden for short runs.
#[derive(Clone)]
pub struct ProgressReporter {
    bar: ProgressBar,
    state: Arc<DisplayState>,
    callback: Arc<Mutex<ProgressCallback>>,
    refresh_task: Arc<JoinHandle<()>>,
    use_colors: bool,
}

impl ProgressReporter {
    /// Create a new progress reporter.
    ///
    /// The bar appears only once `delay` has elapsed. Must be called from within a tokio runtime.
    #[must_use]
    pub fn new(delay: Duration, use_colors: bool) -> Self {
        let bar = ProgressBar::hidden();

        let state = Arc::new(DisplayState {
            visible_after: Instant::now() + delay,
            visible: AtomicBool::new(false),
            indeterminate: AtomicBool::new(false),
            phase_started: Mutex::new(Instant::now()),
        });

        let callback = Arc::new(Mutex::new(Box::new(|| (0_u64, 0_u64, String::new())) as ProgressCallback));

        Self {
            refresh_task: Arc::new(tokio::spawn(refresh(bar.clone(), Arc::clone(&state), Arc::clone(&callback)))),
            bar,
            state,
            callback,
            use_colors,
        }
    }

    fn template(&self, colored: &'static str, plain: &'static str) -> &'static str {
        if self.use_colors { colored } else { plain }
    }
}

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Frames of an arrow bouncing across the spinner area.
fn spinner_frames() -> Vec<String> {
    let travel = SPINNER_WIDTH - SPINNER_ARROW.len();
    let back_arrow: String = SPINNER_ARROW.chars().rev().map(|c| if c == '>' { '<' } else { c }).collect();

    let forward = (0..=travel).map(|offset| format!("{:offset$}{SPINNER_ARROW:<width$}", "", width = SPINNER_WIDTH - offset));
    let backward = (0..=travel)
        .rev()
        .map(|offset| format!("{:offset$}{back_arrow:<width$}", "", width = SPINNER_WIDTH - offset));

    forward.chain(backward).collect()
}

impl Progress for ProgressReporter {
    fn set_phase(&self, phase: &str) {
        self.bar.set_prefix(phase.to_string());
        *locked(&self.state.phase_started) = Instant::now();
    }

    fn set_determinate(&self, callback: Box<dyn Fn() -> (u64, u64, String) + Send + Sync + 'static>) {
        *locked(&self.callback) = callback;
        self.state.indeterminate.store(false, Ordering::Relaxed);
        self.bar.disable_steady_tick();
        self.bar.set_length(0);
        self.bar.set_position(0);

        let template = self.template(DETERMINATE_TEMPLATE, DETERMINATE_TEMPLATE_NO_COLOR);
        let style = ProgressStyle::default_bar()
            .template(template)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ");
        self.bar.set_style(style);
    }

    fn set_indeterminate(&self, callback: Box<dyn Fn() -> String + Send + Sync + 'static>) {
        *locked(&self.callback) = Box::new(move || (0, 0, callback()));
        *locked(&self.state.phase_started) = Instant::now();
        self.state.indeterminate.store(true, Ordering::Relaxed);
        self.bar.enable_steady_tick(REFRESH_INTERVAL);

        let frames = spinner_frames();
        let frames: Vec<&str> = frames.iter().map(String::as_str).collect();
        let template = self.template(INDETERMINATE_TEMPLATE, INDETERMINATE_TEMPLATE_NO_COLOR);
        let style = ProgressStyle::default_spinner()
            .template(template)
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&frames);
        self.bar.set_style(style);
    }

    fn done(&self) {
        self.refresh_task.abort();
        if self.state.visible.load(Ordering::Relaxed) {
            self.bar.finish_and_clear();
        }
    }
}

impl Debug for ProgressReporter {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ProgressReporter")
            .field("bar", &self.bar)
            .field("state", &self.state)
            .field("callback", &"<callback>")
            .field("refresh_task", &"<task>")
            .field("use_colors", &self.use_colors)
            .finish()
    }
}

/// Periodically pulls the latest progress from the callback into the bar.
async fn refresh(bar: ProgressBar, state: Arc<DisplayState>, callback: Arc<Mutex<ProgressCallback>>) {
    let mut interval = tokio::time::interval(REFRESH_INTERVAL);
    #[expect(clippy::infinite_loop, reason = "task runs until aborted")]
    loop {
        let _ = interval.tick().await;

        if !state.visible.load(Ordering::Relaxed) && Instant::now() >= state.visible_after {
            state.visible.store(true, Ordering::Relaxed);
            bar.set_draw_target(ProgressDrawTarget::stderr_with_hz(10));
        }

        if !state.visible.load(Ordering::Relaxed) {
            continue;
        }

        let (length, position, mut message) = locked(&callback)();

        if state.indeterminate.load(Ordering::Relaxed) {
            let elapsed = locked(&state.phase_started).elapsed().as_secs();
            message = format!("{elapsed}s: {message}");
        }

        if length > 0 {
            bar.set_length(length);
            bar.set_position(position);
        }
        bar.set_message(message);
    }
}
