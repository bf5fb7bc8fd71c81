/// Events a workflow emits while it runs.
///
/// Phases bracket the coarse steps of a workflow; tasks count the units of work inside a
/// phase (identifiers looked up, batches fetched).
#[derive(Debug, Clone, PartialEq)]
pub enum Progress {
    PhaseStart { name: &'static str },
    PhaseFinish,

    TaskStart { total_steps: u64 },
    TaskIncrement,
    TaskFinish,

    Message(String),
}

pub type ProgressCallback<'a> = Box<dyn Fn(Progress) + Send + Sync + 'a>;

/// Forwards progress events to an optional callback. A reporter without one is a no-op.
#[derive(Default)]
pub struct ProgressReporter<'a> {
    callback: Option<ProgressCallback<'a>>,
}

impl<'a> ProgressReporter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: ProgressCallback<'a>) -> Self {
        Self {
            callback: Some(callback),
        }
    }

    #[inline]
    pub fn report(&self, event: Progress) {
        if let Some(cb) = &self.callback {
            cb(event);
        }
    }

    pub fn message(&self, text: impl Into<String>) {
        self.report(Progress::Message(text.into()));
    }

    /// Runs `f` between a `PhaseStart` and a `PhaseFinish` event.
    ///
    /// `PhaseFinish` is reported even when `f` returns an error, so front ends can close
    /// their spinners before the error is shown.
    pub fn phase<T>(&self, name: &'static str, f: impl FnOnce() -> T) -> T {
        self.report(Progress::PhaseStart { name });
        let result = f();
        self.report(Progress::PhaseFinish);
        result
    }
}


#[cfg(test)]
mod tests {
    use super::testing::recording_reporter;
    use super::*;

    #[test]
    fn reporter_without_callback_ignores_events() {
        let reporter = ProgressReporter::new();
        reporter.report(Progress::TaskIncrement);
        reporter.message("nobody listens");
    }

    #[test]
    fn phase_brackets_the_closure() {
        let (reporter, events) = recording_reporter();
        let value = reporter.phase("Lookup", || {
            reporter.report(Progress::TaskIncrement);
            42
        });

        assert_eq!(value, 42);
        assert_eq!(
            *events.lock().unwrap(),
            vec![
                Progress::PhaseStart { name: "Lookup" },
                Progress::TaskIncrement,
                Progress::PhaseFinish,
            ]
        );
    }

    #[test]
    fn phase_finishes_on_error_results() {
        let (reporter, events) = recording_reporter();
        let result: Result<(), &str> = reporter.phase("Fetch", || Err("boom"));

        assert!(result.is_err());
        assert_eq!(events.lock().unwrap().last(), Some(&Progress::PhaseFinish));
    }
}
