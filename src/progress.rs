//! Progress notifications.
//!
//! The driver reports 0 when a run starts, once per placed card, and 100
//! when the document is done. Reporters are fire-and-forget.

/// Receives completion percentages in `0.0..=100.0`.
///
/// A non-empty run therefore sees 100 twice: once when the last card is
/// placed (`"Generating PDF... 100%"`) and once more with `"Done"` after
/// the sink has serialized. Only the `"Done"` report means bytes exist; a
/// run whose sink fails never sends it.
pub trait ProgressReporter {
    fn report(&mut self, percent: f64, message: Option<&str>);
}

impl<F> ProgressReporter for F
where
    F: FnMut(f64, Option<&str>),
{
    fn report(&mut self, percent: f64, message: Option<&str>) {
        self(percent, message)
    }
}

/// Discards every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn report(&mut self, _percent: f64, _message: Option<&str>) {}
}

/// Forwards notifications to the `log` facade.
///
/// Per-card updates go to `debug`; start and finish go to `info`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ProgressReporter for LogProgress {
    fn report(&mut self, percent: f64, message: Option<&str>) {
        let message = message.unwrap_or("");
        if percent <= 0.0 || percent >= 100.0 {
            log::info!("[{:>3.0}%] {}", percent, message);
        } else {
            log::debug!("[{:>3.0}%] {}", percent, message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closure_reporter_receives_calls() {
        let mut seen = Vec::new();
        {
            let mut reporter = |p: f64, m: Option<&str>| seen.push((p, m.map(String::from)));
            reporter.report(0.0, Some("start"));
            reporter.report(100.0, None);
        }
        assert_eq!(seen, vec![(0.0, Some("start".to_string())), (100.0, None)]);
    }
}
