use crate::numerical::analysis::error::AnalysisError;
use log::info;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared "abort requested" flag. Clones observe the same flag, so a handle can be given to
/// another thread (or a signal handler) while an analysis runs.
#[derive(Debug, Clone, Default)]
pub struct AbortHandle {
    flag: Arc<AtomicBool>,
}

impl AbortHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_abort(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Logs progress of long sweeps, once per whole percent.
#[derive(Debug, Clone, Default)]
pub struct ProgressReporter {
    last_percent: Option<usize>,
}

impl ProgressReporter {
    pub fn start(&mut self, title: &str) {
        self.last_percent = None;
        info!("{}: started", title);
    }

    pub fn report(&mut self, title: &str, done: usize, total: usize) {
        if total == 0 {
            return;
        }
        let percent = (done.min(total) * 100) / total;
        if self.last_percent != Some(percent) {
            self.last_percent = Some(percent);
            info!("{}: {} %", title, percent);
        }
    }
}

/// State threaded through every analysis call instead of module-level globals.
#[derive(Debug, Clone)]
pub struct AnalysisContext {
    pub abort: AbortHandle,
    pub progress: ProgressReporter,
    /// "off"/"none" disables logging, otherwise debug, info, warn or error
    pub loglevel: Option<String>,
    /// optional file receiving a copy of the log
    pub log_file: Option<String>,
}

impl Default for AnalysisContext {
    fn default() -> Self {
        AnalysisContext {
            abort: AbortHandle::new(),
            progress: ProgressReporter::default(),
            loglevel: Some("info".to_string()),
            log_file: None,
        }
    }
}

impl AnalysisContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cooperative cancellation point of long-running loops.
    pub fn poll_abort(&self) -> Result<(), AnalysisError> {
        if self.abort.is_requested() {
            Err(AnalysisError::ProcessAbortedByUser)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_abort_flag_is_shared() {
        let ctx = AnalysisContext::new();
        let handle = ctx.abort.clone();
        assert!(ctx.poll_abort().is_ok());
        handle.request_abort();
        assert_eq!(ctx.poll_abort(), Err(AnalysisError::ProcessAbortedByUser));
        ctx.abort.reset();
        assert!(!handle.is_requested());
    }

    #[test]
    fn test_progress_percent_is_monotonic() {
        let mut progress = ProgressReporter::default();
        progress.start("integration");
        progress.report("integration", 5, 10);
        assert_eq!(progress.last_percent, Some(50));
        progress.report("integration", 20, 10);
        assert_eq!(progress.last_percent, Some(100));
    }
}
