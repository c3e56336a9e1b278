/// Progress reporting for provisioning operations.

/// Progress reporter for provisioning operations.
pub trait ProgressReporter: Send + Sync + 'static {
    fn emit(&self, percentage: u32, message: String);

    /// Emit progress with phase metadata.
    fn emit_detailed(&self, percentage: u32, message: String, _phase: Option<String>) {
        self.emit(percentage, message);
    }
}

/// Reporter that writes progress to the tracing log.
pub struct LogProgressReporter;

impl ProgressReporter for LogProgressReporter {
    fn emit(&self, percentage: u32, message: String) {
        tracing::info!("[{:>3}%] {}", percentage, message);
    }

    fn emit_detailed(&self, percentage: u32, message: String, phase: Option<String>) {
        match phase {
            Some(phase) => tracing::info!("[{:>3}%] [{}] {}", percentage, phase, message),
            None => self.emit(percentage, message),
        }
    }
}
