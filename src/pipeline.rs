/// Sequential pipeline executor.
///
/// Runs the provisioning steps in strict order with progress reporting.
/// Fail-fast: the first step failure aborts the run, later steps never
/// execute.
use crate::context::ProvisionContext;
use crate::error::Result;
use crate::progress::ProgressReporter;
use async_trait::async_trait;

/// One stage of the provisioning sequence.
#[async_trait]
pub trait Step: Send + Sync {
    /// Short name for logs and progress messages.
    fn name(&self) -> &'static str;

    async fn run(&self, ctx: &mut ProvisionContext) -> Result<()>;
}

/// Execute steps in order with progress tracking.
/// Fail-fast: stops on the first step failure.
pub async fn run_pipeline(
    steps: &[Box<dyn Step>],
    ctx: &mut ProvisionContext,
    progress: &dyn ProgressReporter,
) -> Result<()> {
    if steps.is_empty() {
        return Ok(());
    }

    let total = steps.len() as u32;

    for (index, step) in steps.iter().enumerate() {
        let start_pct = 100u32.saturating_mul(index as u32) / total;
        progress.emit_detailed(
            start_pct,
            format!("Executing {}", step.name()),
            Some(step.name().to_string()),
        );

        let step_start = std::time::Instant::now();
        let result = step.run(ctx).await;
        let step_duration = step_start.elapsed();

        if let Err(e) = result {
            tracing::warn!(
                "[TIMING] Step {} failed after {}ms",
                step.name(),
                step_duration.as_millis()
            );
            return Err(e);
        }

        tracing::info!(
            "[TIMING] Step {} completed in {}ms",
            step.name(),
            step_duration.as_millis()
        );

        let end_pct = 100u32.saturating_mul((index + 1) as u32) / total;
        progress.emit_detailed(
            end_pct,
            format!("Completed {}", step.name()),
            Some(step.name().to_string()),
        );
    }

    Ok(())
}
