//! Wall-clock guard around a pipeline run.
//!
//! The run executes on its own task; the guard waits up to the ceiling and
//! converts a hang into a typed timeout failure. On timeout the task is
//! aborted - a late run must not keep writing artifacts or sending email
//! after the request has already been answered.

use std::future::Future;
use std::time::Duration;
use tracing::{error, warn};

use crate::errors::AppError;

/// Executes `run` on a separate task, waiting at most `ceiling`.
///
/// * Completion within the ceiling returns the run's own result verbatim.
/// * A panic inside the run surfaces as [`AppError::PipelineFailed`].
/// * Ceiling expiry aborts the task and returns [`AppError::PipelineTimeout`].
pub async fn run_with_ceiling<F, T>(run: F, ceiling: Duration) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>> + Send + 'static,
    T: Send + 'static,
{
    let mut handle = tokio::spawn(run);

    match tokio::time::timeout(ceiling, &mut handle).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_error)) => {
            if join_error.is_panic() {
                error!(error = %join_error, "Pipeline task panicked");
                Err(AppError::PipelineFailed(format!(
                    "pipeline task panicked: {join_error}"
                )))
            } else {
                Err(AppError::PipelineFailed(
                    "pipeline task was cancelled".to_string(),
                ))
            }
        }
        Err(_elapsed) => {
            warn!(ceiling_secs = ceiling.as_secs(), "Pipeline run exceeded ceiling, aborting");
            handle.abort();
            Err(AppError::PipelineTimeout(ceiling.as_secs()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[tokio::test]
    async fn returns_result_when_run_finishes_in_time() {
        let result = run_with_ceiling(async { Ok::<_, AppError>(42) }, Duration::from_secs(5))
            .await
            .expect("run should finish");
        assert_eq!(result, 42);
    }

    #[tokio::test]
    async fn propagates_run_errors_verbatim() {
        let err = run_with_ceiling(
            async { Err::<(), _>(AppError::PipelineFailed("boom".into())) },
            Duration::from_secs(5),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::PipelineFailed(msg) if msg == "boom"));
    }

    #[tokio::test]
    async fn converts_panics_into_pipeline_failures() {
        let err = run_with_ceiling::<_, ()>(
            async { panic!("kaboom") },
            Duration::from_secs(5),
        )
        .await
        .unwrap_err()
        .to_string();
        assert!(err.contains("panicked"));
    }

    struct DropProbe(Arc<AtomicBool>);

    impl Drop for DropProbe {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn times_out_and_cancels_the_run() {
        let cancelled = Arc::new(AtomicBool::new(false));
        let probe = DropProbe(cancelled.clone());

        let started = std::time::Instant::now();
        let err = run_with_ceiling(
            async move {
                let _probe = probe;
                tokio::time::sleep(Duration::from_secs(60)).await;
                Ok::<_, AppError>(())
            },
            Duration::from_millis(50),
        )
        .await
        .unwrap_err();

        // The guard must answer before the 60s run would have completed.
        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(matches!(err, AppError::PipelineTimeout(_)));

        // Abort is asynchronous; give the runtime a beat to drop the task.
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(
            cancelled.load(Ordering::SeqCst),
            "timed-out run should have been cancelled"
        );
    }
}
