//! Background job scheduler.
//!
//! Initialises a [`JobScheduler`] at server startup and, when a refresh
//! schedule is configured, registers the catalog rebuild job.

use drange_engine::DeliveryRangeService;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive
/// for the lifetime of the process. Dropping it shuts down all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// `refresh_cron` is not a valid cron expression, or the scheduler fails to
/// start.
pub async fn build_scheduler(
    service: DeliveryRangeService,
    refresh_cron: Option<&str>,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    match refresh_cron {
        Some(schedule) => register_refresh_job(&scheduler, service, schedule).await?,
        None => tracing::info!("scheduler: DRANGE_REFRESH_CRON not set; no catalog refresh job"),
    }

    scheduler.start().await?;
    Ok(scheduler)
}

/// Register the catalog rebuild on `schedule` (six-field cron, UTC).
async fn register_refresh_job(
    scheduler: &JobScheduler,
    service: DeliveryRangeService,
    schedule: &str,
) -> Result<(), JobSchedulerError> {
    let job = Job::new_async(schedule, move |_uuid, _lock| {
        let service = service.clone();
        Box::pin(async move {
            run_refresh(&service).await;
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(schedule, "scheduler: registered catalog refresh job");
    Ok(())
}

/// One refresh run. Failures are logged; the stored snapshot stays as it was
/// before the failing write.
async fn run_refresh(service: &DeliveryRangeService) {
    tracing::info!("scheduler: starting catalog refresh");
    match service.preprocess_restaurants().await {
        Ok(report) => tracing::info!(
            restaurants_indexed = report.restaurants_indexed,
            rows_skipped = report.rows_skipped,
            chunks_written = report.chunks_written,
            radius_exceeds_window = report.radius_exceeds_window,
            "scheduler: catalog refresh complete"
        ),
        Err(e) => tracing::error!(
            error = %e,
            kind = %e.kind(),
            "scheduler: catalog refresh failed"
        ),
    }
}
