//! Batch evaluator using Rayon.

use std::time::Instant;

use rayon::prelude::*;
use tracing::{Level, debug, info, span, warn};

use crate::config::{BatchConfig, Config, MetricConfig};
use crate::engine::CalculationContext;
use crate::error::MetricError;
use crate::report::MetricReport;

use super::error::BatchError;
use super::progress::BatchProgress;
use super::result::BatchResult;
use super::types::{JobReport, SeriesJob};

/// Evaluates a fixed metric list over many jobs.
#[derive(Debug, Clone)]
pub struct BatchEvaluator {
    config: BatchConfig,
    metrics: MetricConfig,
}

impl BatchEvaluator {
    /// Create an evaluator with default metric parameters.
    #[must_use]
    pub fn new(config: BatchConfig) -> Self {
        Self {
            config,
            metrics: MetricConfig::default(),
        }
    }

    /// Create an evaluator from a loaded configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            config: config.batch.clone(),
            metrics: config.metrics,
        }
    }

    /// Use `metrics` for every job's context.
    #[must_use]
    pub const fn with_metric_config(mut self, metrics: MetricConfig) -> Self {
        self.metrics = metrics;
        self
    }

    /// Configure the rayon global thread pool.
    ///
    /// # Errors
    ///
    /// Returns error if the global pool was already built.
    pub fn configure_thread_pool(&self) -> Result<(), BatchError> {
        if self.config.max_threads > 0 {
            rayon::ThreadPoolBuilder::new()
                .num_threads(self.config.max_threads)
                .build_global()
                .map_err(|e| BatchError::ThreadPoolError {
                    message: e.to_string(),
                })?;
        }
        Ok(())
    }

    /// Evaluate `names` for every job.
    ///
    /// # Errors
    ///
    /// Returns error if `jobs` or `names` is empty.
    pub fn run<S>(&self, jobs: &[SeriesJob], names: &[S]) -> Result<BatchResult, BatchError>
    where
        S: AsRef<str> + Sync,
    {
        if jobs.is_empty() {
            return Err(BatchError::NoJobs);
        }
        if names.is_empty() {
            return Err(BatchError::NoMetrics);
        }

        let progress = BatchProgress::new(jobs.len());
        let start_time = Instant::now();

        info!(
            "Starting batch evaluation: {} jobs, {} metrics, {} threads",
            jobs.len(),
            names.len(),
            self.effective_thread_count()
        );

        let results: Vec<JobReport> = if jobs.len() >= self.config.min_parallel_jobs {
            self.run_parallel(jobs, names, &progress)
        } else {
            self.run_sequential(jobs, names, &progress)
        };

        let elapsed = start_time.elapsed();
        let seconds = elapsed.as_secs_f64();
        let jobs_per_sec = if seconds > 0.0 {
            progress.finished() as f64 / seconds
        } else {
            0.0
        };

        info!(
            "Batch evaluation complete: {}/{} succeeded in {:.2}s ({:.1} jobs/s)",
            progress.succeeded(),
            progress.total(),
            seconds,
            jobs_per_sec
        );

        Ok(BatchResult {
            results,
            total_time_ms: elapsed.as_millis() as u64,
            jobs_executed: jobs.len() as u64,
            jobs_succeeded: progress.succeeded() as u64,
            jobs_failed: progress.failed() as u64,
        })
    }

    fn run_parallel<S>(
        &self,
        jobs: &[SeriesJob],
        names: &[S],
        progress: &BatchProgress,
    ) -> Vec<JobReport>
    where
        S: AsRef<str> + Sync,
    {
        jobs.par_iter()
            .map(|job| {
                let result = self.execute_job(job, names);
                progress.record(result.success);

                if self.config.track_progress {
                    debug!(
                        "Progress: {:.1}% ({}/{})",
                        progress.percent(),
                        progress.finished(),
                        progress.total()
                    );
                }

                result
            })
            .collect()
    }

    fn run_sequential<S: AsRef<str>>(
        &self,
        jobs: &[SeriesJob],
        names: &[S],
        progress: &BatchProgress,
    ) -> Vec<JobReport> {
        jobs.iter()
            .map(|job| {
                let result = self.execute_job(job, names);
                progress.record(result.success);
                result
            })
            .collect()
    }

    fn execute_job<S: AsRef<str>>(&self, job: &SeriesJob, names: &[S]) -> JobReport {
        let _span = span!(Level::DEBUG, "batch_job", job_id = %job.job_id).entered();
        let start = Instant::now();

        let outcome = self
            .build_context(job)
            .map(|ctx| MetricReport::evaluate(&ctx, names));
        let execution_time_ms = start.elapsed().as_millis() as u64;

        match outcome {
            Ok(report) => JobReport {
                job_id: job.job_id.clone(),
                report: Some(report),
                execution_time_ms,
                error: None,
                success: true,
            },
            Err(e) => {
                warn!(job_id = %job.job_id, error = %e, "Job rejected");
                JobReport {
                    job_id: job.job_id.clone(),
                    report: None,
                    execution_time_ms,
                    error: Some(e.to_string()),
                    success: false,
                }
            }
        }
    }

    fn build_context(&self, job: &SeriesJob) -> Result<CalculationContext, MetricError> {
        let mut builder = CalculationContext::builder(job.portfolio.clone())
            .timestamps(job.timestamps.clone())
            .config(self.metrics)
            .method(job.method);
        if let Some(bench) = &job.bench {
            builder = builder.bench(bench.clone());
        }
        if let Some(period) = job.period {
            builder = builder.period(period);
        }
        builder.build()
    }

    /// Effective worker thread count.
    #[must_use]
    pub fn effective_thread_count(&self) -> usize {
        if self.config.max_threads > 0 {
            self.config.max_threads
        } else {
            rayon::current_num_threads()
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use super::*;
    use crate::error::ErrorKind;

    fn jobs(count: usize) -> Vec<SeriesJob> {
        (0..count)
            .map(|i| {
                let drift = 1.0 + i as f64 / 100.0;
                let values = (0..20).map(|t| 100.0 * drift.powi(t) + (t % 3) as f64).collect();
                SeriesJob::new(format!("job-{i}"), values)
            })
            .collect()
    }

    #[test]
    fn test_empty_inputs_rejected() {
        let evaluator = BatchEvaluator::new(BatchConfig::default());

        assert_eq!(
            evaluator.run::<&str>(&[], &["Annualized"]).unwrap_err(),
            BatchError::NoJobs
        );
        assert_eq!(
            evaluator.run::<&str>(&jobs(1), &[]).unwrap_err(),
            BatchError::NoMetrics
        );
    }

    #[test]
    fn test_parallel_preserves_order() {
        let evaluator = BatchEvaluator::new(BatchConfig {
            min_parallel_jobs: 2,
            ..BatchConfig::default()
        });
        let input = jobs(16);

        let result = evaluator.run(&input, &["Annualized", "MaxDrawdown"]).unwrap();

        assert_eq!(result.jobs_executed, 16);
        assert_eq!(result.jobs_succeeded, 16);
        assert!((result.success_rate() - 1.0).abs() < f64::EPSILON);
        for (job, report) in input.iter().zip(&result.results) {
            assert_eq!(job.job_id, report.job_id);
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let input = jobs(6);
        let names = ["SharpeRatio", "Kurtosis", "PainIndex"];

        let parallel = BatchEvaluator::new(BatchConfig {
            min_parallel_jobs: 1,
            ..BatchConfig::default()
        })
        .run(&input, &names)
        .unwrap();
        let sequential = BatchEvaluator::new(BatchConfig {
            min_parallel_jobs: usize::MAX,
            ..BatchConfig::default()
        })
        .run(&input, &names)
        .unwrap();

        for (p, s) in parallel.results.iter().zip(&sequential.results) {
            assert_eq!(p.report, s.report);
        }
    }

    #[test]
    fn test_failed_job_reported() {
        let start = Utc.with_ymd_and_hms(2024, 1, 2, 21, 0, 0).unwrap();
        let bad = SeriesJob::new("bad", vec![1.0, 2.0, 3.0])
            .with_timestamps(vec![start, start + Duration::days(1)]);
        let input = vec![jobs(1).remove(0), bad];

        let result = BatchEvaluator::new(BatchConfig::default())
            .run(&input, &["Annualized"])
            .unwrap();

        assert_eq!(result.jobs_failed, 1);
        let failed = result.get("bad").unwrap();
        assert!(!failed.success);
        assert!(failed.report.is_none());
        assert!(failed.error.as_deref().unwrap().contains("differ in length"));
        assert_eq!(result.failed_results().len(), 1);
    }

    #[test]
    fn test_metric_failures_stay_in_report() {
        let result = BatchEvaluator::new(BatchConfig::default())
            .run(&jobs(1), &["TrackingError"])
            .unwrap();

        let report = result.results[0].report.as_ref().unwrap();
        assert!(result.results[0].success);
        assert_eq!(
            report.get("TrackingError").unwrap().error,
            Some(ErrorKind::BenchmarkRequired)
        );
    }

    #[test]
    fn test_metric_config_applied() {
        let metrics = MetricConfig {
            risk_free_rate: 0.0,
            ..MetricConfig::default()
        };
        let evaluator = BatchEvaluator::new(BatchConfig::default()).with_metric_config(metrics);
        let input = jobs(1);

        let result = evaluator.run(&input, &["PainRatio"]).unwrap();
        let ctx = CalculationContext::builder(input[0].portfolio.clone())
            .config(metrics)
            .build()
            .unwrap();

        let report = result.results[0].report.as_ref().unwrap();
        assert_eq!(report.value("PainRatio"), ctx.evaluate("PainRatio").unwrap());
    }
}
