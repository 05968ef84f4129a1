//! Per-series calculation context with memoized intermediates.

use std::cell::{Cell, OnceCell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::capm::{self, Regression};
use crate::config::MetricConfig;
use crate::drawdown::{self, DrawdownTable};
use crate::error::MetricError;
use crate::periodicity::{self, Frequency};
use crate::series::{self, ReturnMethod, stats};

use super::catalog::Metric;
use super::keys::{ScalarKey, VectorKey};
use super::registry::{self, MetricFn, MetricRegistry};

/// Inputs and memoized results for one portfolio (and optional benchmark).
///
/// Every derived series and scalar is computed at most once and cached for
/// the lifetime of the context. Caches use interior mutability, so a context
/// is `!Sync`: build one per thread (or per job) rather than sharing it.
#[derive(Debug)]
pub struct CalculationContext {
    portfolio: Vec<f64>,
    bench: Option<Vec<f64>>,
    timestamps: Vec<DateTime<Utc>>,
    config: MetricConfig,
    method: ReturnMethod,
    supplied_period: Option<f64>,
    frequency: OnceCell<Option<Frequency>>,
    scalars: RefCell<HashMap<ScalarKey, Result<f64, MetricError>>>,
    vectors: RefCell<HashMap<VectorKey, Rc<[f64]>>>,
    regression: OnceCell<Regression>,
    computations: Cell<usize>,
}

/// Builder for [`CalculationContext`].
#[derive(Debug, Clone)]
pub struct ContextBuilder {
    portfolio: Vec<f64>,
    bench: Option<Vec<f64>>,
    timestamps: Vec<DateTime<Utc>>,
    config: MetricConfig,
    method: ReturnMethod,
    period: Option<f64>,
}

impl ContextBuilder {
    /// Attach a benchmark value series.
    #[must_use]
    pub fn bench(mut self, bench: Vec<f64>) -> Self {
        self.bench = Some(bench);
        self
    }

    /// Attach sample timestamps, one per portfolio value.
    #[must_use]
    pub fn timestamps(mut self, timestamps: Vec<DateTime<Utc>>) -> Self {
        self.timestamps = timestamps;
        self
    }

    /// Override rate assumptions and metric options.
    #[must_use]
    pub const fn config(mut self, config: MetricConfig) -> Self {
        self.config = config;
        self
    }

    /// Override the return method (discrete by default).
    #[must_use]
    pub const fn method(mut self, method: ReturnMethod) -> Self {
        self.method = method;
        self
    }

    /// Supply the periods-per-year directly instead of inferring it.
    #[must_use]
    pub const fn period(mut self, period: f64) -> Self {
        self.period = Some(period);
        self
    }

    /// Validate inputs and build the context.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when timestamps are present but differ in
    /// length from the portfolio, or when the supplied period is not a
    /// positive finite number.
    pub fn build(self) -> Result<CalculationContext, MetricError> {
        if !self.timestamps.is_empty() && self.timestamps.len() != self.portfolio.len() {
            return Err(MetricError::invalid_input(format!(
                "timestamps ({}) and portfolio ({}) differ in length",
                self.timestamps.len(),
                self.portfolio.len()
            )));
        }

        if let Some(period) = self.period {
            if !(period.is_finite() && period > 0.0) {
                return Err(MetricError::invalid_input(format!(
                    "period must be positive, got {period}"
                )));
            }
        }

        Ok(CalculationContext {
            portfolio: self.portfolio,
            bench: self.bench,
            timestamps: self.timestamps,
            config: self.config,
            method: self.method,
            supplied_period: self.period,
            frequency: OnceCell::new(),
            scalars: RefCell::new(HashMap::new()),
            vectors: RefCell::new(HashMap::new()),
            regression: OnceCell::new(),
            computations: Cell::new(0),
        })
    }
}

impl CalculationContext {
    /// Create a context with the default configuration.
    ///
    /// # Errors
    ///
    /// See [`ContextBuilder::build`].
    pub fn new(
        portfolio: Vec<f64>,
        bench: Option<Vec<f64>>,
        timestamps: Vec<DateTime<Utc>>,
    ) -> Result<Self, MetricError> {
        let builder = Self::builder(portfolio).timestamps(timestamps);
        match bench {
            Some(bench) => builder.bench(bench).build(),
            None => builder.build(),
        }
    }

    /// Start building a context over `portfolio`.
    #[must_use]
    pub fn builder(portfolio: Vec<f64>) -> ContextBuilder {
        ContextBuilder {
            portfolio,
            bench: None,
            timestamps: Vec::new(),
            config: MetricConfig::default(),
            method: ReturnMethod::Discrete,
            period: None,
        }
    }

    // =========================================================================
    // Evaluation
    // =========================================================================

    /// Evaluate a metric by registry name.
    ///
    /// # Errors
    ///
    /// Returns `UnknownMetric` for unregistered names, otherwise the
    /// metric's own failure.
    pub fn evaluate(&self, name: &str) -> Result<f64, MetricError> {
        let entry = MetricRegistry::global().get(name)?;
        self.memoized(entry.metric, entry.compute)
    }

    /// Evaluate a metric, reusing the cached result when present.
    pub fn metric(&self, metric: Metric) -> Result<f64, MetricError> {
        self.memoized(metric, registry::compute_fn(metric))
    }

    fn memoized(&self, metric: Metric, compute: MetricFn) -> Result<f64, MetricError> {
        if metric.requires_benchmark() && self.bench.is_none() {
            return Err(MetricError::BenchmarkRequired {
                metric: metric.name(),
            });
        }
        self.scalar(ScalarKey::Metric(metric), || compute(self))
    }

    /// Number of cache misses so far.
    pub fn computations(&self) -> usize {
        self.computations.get()
    }

    /// Metric configuration fixed at construction.
    pub const fn config(&self) -> &MetricConfig {
        &self.config
    }

    /// Whether a benchmark series is attached.
    pub const fn has_bench(&self) -> bool {
        self.bench.is_some()
    }

    // =========================================================================
    // Periodicity
    // =========================================================================

    /// Inferred sampling frequency, `None` when supplied or undetermined.
    pub fn frequency(&self) -> Option<Frequency> {
        if self.supplied_period.is_some() {
            return None;
        }
        *self
            .frequency
            .get_or_init(|| Frequency::infer(&self.timestamps))
    }

    /// Periods per year of the raw input series.
    pub fn period(&self) -> f64 {
        self.supplied_period.unwrap_or_else(|| {
            self.frequency()
                .map_or(self.config.scale, |f| f.periods_per_year())
        })
    }

    /// Whether minute data is collapsed to daily closes before evaluation.
    pub fn is_resampled(&self) -> bool {
        self.frequency() == Some(Frequency::Minute)
    }

    /// Annualization scale of the evaluated return series.
    pub fn scale(&self) -> f64 {
        if self.is_resampled() {
            Frequency::Day.periods_per_year()
        } else {
            self.period()
        }
    }

    /// MAR per period.
    pub fn periodic_mar(&self) -> f64 {
        self.config.mar / self.scale()
    }

    /// Risk-free rate per period.
    pub fn periodic_risk_free(&self) -> f64 {
        self.config.risk_free_rate / self.scale()
    }

    // =========================================================================
    // Derived series
    // =========================================================================

    /// Portfolio values after any resampling.
    pub fn portfolio_values(&self) -> Result<Rc<[f64]>, MetricError> {
        self.vector(VectorKey::PortfolioValues, || {
            self.effective_values(&self.portfolio)
        })
    }

    /// Benchmark values after any resampling.
    pub fn bench_values(&self, metric: &'static str) -> Result<Rc<[f64]>, MetricError> {
        let bench = self.require_bench(metric)?;
        self.vector(VectorKey::BenchValues, || self.effective_values(bench))
    }

    /// Portfolio return series.
    pub fn portfolio_returns(&self) -> Result<Rc<[f64]>, MetricError> {
        self.vector(VectorKey::PortfolioReturns, || {
            series::returns(&self.portfolio_values()?, self.method)
        })
    }

    /// Benchmark return series.
    pub fn bench_returns(&self, metric: &'static str) -> Result<Rc<[f64]>, MetricError> {
        self.require_bench(metric)?;
        self.vector(VectorKey::BenchReturns, || {
            series::returns(&self.bench_values(metric)?, self.method)
        })
    }

    /// Portfolio returns less the per-period risk-free rate.
    pub fn portfolio_excess(&self) -> Result<Rc<[f64]>, MetricError> {
        self.vector(VectorKey::PortfolioExcess, || {
            Ok(stats::excess(&self.portfolio_returns()?, self.periodic_risk_free()))
        })
    }

    /// Benchmark returns less the per-period risk-free rate.
    pub fn bench_excess(&self, metric: &'static str) -> Result<Rc<[f64]>, MetricError> {
        self.require_bench(metric)?;
        self.vector(VectorKey::BenchExcess, || {
            Ok(stats::excess(&self.bench_returns(metric)?, self.periodic_risk_free()))
        })
    }

    /// Portfolio drawdown series.
    pub fn drawdowns(&self) -> Result<Rc<[f64]>, MetricError> {
        self.vector(VectorKey::Drawdowns, || {
            drawdown::drawdowns(&self.portfolio_returns()?)
        })
    }

    /// Drawdown runs as parallel depth/length/recovery vectors.
    ///
    /// Cached only once segmentation succeeds.
    pub fn drawdown_table(&self) -> Result<DrawdownTable, MetricError> {
        let cached = {
            let vectors = self.vectors.borrow();
            (
                vectors.get(&VectorKey::RunDepth).cloned(),
                vectors.get(&VectorKey::RunLength).cloned(),
                vectors.get(&VectorKey::RunRecovery).cloned(),
            )
        };
        if let (Some(depth), Some(length), Some(recovery)) = cached {
            return Ok(DrawdownTable {
                depth: depth.to_vec(),
                length: length.to_vec(),
                recovery: recovery.to_vec(),
            });
        }

        let table: DrawdownTable = drawdown::segment(&self.drawdowns()?)
            .into_iter()
            .collect();
        self.record_computation("drawdown_runs");

        let mut vectors = self.vectors.borrow_mut();
        vectors.insert(VectorKey::RunDepth, Rc::from(table.depth.as_slice()));
        vectors.insert(VectorKey::RunLength, Rc::from(table.length.as_slice()));
        vectors.insert(VectorKey::RunRecovery, Rc::from(table.recovery.as_slice()));
        Ok(table)
    }

    /// CAPM alpha and beta of excess portfolio on excess benchmark returns.
    pub fn regression(&self, metric: &'static str) -> Result<Regression, MetricError> {
        if let Some(fit) = self.regression.get() {
            return Ok(*fit);
        }
        let x = self.bench_excess(metric)?;
        let y = self.portfolio_excess()?;
        let fit = capm::regress(&x, &y);
        self.record_computation("regression");
        Ok(*self.regression.get_or_init(|| fit))
    }

    // =========================================================================
    // Cache plumbing
    // =========================================================================

    /// Memoize a scalar, failures included.
    pub(crate) fn scalar(
        &self,
        key: ScalarKey,
        compute: impl FnOnce() -> Result<f64, MetricError>,
    ) -> Result<f64, MetricError> {
        let cached = self.scalars.borrow().get(&key).cloned();
        if let Some(result) = cached {
            return result;
        }

        let result = compute();
        self.record_computation(&key);
        self.scalars
            .borrow_mut()
            .entry(key)
            .or_insert(result)
            .clone()
    }

    /// Memoize a vector; failures are not cached.
    fn vector(
        &self,
        key: VectorKey,
        compute: impl FnOnce() -> Result<Vec<f64>, MetricError>,
    ) -> Result<Rc<[f64]>, MetricError> {
        let cached = self.vectors.borrow().get(&key).cloned();
        if let Some(values) = cached {
            return Ok(values);
        }

        let values: Rc<[f64]> = Rc::from(compute()?);
        self.record_computation(&key);
        Ok(Rc::clone(
            self.vectors.borrow_mut().entry(key).or_insert(values),
        ))
    }

    fn record_computation(&self, key: &(impl std::fmt::Debug + ?Sized)) {
        self.computations.set(self.computations.get() + 1);
        debug!(key = ?key, total = self.computations.get(), "Cache miss");
    }

    fn require_bench(&self, metric: &'static str) -> Result<&[f64], MetricError> {
        self.bench
            .as_deref()
            .ok_or(MetricError::BenchmarkRequired { metric })
    }

    fn effective_values(&self, values: &[f64]) -> Result<Vec<f64>, MetricError> {
        if self.is_resampled() {
            periodicity::resample_to_daily(
                &self.timestamps,
                values,
                self.config.day_boundary_hours,
            )
        } else {
            Ok(values.to_vec())
        }
    }
}
