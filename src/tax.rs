//! Progressive tax schedule and relief allowance.
//!
//! The `tax` module holds the bracket schedule and the two pieces of
//! arithmetic the service builds on: the Consolidated Relief Allowance
//! and the progressive bracket walk.

use thiserror::Error;

/// A band of income taxed at a single rate.
///
/// `width` is the amount of income that falls into this band, not a
/// cumulative ceiling.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaxBracket {
    pub width: f64,
    pub rate: f64,
}

impl TaxBracket {
    pub const fn new(width: f64, rate: f64) -> Self {
        Self { width, rate }
    }
}

/// Problems with a hand-built schedule.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScheduleError {
    #[error("a tax schedule needs at least one bracket")]
    Empty,
    #[error("bracket {index} has invalid width {width}")]
    InvalidWidth { index: usize, width: f64 },
    #[error("bracket {index} has rate {rate} outside [0, 1]")]
    InvalidRate { index: usize, rate: f64 },
    #[error("top rate {0} outside [0, 1]")]
    InvalidTopRate(f64),
}

/// Ordered brackets plus the rate applied to income beyond all of them.
///
/// Brackets are consumed in the order given; the schedule is never
/// sorted.  The only way to build one is [`TaxSchedule::new`] or the
/// built-in [`TaxSchedule::nigeria`].
#[derive(Debug, Clone, PartialEq)]
pub struct TaxSchedule {
    brackets: Vec<TaxBracket>,
    top_rate: f64,
}

fn valid_rate(rate: f64) -> bool {
    (0.0..=1.0).contains(&rate)
}

impl TaxSchedule {
    pub fn new(brackets: Vec<TaxBracket>, top_rate: f64) -> Result<Self, ScheduleError> {
        if brackets.is_empty() {
            return Err(ScheduleError::Empty);
        }
        for (index, bracket) in brackets.iter().enumerate() {
            if !bracket.width.is_finite() || bracket.width < 0.0 {
                return Err(ScheduleError::InvalidWidth { index, width: bracket.width });
            }
            if !valid_rate(bracket.rate) {
                return Err(ScheduleError::InvalidRate { index, rate: bracket.rate });
            }
        }
        if !valid_rate(top_rate) {
            return Err(ScheduleError::InvalidTopRate(top_rate));
        }
        Ok(Self { brackets, top_rate })
    }

    /// The Nigerian personal income tax schedule.
    pub fn nigeria() -> Self {
        Self {
            brackets: vec![
                TaxBracket::new(300_000.0, 0.07),
                TaxBracket::new(300_000.0, 0.11),
                TaxBracket::new(500_000.0, 0.15),
                TaxBracket::new(500_000.0, 0.19),
                TaxBracket::new(1_600_000.0, 0.21),
                TaxBracket::new(3_200_000.0, 0.24),
            ],
            top_rate: 0.24,
        }
    }

    pub fn brackets(&self) -> &[TaxBracket] {
        &self.brackets
    }

    pub fn top_rate(&self) -> f64 {
        self.top_rate
    }
}

impl Default for TaxSchedule {
    fn default() -> Self {
        Self::nigeria()
    }
}

/// Relief floor in the CRA formula.
const CRA_FLOOR: f64 = 200_000.0;
const CRA_GROSS_SHARE: f64 = 0.01;
const CRA_RELIEF_SHARE: f64 = 0.20;

/// Computes relief and progressive tax for a fixed schedule.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaxEngine {
    schedule: TaxSchedule,
}

impl TaxEngine {
    /// Engine over the default six-bracket schedule.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schedule(schedule: TaxSchedule) -> Self {
        Self { schedule }
    }

    pub fn schedule(&self) -> &TaxSchedule {
        &self.schedule
    }

    /// Consolidated Relief Allowance:
    /// `max(200_000, 1% of gross) + 20% of gross`.
    ///
    /// `gross_income` is expected to be non-negative.
    pub fn calculate_cra(&self, gross_income: f64) -> f64 {
        CRA_FLOOR.max(CRA_GROSS_SHARE * gross_income) + CRA_RELIEF_SHARE * gross_income
    }

    /// Tax owed on `taxable_income`, consuming brackets in order and
    /// taxing whatever is left at the schedule's top rate.
    pub fn calculate_progressive_tax(&self, taxable_income: f64) -> f64 {
        let mut total = 0.0;
        let mut remaining = taxable_income;

        for bracket in &self.schedule.brackets {
            if remaining <= 0.0 {
                break;
            }
            let taxed = remaining.min(bracket.width);
            total += taxed * bracket.rate;
            remaining -= taxed;
        }

        if remaining > 0.0 {
            total += remaining * self.schedule.top_rate;
        }
        total
    }
}
