//! Simulation calendar.
//!
//! One step is fifteen minutes. Months are eight days long and a year has twelve of them,
//! so calendar arithmetic stays integral.

use crate::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

pub const STEPS_PER_HOUR: i64 = 4;
pub const HOURS_PER_DAY: i64 = 24;
pub const DAYS_PER_MONTH: i64 = 8;
pub const MONTHS_PER_YEAR: i64 = 12;

pub const STEPS_PER_DAY: i64 = STEPS_PER_HOUR * HOURS_PER_DAY;
pub const STEPS_PER_MONTH: i64 = STEPS_PER_DAY * DAYS_PER_MONTH;
pub const STEPS_PER_YEAR: i64 = STEPS_PER_MONTH * MONTHS_PER_YEAR;

const MINUTES_PER_STEP: i64 = 60 / STEPS_PER_HOUR;
const STEP_TOLERANCE: f64 = 1e-14;

/// A point in (or span of) simulation time, counted in steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SimTime {
    steps: i64,
}

impl SimTime {
    pub const ZERO: Self = Self { steps: 0 };

    #[must_use]
    pub const fn from_steps(steps: i64) -> Self {
        Self { steps }
    }

    #[must_use]
    pub const fn hours(hours: i64) -> Self {
        Self { steps: hours * STEPS_PER_HOUR }
    }

    #[must_use]
    pub const fn days(days: i64) -> Self {
        Self { steps: days * STEPS_PER_DAY }
    }

    #[must_use]
    pub const fn months(months: i64) -> Self {
        Self { steps: months * STEPS_PER_MONTH }
    }

    #[must_use]
    pub const fn years(years: i64) -> Self {
        Self { steps: years * STEPS_PER_YEAR }
    }

    /// Starts a [`SpanBuilder`] for fractional calendar amounts.
    ///
    /// ```rust
    /// # use sim_domain::time::SimTime;
    /// let quarter_hour = SimTime::span().hours(0.25).build()?;
    /// assert_eq!(quarter_hour.steps(), 1);
    /// # Ok::<(), sim_domain::DomainError>(())
    /// ```
    #[must_use]
    pub const fn span() -> SpanBuilder {
        SpanBuilder { steps: 0.0, rounding: false }
    }

    #[must_use]
    pub const fn steps(self) -> i64 {
        self.steps
    }

    #[must_use]
    pub const fn year(self) -> i64 {
        self.steps.div_euclid(STEPS_PER_YEAR)
    }

    #[must_use]
    pub const fn month(self) -> i64 {
        self.steps.rem_euclid(STEPS_PER_YEAR) / STEPS_PER_MONTH
    }

    #[must_use]
    pub const fn day(self) -> i64 {
        self.steps.rem_euclid(STEPS_PER_MONTH) / STEPS_PER_DAY
    }

    #[must_use]
    pub const fn hour(self) -> i64 {
        self.steps.rem_euclid(STEPS_PER_DAY) / STEPS_PER_HOUR
    }

    #[must_use]
    pub const fn minute(self) -> i64 {
        self.steps.rem_euclid(STEPS_PER_HOUR) * MINUTES_PER_STEP
    }

    #[must_use]
    pub const fn is_top_of_year(self) -> bool {
        self.steps.rem_euclid(STEPS_PER_YEAR) == 0
    }

    #[must_use]
    pub const fn is_top_of_month(self) -> bool {
        self.steps.rem_euclid(STEPS_PER_MONTH) == 0
    }

    #[must_use]
    pub const fn is_top_of_day(self) -> bool {
        self.steps.rem_euclid(STEPS_PER_DAY) == 0
    }

    #[must_use]
    pub const fn is_top_of_hour(self) -> bool {
        self.steps.rem_euclid(STEPS_PER_HOUR) == 0
    }

    #[must_use]
    pub fn total_years(self) -> f64 {
        self.ratio(STEPS_PER_YEAR)
    }

    #[must_use]
    pub fn total_months(self) -> f64 {
        self.ratio(STEPS_PER_MONTH)
    }

    #[must_use]
    pub fn total_days(self) -> f64 {
        self.ratio(STEPS_PER_DAY)
    }

    #[must_use]
    pub fn total_hours(self) -> f64 {
        self.ratio(STEPS_PER_HOUR)
    }

    #[must_use]
    pub fn total_minutes(self) -> f64 {
        self.ratio(STEPS_PER_HOUR) * 60.0
    }

    #[allow(clippy::cast_precision_loss)]
    fn ratio(self, unit: i64) -> f64 {
        self.steps as f64 / unit as f64
    }
}

/// Accumulates fractional calendar amounts into a [`SimTime`].
#[must_use = "builders do nothing unless you call .build()"]
#[derive(Debug, Clone, Copy)]
pub struct SpanBuilder {
    steps: f64,
    rounding: bool,
}

impl SpanBuilder {
    #[allow(clippy::cast_precision_loss)]
    pub fn steps(mut self, steps: i64) -> Self {
        self.steps += steps as f64;
        self
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn hours(mut self, hours: f64) -> Self {
        self.steps += hours * STEPS_PER_HOUR as f64;
        self
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn days(mut self, days: f64) -> Self {
        self.steps += days * STEPS_PER_DAY as f64;
        self
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn months(mut self, months: f64) -> Self {
        self.steps += months * STEPS_PER_MONTH as f64;
        self
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn years(mut self, years: f64) -> Self {
        self.steps += years * STEPS_PER_YEAR as f64;
        self
    }

    /// Accept a non-integral total and round it to the nearest step.
    pub const fn rounding(mut self, enabled: bool) -> Self {
        self.rounding = enabled;
        self
    }

    /// # Errors
    /// Returns [`DomainError::NonIntegerSteps`] when the total is not finite, does not fit
    /// in an `i64`, or is not a whole number of steps and rounding is disabled.
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn build(self) -> Result<SimTime, DomainError> {
        let rounded = self.steps.round_ties_even();
        if !rounded.is_finite() || rounded.abs() >= i64::MAX as f64 {
            return Err(DomainError::NonIntegerSteps { steps: self.steps, context: None });
        }
        if !self.rounding && (self.steps - rounded).abs() > STEP_TOLERANCE {
            return Err(DomainError::NonIntegerSteps { steps: self.steps, context: None });
        }
        Ok(SimTime { steps: rounded as i64 })
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:05}-{:02}-{:02} {:02}:{:02}",
            self.year(),
            self.month(),
            self.day(),
            self.hour(),
            self.minute()
        )
    }
}

impl Add for SimTime {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self { steps: self.steps + rhs.steps }
    }
}

impl Add<i64> for SimTime {
    type Output = Self;

    fn add(self, rhs: i64) -> Self {
        Self { steps: self.steps + rhs }
    }
}

impl AddAssign<i64> for SimTime {
    fn add_assign(&mut self, rhs: i64) {
        self.steps += rhs;
    }
}

impl Sub for SimTime {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self { steps: self.steps - rhs.steps }
    }
}

impl Mul<i64> for SimTime {
    type Output = Self;

    fn mul(self, k: i64) -> Self {
        Self { steps: self.steps * k }
    }
}

impl Neg for SimTime {
    type Output = Self;

    fn neg(self) -> Self {
        Self { steps: -self.steps }
    }
}
