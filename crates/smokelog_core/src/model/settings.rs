//! User goals shown next to the statistics.
//!
//! # Invariants
//! - `daily_goal` is within `1..=100` cigarettes.
//! - `monthly_budget_goal` is within `1..=1_000_000` currency units.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::ops::RangeInclusive;

pub const DEFAULT_DAILY_GOAL: u32 = 20;
pub const DEFAULT_MONTHLY_BUDGET_GOAL: u32 = 15_000;
pub const DAILY_GOAL_RANGE: RangeInclusive<u32> = 1..=100;
pub const MONTHLY_BUDGET_GOAL_RANGE: RangeInclusive<u32> = 1..=1_000_000;

/// Persisted user goals. Field names stay camelCase on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub daily_goal: u32,
    pub monthly_budget_goal: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            daily_goal: DEFAULT_DAILY_GOAL,
            monthly_budget_goal: DEFAULT_MONTHLY_BUDGET_GOAL,
        }
    }
}

impl Settings {
    /// Checks every goal, reporting each one that is out of range.
    pub fn validate(&self) -> Result<(), Vec<SettingsValidationError>> {
        let errors: Vec<_> = [
            check_daily_goal(self.daily_goal),
            check_monthly_budget_goal(self.monthly_budget_goal),
        ]
        .into_iter()
        .filter_map(Result::err)
        .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// A goal outside its accepted range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsValidationError {
    DailyGoalOutOfRange(u32),
    MonthlyBudgetGoalOutOfRange(u32),
}

impl Display for SettingsValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DailyGoalOutOfRange(value) => write!(
                f,
                "daily goal {value} must be between {} and {}",
                DAILY_GOAL_RANGE.start(),
                DAILY_GOAL_RANGE.end()
            ),
            Self::MonthlyBudgetGoalOutOfRange(value) => write!(
                f,
                "monthly budget goal {value} must be between {} and {}",
                MONTHLY_BUDGET_GOAL_RANGE.start(),
                MONTHLY_BUDGET_GOAL_RANGE.end()
            ),
        }
    }
}

impl Error for SettingsValidationError {}

/// Validates a single daily goal, e.g. while the user is still editing.
pub fn check_daily_goal(value: u32) -> Result<u32, SettingsValidationError> {
    if DAILY_GOAL_RANGE.contains(&value) {
        Ok(value)
    } else {
        Err(SettingsValidationError::DailyGoalOutOfRange(value))
    }
}

pub fn check_monthly_budget_goal(value: u32) -> Result<u32, SettingsValidationError> {
    if MONTHLY_BUDGET_GOAL_RANGE.contains(&value) {
        Ok(value)
    } else {
        Err(SettingsValidationError::MonthlyBudgetGoalOutOfRange(value))
    }
}
