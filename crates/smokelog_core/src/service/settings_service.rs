//! User goal settings over the prefixed key/value store.
//!
//! # Responsibility
//! - Load, save and clear the `settings` entry.
//! - Reject out-of-range goals before anything is written.
//!
//! # Invariants
//! - `load` always yields valid settings; a missing, undecodable or
//!   out-of-range entry falls back to defaults.
//! - A failed `save` leaves the stored entry untouched.

use crate::model::settings::{Settings, SettingsValidationError};
use crate::repo::kv_repo::SqliteKvStore;
use crate::repo::record_repo::RepoError;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Key under which settings are stored.
pub const SETTINGS_KEY: &str = "settings";

#[derive(Debug)]
pub enum SettingsError {
    Invalid(Vec<SettingsValidationError>),
    Repo(RepoError),
}

impl Display for SettingsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid(errors) => {
                let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
                write!(f, "invalid settings: {}", messages.join("; "))
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SettingsError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Invalid(errors) => errors.first().map(|err| err as &(dyn Error + 'static)),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for SettingsError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

pub type SettingsResult<T> = Result<T, SettingsError>;

pub struct SettingsService<'conn> {
    kv: SqliteKvStore<'conn>,
}

impl<'conn> SettingsService<'conn> {
    pub fn new(kv: SqliteKvStore<'conn>) -> Self {
        Self { kv }
    }

    /// Returns stored settings, or defaults when none are usable.
    pub fn load(&self) -> SettingsResult<Settings> {
        let Some(settings) = self.kv.get::<Settings>(SETTINGS_KEY)? else {
            return Ok(Settings::default());
        };
        if let Err(errors) = settings.validate() {
            warn!(
                "event=settings_load module=service status=fallback invalid_fields={}",
                errors.len()
            );
            return Ok(Settings::default());
        }
        Ok(settings)
    }

    pub fn save(&self, settings: &Settings) -> SettingsResult<()> {
        settings.validate().map_err(SettingsError::Invalid)?;
        self.kv.set(SETTINGS_KEY, settings, None)?;
        info!("event=settings_save module=service status=ok");
        Ok(())
    }

    /// Applies the given goals on top of the current settings and saves.
    pub fn update(
        &self,
        daily_goal: Option<u32>,
        monthly_budget_goal: Option<u32>,
    ) -> SettingsResult<Settings> {
        let mut settings = self.load()?;
        if let Some(goal) = daily_goal {
            settings.daily_goal = goal;
        }
        if let Some(goal) = monthly_budget_goal {
            settings.monthly_budget_goal = goal;
        }
        self.save(&settings)?;
        Ok(settings)
    }

    /// Removes stored settings; later loads return defaults.
    pub fn clear(&self) -> SettingsResult<()> {
        self.kv.remove(SETTINGS_KEY)?;
        info!("event=settings_clear module=service status=ok");
        Ok(())
    }
}
