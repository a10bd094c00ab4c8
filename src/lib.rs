pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::ApiClient;
pub use app::{FacilityAdmin, IntakeRunner};
pub use config::{ClientSettings, SettingsOverrides};
pub use crate::core::wizard::IntakeWizard;
pub use utils::error::{CareMatchError, Result};
