use crate::config::SettingsOverrides;
use crate::core::schema::FacilityForm;
use crate::core::session::PatientDraft;
use crate::domain::model::{CapacityType, CareType, FacilityQuery, FacilityUpdate, ZipCodeRange};
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "care-match")]
#[command(about = "Match patients with care facilities and manage the facility registry")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Base URL of the matching API (overrides CARE_MATCH_API_BASE_URL and the config file)
    #[arg(long)]
    pub api_base_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run the patient intake form and find a matching facility
    Intake(IntakeArgs),

    /// Manage care facilities
    Facility {
        #[command(subcommand)]
        command: FacilityCommand,
    },
}

/// 三個欄位都齊全 (日間照護不需郵遞區號) 時不會進入互動模式
#[derive(Debug, Clone, Args)]
pub struct IntakeArgs {
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub care_type: Option<CareType>,

    #[arg(long)]
    pub zip_code: Option<String>,
}

impl IntakeArgs {
    pub fn is_complete(&self) -> bool {
        match (&self.name, self.care_type) {
            (Some(_), Some(care_type)) => !care_type.requires_zip_code() || self.zip_code.is_some(),
            _ => false,
        }
    }

    pub fn to_draft(&self) -> PatientDraft {
        PatientDraft {
            name: self.name.clone().unwrap_or_default(),
            care_type: self.care_type,
            zip_code: self.zip_code.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
pub enum FacilityCommand {
    /// Create a facility
    Create {
        #[arg(long)]
        name: String,

        #[arg(long)]
        zip_code: String,

        #[arg(long, default_value = "available")]
        capacity: CapacityType,

        #[arg(long, value_delimiter = ',', required = true)]
        care_types: Vec<CareType>,

        #[arg(long)]
        min_zip: String,

        #[arg(long)]
        max_zip: String,
    },

    /// List facilities
    List {
        #[arg(long)]
        skip: Option<u32>,

        #[arg(long, default_value = "100")]
        limit: u32,

        #[arg(long)]
        capacity: Option<CapacityType>,

        #[arg(long)]
        care_type: Option<CareType>,

        #[arg(long)]
        zip_code: Option<String>,
    },

    /// Show a single facility
    Get { id: String },

    /// Update selected fields of a facility
    Update {
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        zip_code: Option<String>,

        #[arg(long)]
        capacity: Option<CapacityType>,

        #[arg(long, value_delimiter = ',')]
        care_types: Option<Vec<CareType>>,

        /// Served zip code range as MIN-MAX, repeatable
        #[arg(long = "zip-range")]
        zip_ranges: Vec<ZipCodeRange>,
    },

    /// Delete a facility
    Delete { id: String },
}

impl CliConfig {
    pub fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            config_path: self.config.clone(),
            api_base_url: self.api_base_url.clone(),
            timeout_seconds: self.timeout,
            verbose: self.verbose,
            json_logs: self.json_logs,
        }
    }
}

impl FacilityCommand {
    pub fn to_form(&self) -> Option<FacilityForm> {
        match self {
            FacilityCommand::Create {
                name,
                zip_code,
                capacity,
                care_types,
                min_zip,
                max_zip,
            } => Some(FacilityForm {
                name: name.clone(),
                capacity: Some(*capacity),
                zip_code: zip_code.clone(),
                care_types: care_types.clone(),
                min_zip_code: min_zip.clone(),
                max_zip_code: max_zip.clone(),
            }),
            _ => None,
        }
    }

    pub fn to_query(&self) -> Option<FacilityQuery> {
        match self {
            FacilityCommand::List {
                skip,
                limit,
                capacity,
                care_type,
                zip_code,
            } => Some(FacilityQuery {
                skip: *skip,
                limit: *limit,
                capacity: *capacity,
                care_type: *care_type,
                zip_code: zip_code.clone(),
            }),
            _ => None,
        }
    }

    pub fn to_update(&self) -> Option<FacilityUpdate> {
        match self {
            FacilityCommand::Update {
                name,
                zip_code,
                capacity,
                care_types,
                zip_ranges,
                ..
            } => Some(FacilityUpdate {
                name: name.clone(),
                zip_code: zip_code.clone(),
                capacity: *capacity,
                care_types: care_types.clone(),
                zip_code_ranges: if zip_ranges.is_empty() {
                    None
                } else {
                    Some(zip_ranges.clone())
                },
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_intake_flags() {
        let cli = CliConfig::try_parse_from([
            "care-match",
            "--api-base-url",
            "http://localhost:9000",
            "intake",
            "--name",
            "Jane Doe",
            "--care-type",
            "day_care",
        ])
        .unwrap();

        assert_eq!(cli.overrides().api_base_url.as_deref(), Some("http://localhost:9000"));
        match cli.command {
            Command::Intake(args) => {
                assert_eq!(args.care_type, Some(CareType::DayCare));
                assert!(args.is_complete());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_intake_without_zip_is_incomplete_for_stationary() {
        let args = IntakeArgs {
            name: Some("Jane".into()),
            care_type: Some(CareType::Stationary),
            zip_code: None,
        };
        assert!(!args.is_complete());
    }

    #[test]
    fn test_parse_facility_create() {
        let cli = CliConfig::try_parse_from([
            "care-match",
            "facility",
            "create",
            "--name",
            "Sunrise Care",
            "--zip-code",
            "10115",
            "--care-types",
            "stationary,day_care",
            "--min-zip",
            "10000",
            "--max-zip",
            "10999",
        ])
        .unwrap();

        let Command::Facility { command } = cli.command else {
            panic!("expected facility command");
        };
        let form = command.to_form().unwrap();
        assert_eq!(form.capacity, Some(CapacityType::Available));
        assert_eq!(form.care_types, vec![CareType::Stationary, CareType::DayCare]);
    }

    #[test]
    fn test_parse_facility_update_ranges() {
        let cli = CliConfig::try_parse_from([
            "care-match",
            "facility",
            "update",
            "f-1",
            "--capacity",
            "full",
            "--zip-range",
            "10000-10999",
            "--zip-range",
            "20000-20999",
        ])
        .unwrap();

        let Command::Facility { command } = cli.command else {
            panic!("expected facility command");
        };
        let update = command.to_update().unwrap();
        assert_eq!(update.capacity, Some(CapacityType::Full));
        assert_eq!(update.name, None);
        assert_eq!(
            update.zip_code_ranges,
            Some(vec![
                ZipCodeRange::new(10000, 10999),
                ZipCodeRange::new(20000, 20999)
            ])
        );
    }
}
