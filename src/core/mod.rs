pub mod adapter;
pub mod schema;
pub mod session;
pub mod wizard;

pub use crate::domain::model::{FacilityMatchResponse, MatchRequest, MatchResult, PatientInput};
pub use crate::domain::ports::{ConfigProvider, FacilityStore, MatchService};
pub use crate::utils::error::Result;
