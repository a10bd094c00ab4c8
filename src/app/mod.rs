pub mod admin;
pub mod intake;
pub mod interrupt;
pub mod render;

pub use admin::FacilityAdmin;
pub use intake::{submit_intake, IntakeRunner};
pub use interrupt::Interrupt;
