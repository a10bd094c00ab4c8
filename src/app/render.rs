//! 終端機文字畫面：步驟提示、結果畫面與機構清單。

use crate::core::session::{PatientDraft, Session, Step};
use crate::domain::model::{CapacityType, CareType, Facility, MatchResult};
use crate::utils::validation::ValidationErrors;
use std::fmt::Write;

const PROGRESS_WIDTH: usize = 20;

fn care_type_label(value: &str) -> String {
    value
        .parse::<CareType>()
        .map(|ct| ct.label().to_string())
        .unwrap_or_else(|_| value.to_string())
}

fn capacity_label(value: &str) -> String {
    value
        .parse::<CapacityType>()
        .map(|c| c.label().to_string())
        .unwrap_or_else(|_| value.to_string())
}

pub fn render_progress(session: &Session) -> String {
    let filled = PROGRESS_WIDTH * session.progress() as usize / 100;
    format!(
        "[{}{}] {}",
        "#".repeat(filled),
        "-".repeat(PROGRESS_WIDTH - filled),
        session.step_label()
    )
}

/// 各步驟的標題、說明與輸入提示
pub fn render_step_prompt(session: &Session) -> String {
    let mut out = String::new();
    if session.step() != Step::Result {
        let _ = writeln!(out, "CarePortal Beta - Find the right care facility for your needs");
        let _ = writeln!(out, "{}", render_progress(session));
    }

    match session.step() {
        Step::Name => {
            let _ = writeln!(out, "Patient Information");
            let _ = writeln!(
                out,
                "Enter the patient's full name to begin the matching process."
            );
            let _ = writeln!(out, "(Type ':quit' to exit.)");
            let _ = write!(out, "Patient Name: ");
        }
        Step::CareType => {
            let _ = writeln!(out, "Select the type of care the patient needs.");
            for (i, care_type) in CareType::ALL.iter().enumerate() {
                let _ = writeln!(
                    out,
                    "  {}) {} - {}",
                    i + 1,
                    care_type.label(),
                    care_type.description()
                );
            }
            let _ = write!(out, "Type of Care Needed: ");
        }
        Step::ZipCode => {
            let _ = writeln!(out, "Location Information");
            let _ = writeln!(
                out,
                "Enter the patient's zip code to find facilities in their area."
            );
            let _ = write!(out, "Patient Zip Code: ");
        }
        Step::Result => {
            let _ = write!(out, "Type 'restart' to start over, 'back' to go back or 'quit': ");
        }
    }
    out
}

pub fn render_field_errors(errors: &ValidationErrors) -> String {
    errors
        .errors()
        .iter()
        .map(|e| format!("  ✗ {}\n", e.message))
        .collect()
}

/// 結果畫面：病患資料與配對結果
pub fn render_match_result(patient: &PatientDraft, result: &MatchResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Match Results");
    let _ = writeln!(out);
    let _ = writeln!(out, "Patient Information");
    let _ = writeln!(out, "  Name: {}", patient.name);
    if let Some(care_type) = patient.care_type {
        let _ = writeln!(out, "  Care Type: {}", care_type.label());
        if care_type.requires_zip_code() && !patient.zip_code.is_empty() {
            let _ = writeln!(out, "  Zip Code: {}", patient.zip_code);
        }
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Match Result");

    match (&result.facility, result.matched) {
        (Some(facility), true) => {
            let care_types = facility
                .care_types
                .iter()
                .map(|ct| care_type_label(ct))
                .collect::<Vec<_>>()
                .join(", ");
            let _ = writeln!(out, "  We found a match!");
            let _ = writeln!(out, "  Facility: {}", facility.name);
            let _ = writeln!(out, "  Type of Care: {}", care_types);
            let _ = writeln!(out, "  Location: {}", facility.zip_code);
            let _ = writeln!(out, "  Capacity: {}", capacity_label(&facility.capacity));
            let _ = writeln!(
                out,
                "  Next Steps: The facility will contact you within 1-2 business days to schedule an initial consultation."
            );
        }
        _ => {
            let _ = writeln!(out, "  No matching facility found");
            let _ = writeln!(
                out,
                "  We couldn't find a suitable care facility based on your requirements. This might be because:"
            );
            let _ = writeln!(out, "   - All nearby facilities are at full capacity");
            let _ = writeln!(out, "   - There are no facilities in your area");
            let _ = writeln!(out, "   - The care type you selected is not available near you");
            let _ = writeln!(
                out,
                "  Recommendation: Try a different care type or contact our support team at 1-800-CARE-HELP for personalized assistance."
            );
        }
    }
    out
}

pub fn render_facility(facility: &Facility) -> String {
    let mut out = String::new();
    let care_types = if facility.care_types.is_empty() {
        "None".to_string()
    } else {
        facility
            .care_types
            .iter()
            .map(|ct| ct.label())
            .collect::<Vec<_>>()
            .join(", ")
    };

    let _ = writeln!(out, "{} [{}]", facility.name, facility.capacity.label());
    let _ = writeln!(out, "  ID: {}", facility.id);
    let _ = writeln!(out, "  Facility Zip Code: {}", facility.zip_code);
    let _ = writeln!(out, "  Care Types: {}", care_types);
    if facility.zip_code_ranges.is_empty() {
        let _ = writeln!(out, "  Service Areas: No service areas defined");
    } else {
        let _ = writeln!(out, "  Service Areas:");
        for range in &facility.zip_code_ranges {
            let _ = writeln!(out, "    {}", range);
        }
    }
    out
}

pub fn render_facility_list(facilities: &[Facility]) -> String {
    if facilities.is_empty() {
        return "No facilities found.\n".to_string();
    }
    facilities
        .iter()
        .map(render_facility)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::session::StepInput;
    use crate::domain::model::{MatchedFacility, ZipCodeRange};

    fn patient(care_type: CareType, zip_code: &str) -> PatientDraft {
        PatientDraft {
            name: "Jane Doe".to_string(),
            care_type: Some(care_type),
            zip_code: zip_code.to_string(),
        }
    }

    #[test]
    fn test_render_progress_bar() {
        let mut session = Session::new();
        assert_eq!(render_progress(&session), "[--------------------] Step 1 of 3");
        session.advance(StepInput::Name("Jane".into())).unwrap();
        assert_eq!(render_progress(&session), "[######--------------] Step 2 of 3");
    }

    #[test]
    fn test_render_matched_result_uses_labels() {
        let result = MatchResult {
            matched: true,
            facility: Some(MatchedFacility {
                id: "f-1".into(),
                name: "Sunrise Care".into(),
                capacity: "available".into(),
                zip_code: "12000".into(),
                care_types: vec!["day_care".into(), "hospice".into()],
                zip_code_ranges: vec![ZipCodeRange::new(10000, 14999)],
            }),
        };

        let text = render_match_result(&patient(CareType::Ambulatory, "12345"), &result);
        assert!(text.contains("We found a match!"));
        assert!(text.contains("Type of Care: Day Care, hospice"));
        assert!(text.contains("Capacity: Available"));
        assert!(text.contains("Zip Code: 12345"));
    }

    #[test]
    fn test_render_unmatched_day_care_result_hides_zip() {
        let result = MatchResult {
            matched: false,
            facility: None,
        };
        let text = render_match_result(&patient(CareType::DayCare, "99999"), &result);
        assert!(text.contains("No matching facility found"));
        assert!(text.contains("Care Type: Day Care"));
        assert!(!text.contains("Zip Code"));
    }

    #[test]
    fn test_render_facility_list() {
        assert_eq!(render_facility_list(&[]), "No facilities found.\n");

        let facility = Facility {
            id: "f-9".into(),
            name: "Harbor House".into(),
            zip_code: "30301".into(),
            capacity: CapacityType::Full,
            care_types: vec![],
            zip_code_ranges: vec![ZipCodeRange::new(501, 30399)],
        };
        let text = render_facility_list(&[facility]);
        assert!(text.contains("Harbor House [Full]"));
        assert!(text.contains("Care Types: None"));
        assert!(text.contains("00501 - 30399"));
    }
}
