//! 病患表單與機構表單的驗證規則。
//!
//! 每個步驟各有一個欄位驗證函式，送出前再以 [`validate_patient_form`] 驗證整份表單，
//! 郵遞區號是否必填取決於照護類型。

use crate::core::session::PatientDraft;
use crate::domain::model::{
    CapacityType, CareType, FacilityCreate, FacilityUpdate, PatientInput, ZipCodeRange,
};
use crate::utils::error::{CareMatchError, Result};
use crate::utils::validation::ValidationErrors;
use regex::Regex;
use std::sync::LazyLock;

static ZIP_CODE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{5}$").expect("zip code pattern is valid"));

pub const NAME_MIN_CHARS: usize = 2;
pub const FACILITY_NAME_MAX_CHARS: usize = 100;

pub const NAME_TOO_SHORT: &str = "Name must be at least 2 characters.";
pub const CARE_TYPE_REQUIRED: &str = "Please select a type of care.";
pub const ZIP_CODE_INVALID: &str = "Please enter a valid 5-digit zip code.";
pub const ZIP_CODE_REQUIRED: &str = "Zip code is required for stationary and ambulatory care";

pub fn is_valid_zip_code(value: &str) -> bool {
    ZIP_CODE_PATTERN.is_match(value)
}

pub fn validate_name(name: &str) -> Result<()> {
    if name.chars().count() < NAME_MIN_CHARS {
        return ValidationErrors::single("name", NAME_TOO_SHORT).into_result();
    }
    Ok(())
}

pub fn validate_care_type(care_type: Option<CareType>) -> Result<CareType> {
    care_type.ok_or_else(|| {
        CareMatchError::ValidationError(ValidationErrors::single("careType", CARE_TYPE_REQUIRED))
    })
}

pub fn validate_zip_code(zip_code: &str) -> Result<()> {
    if !is_valid_zip_code(zip_code) {
        return ValidationErrors::single("zipCode", ZIP_CODE_INVALID).into_result();
    }
    Ok(())
}

/// 整份表單驗證；日間照護會捨棄草稿中殘留的郵遞區號
pub fn validate_patient_form(draft: &PatientDraft) -> Result<PatientInput> {
    let mut errors = ValidationErrors::new();

    if let Err(CareMatchError::ValidationError(e)) = validate_name(&draft.name) {
        errors.extend(e);
    }

    let Some(care_type) = draft.care_type else {
        errors.add("careType", CARE_TYPE_REQUIRED);
        return Err(CareMatchError::ValidationError(errors));
    };

    let zip_code = if care_type.requires_zip_code() {
        let zip = draft.zip_code.trim();
        if zip.is_empty() {
            errors.add("zipCode", ZIP_CODE_REQUIRED);
        } else if !is_valid_zip_code(zip) {
            errors.add("zipCode", ZIP_CODE_INVALID);
        }
        Some(zip.to_string())
    } else {
        None
    };

    errors.into_result()?;

    Ok(PatientInput {
        name: draft.name.clone(),
        care_type,
        zip_code,
    })
}

/// 管理端新增機構時填寫的原始欄位
#[derive(Debug, Clone, PartialEq)]
pub struct FacilityForm {
    pub name: String,
    pub capacity: Option<CapacityType>,
    pub zip_code: String,
    pub care_types: Vec<CareType>,
    pub min_zip_code: String,
    pub max_zip_code: String,
}

impl Default for FacilityForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            capacity: Some(CapacityType::Available),
            zip_code: String::new(),
            care_types: Vec::new(),
            min_zip_code: String::new(),
            max_zip_code: String::new(),
        }
    }
}

fn check_facility_name(name: &str, errors: &mut ValidationErrors) {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        errors.add("name", "Facility name is required");
    } else if trimmed.chars().count() > FACILITY_NAME_MAX_CHARS {
        errors.add("name", "Facility name must be 100 characters or less");
    }
}

fn check_zip(field: &str, value: &str, message: &str, errors: &mut ValidationErrors) -> Option<u32> {
    let trimmed = value.trim();
    match trimmed.parse::<u32>() {
        Ok(zip) if is_valid_zip_code(trimmed) => Some(zip),
        _ => {
            errors.add(field, message);
            None
        }
    }
}

fn check_range(range: ZipCodeRange, errors: &mut ValidationErrors) {
    if range.min_zip_code > range.max_zip_code {
        errors.add(
            "min_zip_code",
            "Minimum zip code must be less than or equal to maximum zip code",
        );
        errors.add(
            "max_zip_code",
            "Maximum zip code must be greater than or equal to minimum zip code",
        );
    }
}

impl FacilityForm {
    pub fn validate(&self) -> Result<FacilityCreate> {
        let mut errors = ValidationErrors::new();

        check_facility_name(&self.name, &mut errors);

        if self.capacity.is_none() {
            errors.add("capacity", "Please select a capacity status");
        }

        check_zip(
            "zip_code",
            &self.zip_code,
            "Please enter a valid 5-digit zip code",
            &mut errors,
        );

        if self.care_types.is_empty() {
            errors.add("care_types", "Please select at least one care type");
        }

        let min = check_zip(
            "min_zip_code",
            &self.min_zip_code,
            "Please enter a valid 5-digit minimum zip code",
            &mut errors,
        );
        let max = check_zip(
            "max_zip_code",
            &self.max_zip_code,
            "Please enter a valid 5-digit maximum zip code",
            &mut errors,
        );

        let range = match (min, max) {
            (Some(min), Some(max)) => {
                let range = ZipCodeRange::new(min, max);
                check_range(range, &mut errors);
                Some(range)
            }
            _ => None,
        };

        errors.into_result()?;

        let mut care_types = Vec::with_capacity(self.care_types.len());
        for care_type in &self.care_types {
            if !care_types.contains(care_type) {
                care_types.push(*care_type);
            }
        }

        Ok(FacilityCreate {
            name: self.name.trim().to_string(),
            zip_code: self.zip_code.trim().to_string(),
            capacity: self.capacity.unwrap_or(CapacityType::Available),
            care_types,
            zip_code_ranges: range.into_iter().collect(),
        })
    }
}

/// 只驗證有提供的欄位
pub fn validate_facility_update(update: &FacilityUpdate) -> Result<()> {
    let mut errors = ValidationErrors::new();

    if let Some(name) = &update.name {
        check_facility_name(name, &mut errors);
    }

    if let Some(zip_code) = &update.zip_code {
        check_zip(
            "zip_code",
            zip_code,
            "Please enter a valid 5-digit zip code",
            &mut errors,
        );
    }

    if let Some(care_types) = &update.care_types {
        if care_types.is_empty() {
            errors.add("care_types", "Please select at least one care type");
        }
    }

    if let Some(ranges) = &update.zip_code_ranges {
        for range in ranges {
            check_range(*range, &mut errors);
        }
    }

    if update.is_empty() {
        errors.add("update", "Provide at least one field to update");
    }

    errors.into_result()
}
