//! 表單工作階段與步驟狀態機。
//!
//! 步驟依序為 `name → careType → zipCode → result`，日間照護在 `careType`
//! 直接送出配對請求並跳到 `result`。需要呼叫遠端時 [`Session::advance`] 會回傳
//! [`Submission`]，由呼叫端送出請求後再以 [`Session::complete`] 套用結果。

use crate::core::adapter::adapt;
use crate::core::schema;
use crate::domain::model::{CareType, FacilityMatchResponse, MatchRequest, MatchResult};
use crate::utils::error::{CareMatchError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Step {
    #[default]
    Name,
    CareType,
    ZipCode,
    Result,
}

pub const FORM_STEPS: [Step; 4] = [Step::Name, Step::CareType, Step::ZipCode, Step::Result];

impl Step {
    pub fn index(&self) -> usize {
        match self {
            Step::Name => 0,
            Step::CareType => 1,
            Step::ZipCode => 2,
            Step::Result => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Step::Name => "name",
            Step::CareType => "careType",
            Step::ZipCode => "zipCode",
            Step::Result => "result",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 尚未驗證的表單值
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatientDraft {
    pub name: String,
    pub care_type: Option<CareType>,
    pub zip_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepInput {
    Name(String),
    CareType(Option<CareType>),
    ZipCode(String),
}

impl StepInput {
    fn action(&self) -> &'static str {
        match self {
            StepInput::Name(_) => "enter a name",
            StepInput::CareType(_) => "select a care type",
            StepInput::ZipCode(_) => "enter a zip code",
        }
    }
}

/// 一次進行中的配對請求，`generation` 用來判斷回應是否已過期
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    generation: u64,
    request: MatchRequest,
}

impl Submission {
    pub fn request(&self) -> &MatchRequest {
        &self.request
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    Moved(Step),
    Submit(Submission),
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    step: Step,
    draft: PatientDraft,
    submitting: bool,
    generation: u64,
    last_response: Option<MatchResult>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn draft(&self) -> &PatientDraft {
        &self.draft
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn last_response(&self) -> Option<&MatchResult> {
        self.last_response.as_ref()
    }

    /// 驗證目前步驟的輸入並前進；失敗時步驟不變
    pub fn advance(&mut self, input: StepInput) -> Result<Advance> {
        if self.submitting {
            return Err(CareMatchError::SubmissionInFlight);
        }

        match (self.step, input) {
            (Step::Name, StepInput::Name(name)) => {
                self.draft.name = name;
                schema::validate_name(&self.draft.name)?;
                Ok(self.move_to(Step::CareType))
            }
            (Step::CareType, StepInput::CareType(care_type)) => {
                self.draft.care_type = care_type;
                let care_type = schema::validate_care_type(care_type)?;
                if care_type.requires_zip_code() {
                    Ok(self.move_to(Step::ZipCode))
                } else {
                    self.begin_submission()
                }
            }
            (Step::ZipCode, StepInput::ZipCode(zip_code)) => {
                self.draft.zip_code = zip_code;
                schema::validate_zip_code(&self.draft.zip_code)?;
                self.begin_submission()
            }
            (step, input) => Err(CareMatchError::InvalidTransition {
                step,
                action: input.action(),
            }),
        }
    }

    /// 套用遠端回應；過期的 ticket 會被丟棄
    pub fn complete(
        &mut self,
        submission: Submission,
        outcome: Result<FacilityMatchResponse>,
    ) -> Result<Step> {
        if !self.submitting || submission.generation != self.generation {
            tracing::warn!(
                "Discarding match response for cancelled submission #{} (current #{})",
                submission.generation,
                self.generation
            );
            return Err(CareMatchError::SubmissionCancelled);
        }

        self.submitting = false;

        match outcome {
            Ok(response) => {
                self.last_response = adapt(Some(&response));
                tracing::debug!("Match response applied: matched={}", response.matched);
                Ok(self.set_step(Step::Result))
            }
            Err(e) => {
                tracing::debug!("Match request failed on step {}: {}", self.step, e);
                Err(e)
            }
        }
    }

    /// 上一步；若有進行中的請求會一併取消
    pub fn back(&mut self) -> Step {
        self.cancel();

        let previous = match self.step {
            Step::Name | Step::CareType => Step::Name,
            Step::ZipCode => Step::CareType,
            Step::Result => match self.draft.care_type {
                Some(CareType::DayCare) => Step::CareType,
                _ => Step::ZipCode,
            },
        };
        self.set_step(previous)
    }

    /// 取消進行中的請求，回傳是否真的有請求被取消
    pub fn cancel(&mut self) -> bool {
        if !self.submitting {
            return false;
        }
        self.submitting = false;
        self.generation += 1;
        tracing::info!("Cancelled in-flight match request on step {}", self.step);
        true
    }

    pub fn reset(&mut self) {
        let generation = self.generation + 1;
        *self = Self {
            generation,
            ..Self::default()
        };
    }

    /// 進度百分比 (result 為 100)
    pub fn progress(&self) -> u8 {
        let total = (FORM_STEPS.len() - 1) as f64;
        ((self.step.index() as f64 / total) * 100.0).round() as u8
    }

    /// 例如 "Step 1 of 3"
    pub fn step_label(&self) -> String {
        format!("Step {} of {}", self.step.index() + 1, FORM_STEPS.len() - 1)
    }

    fn begin_submission(&mut self) -> Result<Advance> {
        let input = schema::validate_patient_form(&self.draft)?;
        self.submitting = true;
        self.generation += 1;

        tracing::debug!(
            "Submitting match request #{} for care type {}",
            self.generation,
            input.care_type()
        );

        Ok(Advance::Submit(Submission {
            generation: self.generation,
            request: MatchRequest::from(&input),
        }))
    }

    fn move_to(&mut self, step: Step) -> Advance {
        Advance::Moved(self.set_step(step))
    }

    fn set_step(&mut self, step: Step) -> Step {
        if self.step != step {
            tracing::info!("Form step {} -> {}", self.step, step);
        }
        self.step = step;
        step
    }
}
