//! 病患表單的終端機互動流程。
//!
//! 每一步印出標題與提示，讀一行輸入交給 [`IntakeWizard`]。指令 `back`、
//! `restart`、`quit` 可加上 `:` 前綴在任何步驟使用；姓名步驟只認得有前綴的
//! 寫法，其餘輸入一律當作姓名。欄位錯誤顯示在欄位下方，遠端錯誤以通知方式顯示
//! 且停留在原步驟。

use crate::app::render;
use crate::core::session::{PatientDraft, Step, StepInput};
use crate::core::wizard::IntakeWizard;
use crate::domain::model::{CareType, MatchResult};
use crate::domain::ports::MatchService;
use crate::utils::error::{CareMatchError, Result};
use std::future::Future;
use std::io::{BufRead, Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormCommand {
    Back,
    Restart,
    Quit,
}

impl FormCommand {
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        Self::parse_word(input.strip_prefix(':').unwrap_or(input))
    }

    /// 依目前步驟解析：姓名可能剛好是 `back`、`q` 之類的字，只接受 `:` 前綴
    pub fn parse_at(step: Step, input: &str) -> Option<Self> {
        match step {
            Step::Name => input.trim().strip_prefix(':').and_then(Self::parse_word),
            _ => Self::parse(input),
        }
    }

    fn parse_word(word: &str) -> Option<Self> {
        match word.trim().to_ascii_lowercase().as_str() {
            "back" | "b" => Some(FormCommand::Back),
            "restart" | "reset" => Some(FormCommand::Restart),
            "quit" | "exit" | "q" => Some(FormCommand::Quit),
            _ => None,
        }
    }
}

/// 選單編號 (1 起算，依畫面順序) 或照護類型名稱；其他輸入視為未選擇
pub fn parse_care_type_choice(input: &str) -> Option<CareType> {
    let input = input.trim();
    if let Ok(number) = input.parse::<usize>() {
        return number
            .checked_sub(1)
            .and_then(|i| CareType::ALL.get(i))
            .copied();
    }
    input.parse().ok()
}

pub struct IntakeRunner<M: MatchService, R: BufRead, W: Write> {
    wizard: IntakeWizard<M>,
    input: R,
    output: W,
}

impl<M: MatchService, R: BufRead, W: Write> IntakeRunner<M, R, W> {
    pub fn new(service: M, input: R, output: W) -> Self {
        Self {
            wizard: IntakeWizard::new(service),
            input,
            output,
        }
    }

    pub fn wizard(&self) -> &IntakeWizard<M> {
        &self.wizard
    }

    pub fn into_output(self) -> W {
        self.output
    }

    pub async fn run(&mut self) -> Result<Option<MatchResult>> {
        self.run_with_cancel(|| std::future::pending::<()>()).await
    }

    /// 執行到使用者離開或輸入結束，回傳最後一次的配對結果。
    /// 每次送出請求都會呼叫 `cancel` 產生一個取消訊號 (例如 Ctrl-C)。
    pub async fn run_with_cancel<F, Fut>(&mut self, cancel: F) -> Result<Option<MatchResult>>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = ()>,
    {
        tracing::info!("🚀 Starting patient intake");

        loop {
            write!(self.output, "{}", render::render_step_prompt(self.wizard.session()))?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                writeln!(self.output)?;
                break;
            }
            let line = line.trim();

            match FormCommand::parse_at(self.wizard.step(), line) {
                Some(FormCommand::Back) => {
                    self.wizard.back();
                    continue;
                }
                Some(FormCommand::Restart) => {
                    self.wizard.reset();
                    continue;
                }
                Some(FormCommand::Quit) => break,
                None => {}
            }

            let input = match self.wizard.step() {
                Step::Name => StepInput::Name(line.to_string()),
                Step::CareType => StepInput::CareType(parse_care_type_choice(line)),
                Step::ZipCode => StepInput::ZipCode(line.to_string()),
                Step::Result => continue,
            };

            let submitting_step = self.wizard.step();
            match self.wizard.advance_or_cancel(input, cancel()).await {
                Ok(Step::Result) => {
                    if let Some(result) = self.wizard.match_result() {
                        let text =
                            render::render_match_result(self.wizard.session().draft(), result);
                        writeln!(self.output)?;
                        write!(self.output, "{}", text)?;
                    }
                }
                Ok(_) => {}
                Err(CareMatchError::ValidationError(errors)) => {
                    write!(self.output, "{}", render::render_field_errors(&errors))?;
                }
                Err(CareMatchError::SubmissionCancelled) => {
                    writeln!(self.output, "⚠️  Request cancelled.")?;
                }
                Err(e) if e.remote_kind().is_some() => {
                    tracing::error!(
                        "❌ Facility match failed on step {}: {} (Category: {:?})",
                        submitting_step,
                        e,
                        e.category()
                    );
                    writeln!(self.output, "❌ Error: {}", e.user_friendly_message())?;
                }
                Err(e) => return Err(e),
            }
        }

        Ok(self.wizard.match_result().cloned())
    }
}

/// 一次填完整份表單並送出，不進入互動模式
pub async fn submit_intake<M, Fut>(
    service: M,
    draft: PatientDraft,
    cancel: Fut,
) -> Result<(PatientDraft, MatchResult)>
where
    M: MatchService,
    Fut: Future<Output = ()>,
{
    let mut wizard = IntakeWizard::new(service);
    wizard.advance(StepInput::Name(draft.name.trim().to_string())).await?;

    let care_type = StepInput::CareType(draft.care_type);
    let step = if draft.care_type.is_some_and(|ct| ct.requires_zip_code()) {
        wizard.advance(care_type).await?;
        wizard
            .advance_or_cancel(StepInput::ZipCode(draft.zip_code.trim().to_string()), cancel)
            .await?
    } else {
        wizard.advance_or_cancel(care_type, cancel).await?
    };

    match (step, wizard.match_result()) {
        (Step::Result, Some(result)) => Ok((wizard.session().draft().clone(), result.clone())),
        (step, _) => Err(CareMatchError::InvalidTransition {
            step,
            action: "show the match result",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{FacilityMatchResponse, MatchRequest};
    use async_trait::async_trait;
    use serde_json::json;
    use std::io::Cursor;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct ScriptedService {
        requests: Arc<Mutex<Vec<MatchRequest>>>,
        fail_with: Option<u16>,
    }

    #[async_trait]
    impl MatchService for ScriptedService {
        async fn match_facility(&self, request: &MatchRequest) -> Result<FacilityMatchResponse> {
            self.requests.lock().unwrap().push(request.clone());
            if let Some(status) = self.fail_with {
                return Err(CareMatchError::RemoteStatusError {
                    status,
                    message: "failure".into(),
                });
            }
            Ok(serde_json::from_value(json!({
                "matched": true,
                "facility": {
                    "id": "f-1",
                    "name": "Sunrise Care",
                    "capacity": 1,
                    "zip_code": "12000",
                    "care_types": [0, 1]
                }
            }))
            .unwrap())
        }
    }

    async fn run_script(service: ScriptedService, script: &str) -> (Option<MatchResult>, String) {
        let mut runner = IntakeRunner::new(service, Cursor::new(script.to_string()), Vec::new());
        let result = runner.run().await.unwrap();
        let output = String::from_utf8(runner.into_output()).unwrap();
        (result, output)
    }

    #[test]
    fn test_parse_care_type_choice() {
        assert_eq!(parse_care_type_choice("1"), Some(CareType::Stationary));
        assert_eq!(parse_care_type_choice("3"), Some(CareType::DayCare));
        assert_eq!(parse_care_type_choice("Day Care"), Some(CareType::DayCare));
        assert_eq!(parse_care_type_choice("0"), None);
        assert_eq!(parse_care_type_choice("4"), None);
        assert_eq!(parse_care_type_choice(""), None);
    }

    #[test]
    fn test_parse_form_command() {
        assert_eq!(FormCommand::parse(" BACK "), Some(FormCommand::Back));
        assert_eq!(FormCommand::parse("restart"), Some(FormCommand::Restart));
        assert_eq!(FormCommand::parse("q"), Some(FormCommand::Quit));
        assert_eq!(FormCommand::parse(":quit"), Some(FormCommand::Quit));
        assert_eq!(FormCommand::parse("Jane"), None);
    }

    #[test]
    fn test_name_step_requires_command_prefix() {
        assert_eq!(FormCommand::parse_at(Step::Name, "Back"), None);
        assert_eq!(FormCommand::parse_at(Step::Name, "exit"), None);
        assert_eq!(FormCommand::parse_at(Step::Name, ":q"), Some(FormCommand::Quit));
        assert_eq!(FormCommand::parse_at(Step::CareType, "back"), Some(FormCommand::Back));
        assert_eq!(FormCommand::parse_at(Step::ZipCode, ":restart"), Some(FormCommand::Restart));
    }

    #[tokio::test]
    async fn test_interactive_name_may_be_a_command_word() {
        let service = ScriptedService::default();
        let (result, output) = run_script(service.clone(), "Back
3
:quit
").await;

        assert!(result.is_some());
        assert!(output.contains("  Name: Back"));
        let requests = service.requests.lock().unwrap().clone();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].patient_name, "Back");
    }

    #[tokio::test]
    async fn test_interactive_quit_on_name_step() {
        let service = ScriptedService::default();
        let (result, output) = run_script(service.clone(), ":quit
Jane Doe
").await;

        assert!(result.is_none());
        assert_eq!(output.matches("Patient Name:").count(), 1);
        assert!(service.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_interactive_run_to_result() {
        let service = ScriptedService::default();
        let (result, output) = run_script(service.clone(), "J\nJane Doe\n2\n123\n12345\nquit\n").await;

        assert!(result.unwrap().matched);
        assert!(output.contains("Name must be at least 2 characters."));
        assert!(output.contains("Please enter a valid 5-digit zip code."));
        assert!(output.contains("We found a match!"));
        assert!(output.contains("Type of Care: Ambulatory, Stationary"));

        let requests = service.requests.lock().unwrap().clone();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].zip_code.as_deref(), Some("12345"));
    }

    #[tokio::test]
    async fn test_interactive_back_and_day_care() {
        let service = ScriptedService::default();
        let (result, _) = run_script(service.clone(), "Jane Doe\n1\nback\n3\n").await;

        assert!(result.is_some());
        let requests = service.requests.lock().unwrap().clone();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].care_type, CareType::DayCare);
        assert_eq!(requests[0].zip_code, None);
    }

    #[tokio::test]
    async fn test_interactive_remote_error_keeps_step() {
        let service = ScriptedService {
            fail_with: Some(500),
            ..ScriptedService::default()
        };
        let (result, output) = run_script(service.clone(), "Jane Doe\n3\n").await;

        assert!(result.is_none());
        assert!(output.contains("❌ Error: Server error. Please try again later."));
        // 錯誤後再次顯示同一步驟的提示
        assert_eq!(output.matches("Type of Care Needed:").count(), 2);
    }

    #[tokio::test]
    async fn test_interactive_restart_clears_form() {
        let (result, output) = run_script(ScriptedService::default(), "Jane Doe\nrestart\n").await;
        assert!(result.is_none());
        assert_eq!(output.matches("Patient Name:").count(), 2);
    }

    #[tokio::test]
    async fn test_submit_intake_from_args() {
        let service = ScriptedService::default();
        let draft = PatientDraft {
            name: "Jane Doe".into(),
            care_type: Some(CareType::Stationary),
            zip_code: "10115".into(),
        };

        let (draft, result) = submit_intake(service.clone(), draft, std::future::pending::<()>())
            .await
            .unwrap();
        assert_eq!(draft.zip_code, "10115");
        assert!(result.matched);
        assert_eq!(service.requests.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_submit_intake_rejects_invalid_args() {
        let draft = PatientDraft {
            name: "Jane Doe".into(),
            care_type: Some(CareType::Ambulatory),
            zip_code: "1234".into(),
        };
        let err = submit_intake(ScriptedService::default(), draft, std::future::pending::<()>())
            .await
            .unwrap_err();
        assert!(matches!(err, CareMatchError::ValidationError(_)));
    }
}
