use crate::core::session::{Advance, Session, Step, StepInput};
use crate::domain::model::MatchResult;
use crate::domain::ports::MatchService;
use crate::utils::error::{CareMatchError, Result};
use std::future::Future;

/// 把工作階段狀態機與遠端配對服務串在一起
pub struct IntakeWizard<M: MatchService> {
    service: M,
    session: Session,
}

impl<M: MatchService> IntakeWizard<M> {
    pub fn new(service: M) -> Self {
        Self {
            service,
            session: Session::new(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn step(&self) -> Step {
        self.session.step()
    }

    pub fn match_result(&self) -> Option<&MatchResult> {
        self.session.last_response()
    }

    pub async fn advance(&mut self, input: StepInput) -> Result<Step> {
        self.advance_or_cancel(input, std::future::pending::<()>())
            .await
    }

    /// 與 `advance` 相同，但 `cancel` 先完成時會放棄進行中的請求
    pub async fn advance_or_cancel<F>(&mut self, input: StepInput, cancel: F) -> Result<Step>
    where
        F: Future<Output = ()>,
    {
        let submission = match self.session.advance(input)? {
            Advance::Moved(step) => return Ok(step),
            Advance::Submit(submission) => submission,
        };

        let request = submission.request().clone();
        tracing::info!(
            "🔎 Requesting facility match (care type: {}, zip code: {})",
            request.care_type,
            request.zip_code.as_deref().unwrap_or("-")
        );

        let outcome = tokio::select! {
            outcome = self.service.match_facility(&request) => Some(outcome),
            _ = cancel => None,
        };

        match outcome {
            Some(outcome) => self.session.complete(submission, outcome),
            None => {
                self.session.cancel();
                Err(CareMatchError::SubmissionCancelled)
            }
        }
    }

    pub fn back(&mut self) -> Step {
        self.session.back()
    }

    pub fn reset(&mut self) {
        tracing::info!("Form reset");
        self.session.reset();
    }
}
