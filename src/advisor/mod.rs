//! Advisory boundary.
//!
//! The engine does not talk to any advisory service itself. An embedding
//! application implements [`TaxAdvisor`] against its backend; this module
//! builds the context digest the advisor receives and enforces a timeout
//! on the call.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{EngineError, EngineResult};
use crate::models::TaxResult;
use crate::report::format_vnd;

/// Digest sent when no calculation has been made yet.
pub const NO_RESULT_CONTEXT: &str = "Chưa có dữ liệu tính toán.";

/// Default time allowed for one advisory call.
pub const DEFAULT_ADVISOR_TIMEOUT: Duration = Duration::from_secs(30);

/// An answer from the advisory service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advice {
    /// The answer text.
    pub answer: String,
}

/// An advisory service answering free-text tax questions.
///
/// Implementations must be `Send + Sync` so one advisor can be shared
/// across tasks behind an `Arc`.
pub trait TaxAdvisor: Send + Sync {
    /// Answers `question` given a plain-text digest of the current result.
    fn get_tax_advice(
        &self,
        question: &str,
        context_summary: &str,
    ) -> impl Future<Output = EngineResult<Advice>> + Send;
}

/// Builds the plain-text digest of a result: gross, total net, total tax
/// and total insurance.
pub fn context_summary(result: Option<&TaxResult>) -> String {
    match result {
        None => NO_RESULT_CONTEXT.to_string(),
        Some(result) => format!(
            "Tổng thu nhập Gross: {}\nThực nhận (Total Net): {}\nTổng Thuế TNCN: {}\nBảo hiểm: {}",
            format_vnd(result.gross),
            format_vnd(result.total_net),
            format_vnd(result.total_tax),
            format_vnd(result.total_insurance())
        ),
    }
}

/// Asks the advisor a question about the latest result.
///
/// # Errors
///
/// - [`EngineError::InvalidInput`] if the question is blank
/// - [`EngineError::AdvisorTimeout`] if the advisor does not answer in time
/// - [`EngineError::AdvisorUnavailable`] if the advisor fails or answers
///   with nothing
pub async fn ask_advisor<A: TaxAdvisor>(
    advisor: &A,
    question: &str,
    last_result: Option<&TaxResult>,
    timeout: Duration,
) -> EngineResult<Advice> {
    let question = question.trim();
    if question.is_empty() {
        return Err(EngineError::InvalidInput {
            field: "question".to_string(),
            message: "cannot be blank".to_string(),
        });
    }

    let summary = context_summary(last_result);
    info!(
        has_result = last_result.is_some(),
        question_len = question.len(),
        "Requesting tax advice"
    );

    let advice = match tokio::time::timeout(timeout, advisor.get_tax_advice(question, &summary)).await
    {
        Ok(advice) => advice?,
        Err(_) => {
            warn!(timeout_ms = timeout.as_millis() as u64, "Tax advisor timed out");
            return Err(EngineError::AdvisorTimeout {
                seconds: timeout.as_secs(),
            });
        }
    };

    if advice.answer.trim().is_empty() {
        return Err(EngineError::AdvisorUnavailable {
            message: "empty answer".to_string(),
        });
    }

    Ok(advice)
}
