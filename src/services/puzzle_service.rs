use serde::Serialize;
use tracing::info;

use crate::auth::Principal;
use crate::config::RedemptionConfig;
use crate::database::models::Animal;
use crate::database::scoped::{animals, profiles};
use crate::database::Db;
use crate::error::ApiError;
use crate::services::{redemption_service, scan_service};
use crate::types::{CompletionStatus, TenantId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PuzzleResult {
    pub correct: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redemption_code: Option<String>,
}

/// Letters of the active stations in hunt order.
pub fn puzzle_word(stations: &[Animal]) -> String {
    stations.iter().map(|a| a.letter.as_str()).collect::<String>().to_uppercase()
}

/// Uppercase with all whitespace removed.
pub fn normalize_answer(answer: &str) -> String {
    answer.chars().filter(|c| !c.is_whitespace()).collect::<String>().to_uppercase()
}

/// Check a visitor's answer. A correct answer marks the visitor completed and
/// returns their redemption code, issuing it on first success. A tenant with
/// no active stations has no solvable puzzle.
pub async fn validate_puzzle_answer(
    db: &Db,
    principal: &Principal,
    tenant_id: TenantId,
    answer: &str,
    config: &RedemptionConfig,
) -> Result<PuzzleResult, ApiError> {
    let stations = animals::list_active(db, tenant_id).await?;
    let word = puzzle_word(&stations);
    if word.is_empty() || normalize_answer(answer) != word {
        return Ok(PuzzleResult { correct: false, redemption_code: None });
    }

    scan_service::ensure_visitor_profile(db, principal, tenant_id).await?;

    // Completion and issuance are writes visitors may not make directly.
    // The code goes first so a completed visitor always has one.
    let elevated = db.elevate();
    let redemption = redemption_service::issue_code(&elevated, tenant_id, principal.id, config).await?;
    profiles::set_completion(&elevated, tenant_id, principal.id, CompletionStatus::Completed).await?;

    info!("User {} solved the puzzle in tenant {}", principal.id, tenant_id);
    Ok(PuzzleResult { correct: true, redemption_code: Some(redemption.redemption_code) })
}
