//! Stage 2: leader account provisioning

use crate::core::import::context::{ImportSettings, RunContext};
use crate::core::import::state::{RunState, Stage, StageError, StageOutcome};
use crate::core::reconcile::ReconciliationSummary;
use crate::domain::{ImportRow, LeaderAccountRequest, LeaderAccountResult, ProvisioningStatus};
use crate::{log_stage_complete, log_stage_start};
use std::collections::{HashMap, HashSet};

/// Reason recorded for emails the provider left out of its response
pub const MISSING_RESULT: &str = "no result returned by identity provider";

/// One account request per new email, first occurrence wins
pub fn leader_requests(
    settings: &ImportSettings,
    rows: &[ImportRow],
    summary: &ReconciliationSummary,
) -> Vec<LeaderAccountRequest> {
    let mut seen = HashSet::new();
    rows.iter()
        .filter(|r| !summary.is_existing_email(&r.leader_email))
        .filter(|r| seen.insert(r.leader_email.as_str()))
        .map(|r| LeaderAccountRequest {
            name: r.leader_name.clone(),
            email: r.leader_email.clone(),
            phone: r.leader_phone.clone(),
            password: settings.password_for(r.password.as_ref()),
        })
        .collect()
}

/// Submit every new leader in one batched call
///
/// Never fails the run: a failed call marks every submitted email failed.
pub async fn provision_leaders(ctx: &RunContext, mut state: RunState) -> StageOutcome {
    let stage = Stage::Provisioning;
    let requests = leader_requests(&ctx.settings, &state.rows, &state.summary);
    log_stage_start!(stage.as_str(), requests.len());

    let mut errors = Vec::new();

    if requests.is_empty() {
        ctx.progress.log("No new leader accounts to provision");
    } else {
        ctx.progress
            .log(format!("Provisioning {} leader account(s)", requests.len()));

        let mut outcomes: HashMap<String, ProvisioningStatus> = match ctx
            .identity
            .provision_leaders(&ctx.organization, &requests)
            .await
        {
            Ok(accounts) => accounts
                .into_iter()
                .map(|a| (a.email, a.status))
                .collect(),
            Err(e) => {
                tracing::error!(error = %e, accounts = requests.len(), "Provisioning call failed");
                errors.push(StageError::new(stage, format!("provisioning call failed: {e}")));
                let reason = e.to_string();
                requests
                    .iter()
                    .map(|r| (r.email.clone(), ProvisioningStatus::Failed(reason.clone())))
                    .collect()
            }
        };

        for request in requests {
            let status = outcomes
                .remove(&request.email)
                .unwrap_or_else(|| ProvisioningStatus::Failed(MISSING_RESULT.to_string()));

            match &status {
                ProvisioningStatus::Created(_) => state.counters.accounts_provisioned += 1,
                ProvisioningStatus::Failed(reason) => {
                    tracing::warn!(email = %request.email, reason = %reason, "Leader account not created");
                    errors.push(StageError::new(
                        stage,
                        format!("{}: {}", request.email, reason),
                    ));
                }
            }

            state.accounts.insert(
                request.email.clone(),
                LeaderAccountResult {
                    email: request.email,
                    status,
                    password: request.password,
                },
            );
        }

        ctx.progress.log(format!(
            "{} leader account(s) created, {} failed",
            state.counters.accounts_provisioned,
            state.accounts.len() - state.counters.accounts_provisioned
        ));
    }

    ctx.progress.set_percent(stage.completion_percent());
    log_stage_complete!(
        stage.as_str(),
        state.counters.accounts_provisioned,
        state.accounts.len() - state.counters.accounts_provisioned
    );
    StageOutcome::new(state, errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;
    use crate::domain::Weekday;
    use chrono::NaiveTime;
    use secrecy::ExposeSecret;

    fn row(index: usize, email: &str, password: Option<&str>) -> ImportRow {
        ImportRow {
            index,
            generation: "Azul".to_string(),
            generation_color: "#1D4ED8".to_string(),
            cell: format!("Célula {index}"),
            weekday: Weekday::Quarta,
            time: NaiveTime::from_hms_opt(19, 30, 0).unwrap(),
            address: None,
            target_audience: None,
            leader_name: format!("Leader {index}"),
            leader_email: email.to_string(),
            leader_phone: None,
            password: password.map(|p| secret_string(p.to_string())),
        }
    }

    fn summary(existing: &[&str]) -> ReconciliationSummary {
        ReconciliationSummary {
            total_rows: 0,
            generation_count: 1,
            cell_count: 0,
            leader_count: 0,
            new_generations: vec![],
            existing_generations: vec![],
            existing_emails: existing.iter().map(|e| e.to_string()).collect(),
        }
    }

    #[test]
    fn test_leader_requests_skip_existing_and_duplicate_emails() {
        let settings = ImportSettings::default();
        let rows = vec![
            row(1, "ana@example.com", Some("Primeira@1")),
            row(2, "bruno@example.com", None),
            row(3, "ana@example.com", Some("Segunda@2")),
        ];
        let requests = leader_requests(&settings, &rows, &summary(&["bruno@example.com"]));

        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].email, "ana@example.com");
        assert_eq!(requests[0].name, "Leader 1");
        assert_eq!(requests[0].password.expose_secret().as_str(), "Primeira@1");
    }

    #[test]
    fn test_leader_requests_apply_default_password() {
        let settings = ImportSettings::default();
        let rows = vec![row(1, "ana@example.com", Some("123"))];
        let requests = leader_requests(&settings, &rows, &summary(&[]));
        assert_eq!(
            requests[0].password.expose_secret().as_str(),
            settings.default_password.expose_secret().as_str()
        );
    }
}
