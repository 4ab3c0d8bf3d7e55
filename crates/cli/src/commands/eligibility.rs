use serde::Serialize;
use shipguard_core::config::LoadOptions;
use shipguard_core::{BlockingReason, EligibilityVerdict};

use super::{open_session, CommandResult, QueryOptions};

const COMMAND: &str = "eligibility";

#[derive(Debug, Serialize)]
struct EligibilityReport<'a> {
    policy: &'a str,
    found: bool,
    #[serde(flatten)]
    verdict: &'a EligibilityVerdict,
    blocking_reasons: Vec<BlockingReason>,
}

pub fn run(load: LoadOptions, query: &QueryOptions, policy_ref: &str) -> CommandResult {
    let session = match open_session(load, query) {
        Ok(session) => session,
        Err(error) => return CommandResult::from_error(COMMAND, &error),
    };

    let found = session.snapshot.policy(policy_ref).is_some();
    let verdict = session.engine.claim_eligibility(policy_ref, &session.snapshot);
    let blocking_reasons = verdict.blocking_reasons();

    let message = match (found, verdict.can_file_claim) {
        (false, _) => format!("policy `{policy_ref}` was not found; claim filing is blocked"),
        (true, true) => format!("policy `{policy_ref}` is eligible for a claim"),
        (true, false) => format!("policy `{policy_ref}` cannot file a claim yet"),
    };
    let lines = blocking_reasons.iter().map(|reason| format!("- {}", reason.message())).collect();
    let report = EligibilityReport { policy: policy_ref, found, verdict: &verdict, blocking_reasons };

    CommandResult::render(COMMAND, query.json, message, lines, &report)
}
