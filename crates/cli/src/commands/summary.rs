use shipguard_core::config::LoadOptions;

use super::{open_session, CommandResult, QueryOptions};

const COMMAND: &str = "summary";

pub fn run(load: LoadOptions, query: &QueryOptions) -> CommandResult {
    let session = match open_session(load, query) {
        Ok(session) => session,
        Err(error) => return CommandResult::from_error(COMMAND, &error),
    };

    let summary =
        session.engine.portfolio_summary(&session.snapshot.quotes, &session.snapshot.policies);
    let message = format!(
        "portfolio at {}: {} active polic(ies), {} awaiting payment",
        session.now.to_rfc3339(),
        summary.active_policies,
        summary.quotes_awaiting_payment
    );
    let lines = vec![
        format!("- total active coverage: {}", summary.total_active_coverage),
        format!(
            "- policies ending within {} day(s): {}",
            session.config.analytics.portfolio_horizon_days, summary.policies_ending_soon
        ),
    ];

    CommandResult::render(COMMAND, query.json, message, lines, &summary)
}
