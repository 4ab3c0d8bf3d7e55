use shipguard_core::config::LoadOptions;

use super::{open_session, CommandResult, QueryOptions};

const COMMAND: &str = "analytics";

pub fn run(load: LoadOptions, query: &QueryOptions) -> CommandResult {
    let session = match open_session(load, query) {
        Ok(session) => session,
        Err(error) => return CommandResult::from_error(COMMAND, &error),
    };

    let report = session.engine.conversion_report(&session.snapshot.quotes);
    let message = format!(
        "conversion report at {} over {} quote(s)",
        session.now.to_rfc3339(),
        session.snapshot.quotes.len()
    );
    let lines = report
        .iter()
        .map(|(window, tally)| {
            format!(
                "- {}: total={} approved={} declined={} expired={} conversion={}",
                window.name(),
                tally.total,
                tally.approved,
                tally.declined,
                tally.expired,
                tally.conversion_rate()
            )
        })
        .collect();

    CommandResult::render(COMMAND, query.json, message, lines, &report)
}
