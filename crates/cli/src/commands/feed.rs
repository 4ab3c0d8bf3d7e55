use shipguard_core::config::LoadOptions;
use shipguard_core::{ActivityItem, ObjectKind};

use super::{open_session, CommandResult, QueryOptions};

const COMMAND: &str = "feed";

pub fn run(load: LoadOptions, query: &QueryOptions) -> CommandResult {
    let session = match open_session(load, query) {
        Ok(session) => session,
        Err(error) => return CommandResult::from_error(COMMAND, &error),
    };

    let items = session.engine.activity_feed(&session.snapshot.quotes, &session.snapshot.policies);
    let expiring = items.iter().filter(|item| item.expiring_soon).count();
    let message = format!(
        "activity feed at {}: {} item(s), {expiring} expiring soon",
        session.now.to_rfc3339(),
        items.len()
    );
    let lines = items.iter().map(render_item).collect();

    CommandResult::render(COMMAND, query.json, message, lines, &items)
}

fn render_item(item: &ActivityItem) -> String {
    let kind = match item.data_type {
        ObjectKind::Quote => "quote",
        ObjectKind::Policy => "policy",
    };
    let cargo = item.cargo.as_deref().unwrap_or("-");
    let flag = if item.expiring_soon { " !" } else { "" };

    format!(
        "- {} [{kind}] {} | {cargo} | -> {}{flag}",
        item.reference,
        item.status_view.display_label(),
        item.button_label
    )
}
