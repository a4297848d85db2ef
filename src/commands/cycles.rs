use log::{debug, info, warn};
use serde::Deserialize;
use serde_json::json;
use tabled::Tabled;

use crate::burndown;
use crate::cli::CycleArgs;
use crate::client::LinearClient;
use crate::config::Config;
use crate::error::{BurndownError, Result};
use crate::output;
use crate::report;
use crate::responses::Connection;
use crate::types::{Cycle, CycleIssue, Issue};

const LIST_CYCLES_QUERY: &str = r#"
query ListCycles($filter: CycleFilter) {
    cycles(filter: $filter) {
        nodes {
            id
            name
            number
            startsAt
            endsAt
        }
    }
}
"#;

const CYCLE_ISSUES_QUERY: &str = r#"
query CycleIssues($id: String!, $after: String) {
    cycle(id: $id) {
        id
        name
        number
        startsAt
        endsAt
        issues(first: 100, after: $after) {
            nodes {
                identifier
                title
                estimate
                createdAt
                completedAt
                canceledAt
            }
            pageInfo {
                hasNextPage
                endCursor
            }
        }
    }
}
"#;

const MAX_PAGES: usize = 50;

#[derive(Deserialize)]
struct CyclesResponse {
    cycles: Connection<Cycle>,
}

#[derive(Deserialize)]
struct CycleIssuesResponse {
    cycle: Option<CycleWithIssues>,
}

#[derive(Deserialize)]
struct CycleWithIssues {
    #[serde(flatten)]
    cycle: Cycle,
    issues: Connection<CycleIssue>,
}

#[derive(Tabled)]
struct CycleRow {
    #[tabled(rename = "Number")]
    number: i32,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Window")]
    window: String,
    #[tabled(rename = "ID")]
    id: String,
}

impl From<&Cycle> for CycleRow {
    fn from(cycle: &Cycle) -> Self {
        Self {
            number: cycle.number,
            name: cycle.name.clone().unwrap_or_default(),
            window: cycle
                .window()
                .map(|w| w.to_string())
                .unwrap_or_else(|_| format!("{} to {}", cycle.starts_at, cycle.ends_at)),
            id: cycle.id.clone(),
        }
    }
}

pub async fn list(client: &LinearClient, config: &Config, team: Option<String>) -> Result<()> {
    let team_key = config.resolve_team(team.as_deref());

    let variables = team_key.map(|key| {
        json!({
            "filter": {
                "team": {
                    "key": { "eq": key }
                }
            }
        })
    });

    let response: CyclesResponse = client.query(LIST_CYCLES_QUERY, variables).await?;

    output::print_table(&response.cycles.nodes, |c| CycleRow::from(c));

    Ok(())
}

pub async fn burndown(client: &LinearClient, config: &Config, args: CycleArgs) -> Result<()> {
    let (cycle, nodes) = fetch_cycle(client, &args.id).await?;

    let window = cycle.window()?;
    let issues = issues_from_nodes(nodes)?;
    let result = burndown::compute(&window, &issues)?;

    output::print_burndown(&cycle.display_name(), &result);

    if args.write {
        let path = report::write_report(&result, &config.resolve_report_dir(args.report_dir))?;
        output::print_message(&format!("Sprint report saved to {}", path.display()));
    }

    Ok(())
}

/// Fetch a cycle and all of its issues, following pagination.
async fn fetch_cycle(client: &LinearClient, id: &str) -> Result<(Cycle, Vec<CycleIssue>)> {
    let mut cycle = None;
    let mut nodes = Vec::new();
    let mut after: Option<String> = None;

    for page in 0..MAX_PAGES {
        let variables = json!({ "id": id, "after": after });
        let response: CycleIssuesResponse =
            client.query(CYCLE_ISSUES_QUERY, Some(variables)).await?;
        let data = response
            .cycle
            .ok_or_else(|| BurndownError::CycleNotFound(id.to_string()))?;

        debug!("Cycle {id} page {}: {} issues", page + 1, data.issues.nodes.len());
        after = data.issues.next_cursor().map(String::from);
        nodes.extend(data.issues.nodes);
        cycle = Some(data.cycle);

        if after.is_none() {
            break;
        }
    }

    ensure_complete(id, after.as_deref())?;
    let cycle = cycle.ok_or_else(|| BurndownError::CycleNotFound(id.to_string()))?;
    info!("Fetched {} issues for {}", nodes.len(), cycle.display_name());
    Ok((cycle, nodes))
}

/// A cursor left after the last allowed page means the issue list is cut short.
fn ensure_complete(id: &str, after: Option<&str>) -> Result<()> {
    match after {
        Some(cursor) => {
            warn!("Cycle {id} still has issues after page {MAX_PAGES} (cursor {cursor})");
            Err(BurndownError::CycleTruncated {
                id: id.to_string(),
                pages: MAX_PAGES,
            })
        }
        None => Ok(()),
    }
}

/// Engine issues from cycle nodes. Cancelled issues are not sprint work.
fn issues_from_nodes(nodes: Vec<CycleIssue>) -> Result<Vec<Issue>> {
    let (canceled, active): (Vec<_>, Vec<_>) = nodes.into_iter().partition(CycleIssue::is_canceled);
    if !canceled.is_empty() {
        debug!("Ignoring {} cancelled issue(s)", canceled.len());
    }

    active.into_iter().map(Issue::try_from).collect()
}
