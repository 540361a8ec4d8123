use owo_colors::OwoColorize;
use tokio::io::{AsyncBufReadExt, BufReader};

use super::{Backend, CommandOutput, build_list_query, with_resource};
use crate::api::{Resource, ResourceKind};
use crate::cli::{ListArgs, OutputOptions};
use crate::display::{page_json, page_text};
use crate::error::Result;
use crate::list::{ListSnapshot, Phase};

/// Drive a list's search box from stdin.
///
/// Each line replaces the search text, as if typed. Lines arriving within
/// the quiet window of each other collapse into one request. Every settled
/// result is printed; end of input commits whatever is still pending.
pub async fn cmd_search(kind: ResourceKind, args: &ListArgs, output: OutputOptions) -> Result<()> {
    let backend = Backend::connect()?;
    with_resource!(kind, search_loop(&backend, args, output))
}

async fn search_loop<T: Resource>(
    backend: &Backend,
    args: &ListArgs,
    output: OutputOptions,
) -> Result<()> {
    let query = build_list_query(T::SEARCH_COLUMNS, args, backend.config.page_size())?;
    let controller = backend.controller::<T>(query);
    let endpoint = controller.endpoint().to_string();
    let mut state = controller.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut printed = None;

    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => controller.type_search(line.trim_end_matches('\r'))?,
                None => break,
            },
            changed = state.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = state.borrow_and_update().clone();
                print_settled(&endpoint, &snapshot, &mut printed, output)?;
            }
        }
    }

    controller.flush_search().await?;
    let snapshot = controller.settled().await?;
    print_settled(&endpoint, &snapshot, &mut printed, output)?;
    controller.teardown().await;
    Ok(())
}

/// Print a settled snapshot once per revision.
fn print_settled<T: Resource>(
    endpoint: &str,
    snapshot: &ListSnapshot<T>,
    printed: &mut Option<u64>,
    output: OutputOptions,
) -> Result<()> {
    if !snapshot.is_settled() || *printed == Some(snapshot.revision) {
        return Ok(());
    }
    *printed = Some(snapshot.revision);

    if snapshot.phase == Phase::Errored
        && let Some(err) = &snapshot.fetch.last_error
    {
        eprintln!("{} {}", err.label().red().bold(), err.user_message());
        return Ok(());
    }

    CommandOutput::new(page_json(endpoint, snapshot)?)
        .with_text(format!(
            "{} {}\n{}",
            "search:".dimmed(),
            snapshot.query.search_text(),
            page_text(snapshot)
        ))
        .print(output)
}
