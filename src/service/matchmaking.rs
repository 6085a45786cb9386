//! Picking a search result to join.

use crate::domain::SessionSearchResult;
use crate::gateway::SessionGateway;

use super::coordinator::SessionCoordinator;

/// First valid result advertising `match_type`, in search order.
#[must_use]
pub fn select_joinable<'a>(
    results: &'a [SessionSearchResult],
    match_type: &str,
) -> Option<&'a SessionSearchResult> {
    results
        .iter()
        .filter(|result| result.is_valid())
        .find(|result| result.match_type() == Some(match_type))
}

/// Joins the first valid result whose match type equals `match_type`.
///
/// Returns whether a join was initiated. A failed search, an empty result
/// list or no matching entry starts nothing.
pub fn try_join_session<G: SessionGateway>(
    coordinator: &mut SessionCoordinator<G>,
    results: &[SessionSearchResult],
    search_succeeded: bool,
    match_type: &str,
) -> bool {
    if !search_succeeded {
        tracing::warn!(match_type, "search failed, nothing to join");
        return false;
    }

    let Some(target) = select_joinable(results, match_type) else {
        tracing::info!(searched = results.len(), match_type, "no joinable session");
        return false;
    };

    tracing::info!(session_id = %target.session_id, match_type, "joining session");
    coordinator.join_session(target);
    true
}
