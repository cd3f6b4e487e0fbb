//! Tab-completion candidates for the source and destination tokens.

use crate::{
    selector::{ALL_PLAYERS, BACKEND_PREFIX},
    topology::Topology,
};

/// Candidates for the token at `position` (1 = source, 2 = destination).
///
/// Other positions have no candidates.
pub fn candidates<T: Topology + ?Sized>(position: usize, topology: &T) -> Vec<String> {
    let mut out = Vec::new();
    match position {
        1 => out.push(ALL_PLAYERS.to_string()),
        2 => {}
        _ => return out,
    }
    out.extend(
        topology
            .backends()
            .into_iter()
            .map(|backend| format!("{BACKEND_PREFIX}{}", backend.name)),
    );
    out.extend(topology.players().into_iter().map(|player| player.name));
    out
}

/// Narrow `candidates` down to what `partial` could complete to.
///
/// Empty input keeps everything, an exact match keeps only itself, and
/// otherwise every prefix match is kept in order.
pub fn filter_candidates(partial: &str, candidates: Vec<String>) -> Vec<String> {
    if partial.is_empty() {
        return candidates;
    }
    if candidates.iter().any(|candidate| candidate == partial) {
        return vec![partial.to_string()];
    }
    candidates
        .into_iter()
        .filter(|candidate| candidate.starts_with(partial))
        .collect()
}

/// Completions for `partial` typed at `position`.
pub fn suggest<T: Topology + ?Sized>(partial: &str, position: usize, topology: &T) -> Vec<String> {
    filter_candidates(partial, candidates(position, topology))
}
