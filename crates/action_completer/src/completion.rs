//! Completion surface: candidates for the fragment under the cursor.

use action_completer_contract::{CompletionCandidate, CompletionResponse};
use action_lexer::{encode_completion, tokenize};
use tracing::trace;

use crate::{
    config::CompleterConfig,
    fuzzy,
    resolver::resolve,
    tree::{ActionNode, ActionTree, GroupNode, Node},
};

/// Computes completions for `buffer` up to `cursor`.
pub(crate) fn complete(
    tree: &ActionTree,
    config: &CompleterConfig,
    buffer: &str,
    cursor: usize,
) -> CompletionResponse {
    let mut cursor = cursor.min(buffer.len());
    while !buffer.is_char_boundary(cursor) {
        cursor -= 1;
    }
    let tokenized = tokenize(&buffer[..cursor]);
    let current = tokenized.current();
    let resolution = resolve(tree, tokenized.committed(), config.fuzzy_tolerance);

    let mut candidates = match tree.get(resolution.node) {
        Node::Group(group) if resolution.remaining.is_empty() => {
            group_candidates(tree, group, &current.text, config.fuzzy_tolerance)
        }
        Node::Group(_) => Vec::new(),
        Node::Action(action) => param_candidates(
            action,
            resolution.remaining.len(),
            &current.text,
            config.fuzzy_tolerance,
        ),
    };
    if config.encode_completions {
        for candidate in &mut candidates {
            candidate.value = encode_completion(&candidate.value);
        }
    }

    trace!(
        query = %current.text,
        node = %tree.path(resolution.node),
        candidates = candidates.len(),
        "completed"
    );
    CompletionResponse {
        start: current.start,
        end: current.end,
        candidates,
    }
}

fn group_candidates(
    tree: &ActionTree,
    group: &GroupNode,
    query: &str,
    tolerance: u8,
) -> Vec<CompletionCandidate> {
    let children = tree.active_children(group).collect::<Vec<_>>();
    fuzzy::rank(query, children, tolerance, |(name, _)| *name)
        .into_iter()
        .map(|(name, id)| {
            let node = tree.get(id);
            node.attributes().render(node.completable(), name)
        })
        .collect()
}

fn param_candidates(
    action: &ActionNode,
    slot: usize,
    query: &str,
    tolerance: u8,
) -> Vec<CompletionCandidate> {
    let Some(param) = action.params().get(slot) else {
        return Vec::new();
    };
    let candidates = param.source.candidates(action, param, query).collect::<Vec<_>>();
    if param.source.is_filtered() {
        fuzzy::rank(query, candidates, tolerance, |candidate| candidate.value.as_str())
    } else {
        candidates
    }
}
