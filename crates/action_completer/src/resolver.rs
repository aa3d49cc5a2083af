//! Walks fragments down the action tree to the deepest matching node.

use action_completer_contract::Fragment;
use tracing::trace;

use crate::{
    fuzzy,
    tree::{ActionTree, Node, NodeId},
};

/// How the last consumed fragment matched its node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// The fragment equals the node name.
    Exact,
    /// The fragment was accepted by fuzzy scoring.
    Fuzzy {
        /// Similarity score of the accepted match.
        score: u8,
    },
}

/// Outcome of walking fragments through the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution<'f> {
    /// Deepest node reached; the root when nothing matched.
    pub node: NodeId,
    /// Fragments consumed as node names.
    pub consumed: &'f [Fragment],
    /// Fragments left over; parameter values when `node` is an action.
    pub remaining: &'f [Fragment],
    /// Match kind of the final consumed fragment.
    pub last_match: Option<MatchKind>,
}

/// Resolves `fragments` against the active part of `tree`.
///
/// An exact name always wins. Fuzzy matches at or above `tolerance` are committed only for
/// fragments the user has finished typing; a trailing or empty fragment stays unconsumed so it can
/// be completed instead.
pub fn resolve<'f>(tree: &ActionTree, fragments: &'f [Fragment], tolerance: u8) -> Resolution<'f> {
    let mut node = tree.root().node();
    let mut consumed = 0;
    let mut last_match = None;

    while let Some(fragment) = fragments.get(consumed) {
        let Node::Group(group) = tree.get(node) else {
            break;
        };
        let children = tree.active_children(group).collect::<Vec<_>>();
        if children.is_empty() {
            break;
        }

        let matched = match children.iter().find(|(name, _)| *name == fragment.text) {
            Some(&(_, child)) => Some((child, MatchKind::Exact)),
            None if fragment.is_trailing || fragment.is_empty() => None,
            None => fuzzy::best_match(&fragment.text, children.iter().map(|(name, _)| *name))
                .filter(|(_, score)| *score >= tolerance)
                .map(|(index, score)| (children[index].1, MatchKind::Fuzzy { score })),
        };
        let Some((child, kind)) = matched else {
            break;
        };

        trace!(fragment = %fragment.text, node = tree.get(child).name(), ?kind, "descended");
        node = child;
        consumed += 1;
        last_match = Some(kind);
    }

    Resolution {
        node,
        consumed: &fragments[..consumed],
        remaining: &fragments[consumed..],
        last_match,
    }
}
