//! Escape-aware prompt buffer tokenizer used by the action completion engine.
//!
//! This crate intentionally implements only the small subset the engine needs: whitespace
//! splitting with backslash-escaped whitespace, fragment offsets, and the completion text codec.
//! Any string is tokenizable; there are no error conditions.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

use serde::{Deserialize, Serialize};

pub use action_completer_contract::Fragment;

/// Tokenized prompt buffer.
///
/// `fragments` is never empty: when the buffer is empty or ends in unescaped whitespace a
/// synthetic empty fragment positioned at the end of the buffer stands in for the fragment the
/// user is about to type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tokenized {
    /// Ordered fragments, including the synthetic trailing one at a boundary.
    pub fragments: Vec<Fragment>,
    /// Whether the buffer is empty or ends in unescaped whitespace.
    pub ends_at_boundary: bool,
}

impl Tokenized {
    /// Returns the fragment currently being typed.
    pub fn current(&self) -> &Fragment {
        // `tokenize` always pushes at least one fragment.
        &self.fragments[self.fragments.len() - 1]
    }

    /// Returns every fragment before [`Tokenized::current`].
    pub fn committed(&self) -> &[Fragment] {
        &self.fragments[..self.fragments.len() - 1]
    }

    /// Returns the fragments actually present in the buffer, without the synthetic one.
    pub fn words(&self) -> &[Fragment] {
        if self.ends_at_boundary {
            self.committed()
        } else {
            &self.fragments
        }
    }

    /// Returns whether the buffer holds no fragments at all.
    pub fn is_blank(&self) -> bool {
        self.words().is_empty()
    }

    /// Returns the resolved text of [`Tokenized::words`].
    pub fn texts(&self) -> Vec<String> {
        self.words()
            .iter()
            .map(|fragment| fragment.text.clone())
            .collect()
    }
}

/// Splits `buffer` into escape-aware fragments.
///
/// Runs of unescaped whitespace separate fragments. A backslash immediately followed by a
/// whitespace character contributes that whitespace to the fragment and is itself dropped; any
/// other backslash (including a dangling one) is kept literally.
pub fn tokenize(buffer: &str) -> Tokenized {
    let mut fragments = Vec::new();
    let mut current = String::new();
    let mut start = None::<usize>;
    let mut chars = buffer.char_indices().peekable();

    while let Some((index, ch)) = chars.next() {
        match ch {
            '\\' => {
                start.get_or_insert(index);
                match chars.peek() {
                    Some(&(_, next)) if next.is_whitespace() => {
                        current.push(next);
                        chars.next();
                    }
                    _ => current.push('\\'),
                }
            }
            ch if ch.is_whitespace() => {
                if let Some(begin) = start.take() {
                    fragments.push(Fragment::new(
                        std::mem::take(&mut current),
                        begin,
                        index,
                        false,
                    ));
                }
            }
            ch => {
                start.get_or_insert(index);
                current.push(ch);
            }
        }
    }

    let ends_at_boundary = match start {
        Some(begin) => {
            fragments.push(Fragment::new(current, begin, buffer.len(), true));
            false
        }
        None => {
            fragments.push(Fragment::new(String::new(), buffer.len(), buffer.len(), false));
            true
        }
    };

    Tokenized {
        fragments,
        ends_at_boundary,
    }
}

/// Escapes whitespace so `text` survives re-tokenization as a single fragment.
pub fn encode_completion(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch.is_whitespace() {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Reverses [`encode_completion`].
pub fn decode_completion(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(next) = chars.peek().copied().filter(|next| next.is_whitespace()) {
                out.push(next);
                chars.next();
                continue;
            }
        }
        out.push(ch);
    }
    out
}
