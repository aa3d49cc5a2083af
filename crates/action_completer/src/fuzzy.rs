//! Fuzzy name scoring and the ranking filter shared by resolution and completion.
//!
//! Scores run from 0 to 100. Both sides are normalized first (lowercased, punctuation other than
//! `_` and `-` treated as a separator, outer separators trimmed). The base score is the indel
//! similarity `200 * lcs / (len_a + len_b)`; when one side is at least one and a half times longer,
//! the best similarity of the shorter side against any equal-length window of the longer side is
//! also considered, scaled down so a substring hit never outranks a full match.

/// Length ratio from which windowed partial matching is considered.
const PARTIAL_RATIO_THRESHOLD: f64 = 1.5;
/// Length ratio from which partial matches are discounted more heavily.
const LONG_PARTIAL_THRESHOLD: f64 = 8.0;
const PARTIAL_SCALE: f64 = 0.9;
const LONG_PARTIAL_SCALE: f64 = 0.6;

/// Normalizes text for scoring.
pub fn normalize(text: &str) -> String {
    text.chars()
        .map(|ch| {
            if ch.is_alphanumeric() || ch == '_' || ch == '-' {
                ch
            } else {
                ' '
            }
        })
        .collect::<String>()
        .trim()
        .to_lowercase()
}

/// Scores how well `query` matches `candidate`.
///
/// Either side normalizing to nothing scores 0; [`rank`] keeps everything for such a query itself.
pub fn score(query: &str, candidate: &str) -> u8 {
    let query = normalize(query).chars().collect::<Vec<_>>();
    let candidate = normalize(candidate).chars().collect::<Vec<_>>();
    if query.is_empty() || candidate.is_empty() {
        return 0;
    }

    let base = ratio(&query, &candidate);
    let (shorter, longer) = if query.len() <= candidate.len() {
        (&query, &candidate)
    } else {
        (&candidate, &query)
    };
    let length_ratio = longer.len() as f64 / shorter.len() as f64;
    let best = if length_ratio >= PARTIAL_RATIO_THRESHOLD {
        let scale = if length_ratio >= LONG_PARTIAL_THRESHOLD {
            LONG_PARTIAL_SCALE
        } else {
            PARTIAL_SCALE
        };
        base.max(partial_ratio(shorter, longer) * scale)
    } else {
        base
    };
    best.round().clamp(0.0, 100.0) as u8
}

fn ratio(left: &[char], right: &[char]) -> f64 {
    let total = left.len() + right.len();
    if total == 0 {
        return 100.0;
    }
    200.0 * lcs_len(left, right) as f64 / total as f64
}

fn partial_ratio(shorter: &[char], longer: &[char]) -> f64 {
    longer
        .windows(shorter.len())
        .map(|window| ratio(shorter, window))
        .fold(0.0, f64::max)
}

fn lcs_len(left: &[char], right: &[char]) -> usize {
    let mut previous = vec![0usize; right.len() + 1];
    let mut current = vec![0usize; right.len() + 1];
    for &l in left {
        for (j, &r) in right.iter().enumerate() {
            current[j + 1] = if l == r {
                previous[j] + 1
            } else {
                previous[j + 1].max(current[j])
            };
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[right.len()]
}

/// Returns the index and score of the best match for `query`, first on ties.
pub fn best_match<'a, I>(query: &str, candidates: I) -> Option<(usize, u8)>
where
    I: IntoIterator<Item = &'a str>,
{
    candidates
        .into_iter()
        .enumerate()
        .map(|(index, candidate)| (index, score(query, candidate)))
        .fold(None, |best, (index, score)| match best {
            Some((_, best_score)) if best_score >= score => best,
            _ => Some((index, score)),
        })
}

/// Narrows `items` to those whose key scores at least `tolerance` against `query`, best first.
///
/// An empty universe yields nothing and a single item is always kept. A query that normalizes to
/// nothing keeps every item in its original order. Equal scores keep their original order.
pub fn rank<T, F>(query: &str, items: Vec<T>, tolerance: u8, key: F) -> Vec<T>
where
    F: Fn(&T) -> &str,
{
    if items.len() <= 1 || normalize(query).is_empty() {
        return items;
    }
    let mut scored = items
        .into_iter()
        .filter_map(|item| {
            let score = score(query, key(&item));
            (score >= tolerance).then_some((score, item))
        })
        .collect::<Vec<_>>();
    scored.sort_by(|left, right| right.0.cmp(&left.0));
    scored.into_iter().map(|(_, item)| item).collect()
}
