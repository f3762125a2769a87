use crate::matcher::{rank, RankPolicy};
use crate::store::Entry;

/// Separator between the typed fragment and the completion payload. Chosen to
/// be unlikely inside a fragment.
pub const TAB_SEPARATOR: &str = "__";

/// Menu size offered to the shell.
pub const TAB_ENTRIES_COUNT: usize = 9;

/// Decoded completion token.
///
/// | token               | fragment | index | path       |
/// |---------------------|----------|-------|------------|
/// | `foo`               | `foo`    | -     | -          |
/// | `foo__3`            | `foo`    | 3     | -          |
/// | `foo__/home/u/foo`  | `foo`    | -     | `/home/u/foo` |
/// | `foo__3__/home/u/x` | `foo`    | 3     | `/home/u/x` |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabToken {
    pub fragment: String,
    /// 1-based position in the ranking of `fragment`.
    pub index: Option<usize>,
    /// Candidate the shell already resolved.
    pub path: Option<String>,
}

/// What a completion request resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TabResolution {
    /// A single directory to hand back to the shell.
    Path(String),
    /// Menu lines, `fragment<SEP>path`, best first.
    Menu(Vec<String>),
    /// An index was requested but nothing matched.
    NoMatch,
}

pub fn decode(token: &str, separator: &str) -> TabToken {
    let plain = || TabToken {
        fragment: token.to_string(),
        index: None,
        path: None,
    };
    if separator.is_empty() {
        return plain();
    }
    let Some((fragment, rest)) = token.split_once(separator) else {
        return plain();
    };

    let mut decoded = TabToken {
        fragment: fragment.to_string(),
        index: None,
        path: None,
    };
    if rest.is_empty() {
        return decoded;
    }

    if is_ordinal(rest) {
        decoded.index = parse_ordinal(rest);
        return decoded;
    }

    match rest.split_once(separator) {
        Some((ordinal, path)) if is_ordinal(ordinal) && !path.is_empty() => {
            decoded.index = parse_ordinal(ordinal);
            decoded.path = Some(path.to_string());
        }
        _ => decoded.path = Some(rest.to_string()),
    }
    decoded
}

fn is_ordinal(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

fn parse_ordinal(value: &str) -> Option<usize> {
    value.parse::<usize>().ok().filter(|index| *index > 0)
}

/// Render up to [`TAB_ENTRIES_COUNT`] menu lines, one per candidate.
pub fn encode_menu<'a, I>(fragment: &str, candidates: I, separator: &str) -> Vec<String>
where
    I: IntoIterator<Item = &'a Entry>,
{
    candidates
        .into_iter()
        .take(TAB_ENTRIES_COUNT)
        .map(|entry| format!("{fragment}{separator}{}", entry.path))
        .collect()
}

/// The `index`-th (1-based) candidate. When fewer exist the last one is
/// returned, so an out-of-range index still lands somewhere sensible.
pub fn nth_or_last<'a, I>(candidates: I, index: usize) -> Option<&'a Entry>
where
    I: IntoIterator<Item = &'a Entry>,
{
    candidates.into_iter().take(index.max(1)).last()
}

impl TabToken {
    /// Resolve this token against `entries` for shell completion.
    pub fn resolve(
        &self,
        entries: &[Entry],
        policy: &RankPolicy,
        separator: &str,
    ) -> TabResolution {
        if let Some(path) = &self.path {
            return TabResolution::Path(path.clone());
        }

        let fragments = [self.fragment.clone()];
        let matches = rank(entries, &fragments, policy);
        match self.index {
            Some(index) => nth_or_last(matches, index)
                .map(|entry| TabResolution::Path(entry.path.clone()))
                .unwrap_or(TabResolution::NoMatch),
            None => TabResolution::Menu(encode_menu(&self.fragment, matches, separator)),
        }
    }
}
