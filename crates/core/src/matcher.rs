use crate::store::Entry;
use regex::{Regex, RegexBuilder};
use std::borrow::Cow;
use std::iter::FusedIterator;
use std::path::{is_separator, Path, PathBuf, MAIN_SEPARATOR};

/// Minimum normalized similarity for a fragment to fuzzy-match a segment.
pub const FUZZY_MATCH_THRESHOLD: f64 = 0.6;

/// Matching strategies, strictest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// Fragments match the trailing path segments, one per segment, in order.
    Consecutive,
    /// Every fragment is similar enough to some segment, in order.
    Fuzzy,
    /// Fragments appear anywhere in the path, in order.
    Anywhere,
}

impl Tier {
    fn next(self) -> Option<Tier> {
        match self {
            Tier::Consecutive => Some(Tier::Fuzzy),
            Tier::Fuzzy => Some(Tier::Anywhere),
            Tier::Anywhere => None,
        }
    }
}

/// Candidate exclusion applied on top of every tier.
#[derive(Debug, Clone)]
pub struct RankPolicy {
    /// Directory the shell is in; never offered as a jump target. `None`
    /// when it could not be resolved.
    pub cwd: Option<PathBuf>,
    /// Drop entries whose directory no longer exists.
    pub check_existence: bool,
}

impl RankPolicy {
    pub fn new(cwd: Option<PathBuf>) -> Self {
        Self {
            cwd,
            check_existence: true,
        }
    }

    /// Policy for the process's current directory. A deleted working
    /// directory disables the exclusion instead of failing.
    pub fn from_current_dir() -> Self {
        let cwd = match std::env::current_dir() {
            Ok(dir) => Some(dir),
            Err(err) => {
                log::warn!("Current directory unavailable: {err}");
                None
            }
        };
        Self::new(cwd)
    }

    #[must_use]
    pub fn check_existence(mut self, enabled: bool) -> Self {
        self.check_existence = enabled;
        self
    }

    fn admits(&self, entry: &Entry) -> bool {
        let path = Path::new(&entry.path);
        if let Some(cwd) = &self.cwd {
            let resolved = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
            if resolved == *cwd {
                return false;
            }
        }
        !self.check_existence || path.exists()
    }
}

/// Rank `entries` against the typed `fragments`.
///
/// Entries are pre-sorted by `(weight, path)` descending, then the
/// consecutive, fuzzy and anywhere tiers are yielded one after another. Tiers
/// only filter, so each keeps the pre-sort order, and a path may show up in
/// more than one tier. Consumers are expected to take a bounded prefix.
pub fn rank<'a>(entries: &'a [Entry], fragments: &[String], policy: &RankPolicy) -> Matches<'a> {
    let mut candidates: Vec<&Entry> = entries.iter().collect();
    candidates.sort_by(|a, b| b.cmp_by_weight(a));

    Matches {
        candidates,
        query: Query::new(fragments),
        policy: policy.clone(),
        tier: Some(Tier::Consecutive),
        cursor: 0,
        yielded: None,
    }
}

/// Single-pass iterator over ranked entries. Filesystem checks happen lazily,
/// only for entries that already matched the current tier.
pub struct Matches<'a> {
    candidates: Vec<&'a Entry>,
    query: Query,
    policy: RankPolicy,
    tier: Option<Tier>,
    cursor: usize,
    yielded: Option<Tier>,
}

impl Matches<'_> {
    /// Tier the most recently yielded entry came from. `None` before the
    /// first call to `next`.
    pub fn tier(&self) -> Option<Tier> {
        self.yielded
    }
}

impl<'a> Iterator for Matches<'a> {
    type Item = &'a Entry;

    fn next(&mut self) -> Option<&'a Entry> {
        while let Some(tier) = self.tier {
            while let Some(&entry) = self.candidates.get(self.cursor) {
                self.cursor += 1;
                if self.query.matches(tier, &entry.path) && self.policy.admits(entry) {
                    self.yielded = Some(tier);
                    return Some(entry);
                }
            }
            self.tier = tier.next();
            self.cursor = 0;
        }
        None
    }
}

impl FusedIterator for Matches<'_> {}

struct Query {
    fragments: Vec<String>,
    case_sensitive: bool,
    consecutive: Option<Regex>,
    anywhere: Option<Regex>,
}

impl Query {
    fn new(fragments: &[String]) -> Self {
        // Smart case: any uppercase character makes the whole query exact.
        let case_sensitive = fragments
            .iter()
            .any(|f| f.chars().any(char::is_uppercase));

        let escaped: Vec<String> = fragments.iter().map(|f| regex::escape(f)).collect();
        let sep = regex::escape(&MAIN_SEPARATOR.to_string());
        let no_sep = format!("[^{sep}]*");
        let one_sep = format!("{no_sep}{sep}{no_sep}");

        let consecutive = format!("{}{no_sep}$", escaped.join(&one_sep));
        let anywhere = format!(".*{}.*", escaped.join(".*"));

        let fragments = if case_sensitive {
            fragments.to_vec()
        } else {
            fragments.iter().map(|f| f.to_lowercase()).collect()
        };

        Self {
            fragments,
            case_sensitive,
            consecutive: build_pattern(&consecutive, case_sensitive),
            anywhere: build_pattern(&anywhere, case_sensitive),
        }
    }

    fn matches(&self, tier: Tier, path: &str) -> bool {
        match tier {
            Tier::Consecutive => self.consecutive.as_ref().is_some_and(|re| re.is_match(path)),
            Tier::Fuzzy => self.matches_fuzzy(path),
            Tier::Anywhere => self.anywhere.as_ref().is_some_and(|re| re.is_match(path)),
        }
    }

    fn matches_fuzzy(&self, path: &str) -> bool {
        let haystack: Cow<'_, str> = if self.case_sensitive {
            Cow::Borrowed(path)
        } else {
            Cow::Owned(path.to_lowercase())
        };
        let mut segments = haystack.split(is_separator).filter(|s| !s.is_empty());
        self.fragments.iter().all(|fragment| {
            segments
                .by_ref()
                .any(|segment| similarity(fragment, segment) >= FUZZY_MATCH_THRESHOLD)
        })
    }
}

fn build_pattern(pattern: &str, case_sensitive: bool) -> Option<Regex> {
    match RegexBuilder::new(pattern)
        .case_insensitive(!case_sensitive)
        .build()
    {
        Ok(re) => Some(re),
        Err(err) => {
            log::debug!("Skipping tier pattern {pattern:?}: {err}");
            None
        }
    }
}

/// Normalized Levenshtein similarity in `[0, 1]`: `1 - distance / max_len`.
/// Two empty strings are identical.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let max_len = a.len().max(b.len());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - levenshtein(&a, &b) as f64 / max_len as f64
}

fn levenshtein(a: &[char], b: &[char]) -> usize {
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}
