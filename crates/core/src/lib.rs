//! # Waypoint Core
//!
//! Frecency bookkeeping and ranking for directory jumps.
//!
//! ## Pipeline
//!
//! ```text
//! Persistence::load()
//!     │
//!     ├──> WeightStore (path -> weight)
//!     │      ├─ increment: quadrature growth, home dir is never stored
//!     │      ├─ decay: linear, clamped at zero
//!     │      └─ purge: drop directories that no longer exist
//!     │
//!     ├──> Matcher (fragments -> ranked entries)
//!     │      ├─ pre-sort by (weight, path) descending
//!     │      ├─ consecutive -> fuzzy -> anywhere tiers
//!     │      └─ exclude the current directory (and missing paths)
//!     │
//!     └──> TabCodec (shell completion token <-> menu)
//! ```
//!
//! ## Example
//!
//! ```
//! use waypoint_core::{rank, Entry, RankPolicy};
//!
//! let entries = vec![Entry::new("/tmp/foo", 10.0), Entry::new("/tmp/bar", 5.0)];
//! let policy = RankPolicy::new(Some("/tmp".into())).check_existence(false);
//! let fragments = vec!["fo".to_string()];
//!
//! let best = rank(&entries, &fragments, &policy).next().map(|e| e.path.as_str());
//! assert_eq!(best, Some("/tmp/foo"));
//! ```

mod frecency;
mod matcher;
mod store;
mod tab;

pub use frecency::{FrecencyUpdater, Persistence};
pub use matcher::{rank, similarity, Matches, RankPolicy, Tier, FUZZY_MATCH_THRESHOLD};
pub use store::{
    normalize_path, purge, Entry, WeightStore, DEFAULT_DECREASE, DEFAULT_INCREASE,
};
pub use tab::{
    decode, encode_menu, nth_or_last, TabResolution, TabToken, TAB_ENTRIES_COUNT, TAB_SEPARATOR,
};
