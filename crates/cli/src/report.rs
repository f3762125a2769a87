use std::path::Path;
use waypoint_core::{Entry, WeightStore};

const RULE: &str = "________________________________________";

/// One line per entry, as printed after `--increase` / `--decrease`.
pub fn render_entry(entry: &Entry) -> String {
    format!("{:.1}:\t{}", entry.weight, entry.path)
}

/// `--stat` output: entries lightest first, then totals.
pub fn render_stat(store: &WeightStore, cwd: Option<&Path>, data_path: &Path) -> String {
    let mut entries = store.entries();
    entries.sort_by(Entry::cmp_by_weight);

    let mut out = String::new();
    for entry in &entries {
        out.push_str(&format!("{:.1}:\t {}\n", entry.weight, entry.path));
    }
    out.push_str(RULE);
    out.push_str("\n\n");
    out.push_str(&format!("{:.0}:\t total weight\n", store.total_weight()));
    out.push_str(&format!("{}:\t number of entries\n", entries.len()));
    if let Some(cwd) = cwd {
        let weight = store.get(&cwd.to_string_lossy());
        out.push_str(&format!("{weight:.2}:\t current directory weight\n"));
    }
    out.push_str(&format!("\ndata:\t {}", data_path.display()));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn stat_lists_lightest_first() {
        let store = WeightStore::from_weights([
            ("/heavy".to_string(), 20.0),
            ("/light".to_string(), 2.4),
        ]);
        let text = render_stat(&store, Some(Path::new("/heavy")), Path::new("/d/waypoint.txt"));
        let expected = [
            "2.4:\t /light",
            "20.0:\t /heavy",
            RULE,
            "",
            "22:\t total weight",
            "2:\t number of entries",
            "20.00:\t current directory weight",
            "",
            "data:\t /d/waypoint.txt",
        ]
        .join("\n");
        assert_eq!(text, expected);
    }

    #[test]
    fn stat_without_cwd_omits_its_weight() {
        let text = render_stat(&WeightStore::new(), None, Path::new("/d/waypoint.txt"));
        assert!(!text.contains("current directory weight"));
        assert!(text.contains("0:\t number of entries"));
    }

    #[test]
    fn entry_line_has_one_decimal() {
        assert_eq!(render_entry(&Entry::new("/tmp", 14.142)), "14.1:\t/tmp");
    }
}
