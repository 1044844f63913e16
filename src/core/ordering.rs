use chrono::NaiveDate;
use icu_collator::{CaseFirst, Collator, CollatorOptions, Strength};
use icu_locid::locale;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;

/// User-selectable ordering of a record list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    /// Manual `order` ascending.
    #[default]
    Default,
    PriorityHigh,
    PriorityLow,
    Deadline,
    Name,
}

impl SortKey {
    pub const ALL: [SortKey; 5] = [
        SortKey::Default,
        SortKey::PriorityHigh,
        SortKey::PriorityLow,
        SortKey::Deadline,
        SortKey::Name,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::PriorityHigh => "priority-high",
            Self::PriorityLow => "priority-low",
            Self::Deadline => "deadline",
            Self::Name => "name",
        }
    }
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortKey::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s.trim())
            .ok_or_else(|| format!("unknown sort key: {}", s))
    }
}

/// The keys a record exposes for ordering. Missing keys sort after present ones.
pub trait Sortable {
    fn order(&self) -> i64;
    fn name(&self) -> &str;

    fn priority_score(&self) -> Option<f64> {
        None
    }

    fn deadline(&self) -> Option<NaiveDate> {
        None
    }
}

/// A newly ordered copy of `records`. The source is left untouched and ties keep
/// their relative order.
pub fn sorted<T: Sortable + Clone>(records: &[T], key: SortKey) -> Vec<T> {
    let mut out = records.to_vec();
    match key {
        SortKey::Default => out.sort_by_key(|r| r.order()),
        SortKey::PriorityHigh => out.sort_by(|a, b| {
            present_first(a.priority_score(), b.priority_score(), |x, y| y.total_cmp(x))
        }),
        SortKey::PriorityLow => out.sort_by(|a, b| {
            present_first(a.priority_score(), b.priority_score(), |x, y| x.total_cmp(y))
        }),
        SortKey::Deadline => {
            out.sort_by(|a, b| present_first(a.deadline(), b.deadline(), |x, y| x.cmp(y)))
        }
        SortKey::Name => out.sort_by(|a, b| compare_names(a.name(), b.name())),
    }
    out
}

fn present_first<K>(a: Option<K>, b: Option<K>, cmp: impl Fn(&K, &K) -> Ordering) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => cmp(&x, &y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

thread_local! {
    static NAME_COLLATOR: Option<Collator> = name_collator();
}

fn name_collator() -> Option<Collator> {
    let mut options = CollatorOptions::new();
    options.strength = Some(Strength::Tertiary);
    options.case_first = Some(CaseFirst::LowerFirst);
    match Collator::try_new(&locale!("en").into(), options) {
        Ok(collator) => Some(collator),
        Err(e) => {
            log::warn!("Name collator unavailable, sorting by case-folded code points: {}", e);
            None
        }
    }
}

/// Locale-aware name order: accents and case only break ties between otherwise
/// equal names, lowercase first.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    NAME_COLLATOR.with(|collator| match collator {
        Some(collator) => collator.compare(a, b),
        None => a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| b.cmp(a)),
    })
}

/// Order value for a record appended to `records`.
pub fn next_order<T: Sortable>(records: &[T]) -> i64 {
    records.iter().map(|r| r.order()).max().map_or(0, |max| max + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        tag: &'static str,
        order: i64,
        name: &'static str,
        score: Option<f64>,
        deadline: Option<NaiveDate>,
    }

    impl Sortable for Row {
        fn order(&self) -> i64 {
            self.order
        }
        fn name(&self) -> &str {
            self.name
        }
        fn priority_score(&self) -> Option<f64> {
            self.score
        }
        fn deadline(&self) -> Option<NaiveDate> {
            self.deadline
        }
    }

    fn row(
        tag: &'static str,
        order: i64,
        name: &'static str,
        score: Option<f64>,
        deadline: Option<&str>,
    ) -> Row {
        Row {
            tag,
            order,
            name,
            score,
            deadline: deadline.map(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap()),
        }
    }

    fn tags(rows: &[Row]) -> Vec<&'static str> {
        rows.iter().map(|r| r.tag).collect()
    }

    #[test]
    fn parse_and_display_keys() {
        for key in SortKey::ALL {
            assert_eq!(key.as_str().parse::<SortKey>().unwrap(), key);
        }
        assert!("bogus".parse::<SortKey>().is_err());
    }

    #[test]
    fn default_uses_manual_order() {
        let rows = vec![
            row("a", 2, "x", None, None),
            row("b", 0, "y", None, None),
            row("c", 1, "z", None, None),
        ];
        assert_eq!(tags(&sorted(&rows, SortKey::Default)), vec!["b", "c", "a"]);
        // source untouched
        assert_eq!(tags(&rows), vec!["a", "b", "c"]);
    }

    #[test]
    fn priority_directions_and_ties() {
        let rows = vec![
            row("a", 0, "a", Some(5.0), None),
            row("b", 1, "b", Some(8.0), None),
            row("c", 2, "c", Some(5.0), None),
            row("d", 3, "d", None, None),
        ];
        assert_eq!(tags(&sorted(&rows, SortKey::PriorityHigh)), vec!["b", "a", "c", "d"]);
        assert_eq!(tags(&sorted(&rows, SortKey::PriorityLow)), vec!["a", "c", "b", "d"]);
    }

    #[test]
    fn deadline_ascending() {
        let rows = vec![
            row("late", 0, "a", None, Some("2024-06-01")),
            row("early", 1, "b", None, Some("2024-01-01")),
        ];
        assert_eq!(tags(&sorted(&rows, SortKey::Deadline)), vec!["early", "late"]);
    }

    #[test]
    fn name_is_case_insensitive_and_stable() {
        let rows = vec![
            row("1", 0, "banana", None, None),
            row("2", 1, "Apple", None, None),
            row("3", 2, "cherry", None, None),
            row("4", 3, "apple", None, None),
            row("5", 4, "banana", None, None),
        ];
        assert_eq!(tags(&sorted(&rows, SortKey::Name)), vec!["4", "2", "1", "5", "3"]);
    }

    #[test]
    fn name_order_treats_accents_as_their_base_letter() {
        let rows = vec![
            row("zoe", 0, "Zoe", None, None),
            row("emile", 1, "Émile", None, None),
            row("eve", 2, "Eve", None, None),
            row("ecole", 3, "école", None, None),
        ];
        assert_eq!(
            tags(&sorted(&rows, SortKey::Name)),
            vec!["ecole", "emile", "eve", "zoe"]
        );
    }

    #[test]
    fn accent_only_breaks_ties() {
        assert_eq!(compare_names("resume", "résumé"), Ordering::Less);
        assert_eq!(compare_names("rest", "résumé"), Ordering::Less);
        assert_eq!(compare_names("same", "same"), Ordering::Equal);
    }

    #[test]
    fn next_order_after_max() {
        let empty: Vec<Row> = Vec::new();
        assert_eq!(next_order(&empty), 0);
        let rows = vec![row("a", 4, "a", None, None), row("b", 1, "b", None, None)];
        assert_eq!(next_order(&rows), 5);
    }
}
