//! Sort and filter engine
//!
//! Pure, non-mutating transforms over record lists. Category and subtype sort
//! by a fixed rank table rather than alphabetically; unknown values rank last.
//! Direction flips the comparator (tie-break included), it never reverses the
//! sorted output.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::record::CanonicalRecord;

/// Priority order of schools.
pub const CATEGORY_ORDER: &[&str] = &[
    "Trinity",
    "Gehenna",
    "Millennium",
    "Abydos",
    "Hyakkiyako",
    "Shanhaijing",
    "Red Winter",
    "Arius",
    "SRT",
    "Valkyrie",
];

/// Priority order of damage types.
pub const SUBTYPE_ORDER: &[&str] = &["Explosive", "Penetration", "Mystic"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Name,
    Category,
    Subtype,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "name" => Ok(SortKey::Name),
            "category" | "school" => Ok(SortKey::Category),
            "subtype" | "damage" => Ok(SortKey::Subtype),
            other => Err(format!(
                "Invalid sort key: {other}. Valid keys: name, school, damage"
            )),
        }
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Asc),
            "desc" | "descending" => Ok(SortDirection::Desc),
            other => Err(format!(
                "Invalid sort direction: {other}. Valid directions: asc, desc"
            )),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SortKey::Name => "name",
            SortKey::Category => "school",
            SortKey::Subtype => "damage",
        };
        f.write_str(label)
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => f.write_str("asc"),
            SortDirection::Desc => f.write_str("desc"),
        }
    }
}

/// Position of `value` in `order`, case-insensitive. Unknown values get `usize::MAX`.
pub fn rank(order: &[&str], value: &str) -> usize {
    order
        .iter()
        .position(|known| known.eq_ignore_ascii_case(value))
        .unwrap_or(usize::MAX)
}

fn compare(a: &CanonicalRecord, b: &CanonicalRecord, key: SortKey) -> Ordering {
    let by_name = || a.name.cmp(&b.name);
    match key {
        SortKey::Name => by_name(),
        SortKey::Category => rank(CATEGORY_ORDER, &a.category)
            .cmp(&rank(CATEGORY_ORDER, &b.category))
            .then_with(by_name),
        SortKey::Subtype => rank(SUBTYPE_ORDER, &a.subtype)
            .cmp(&rank(SUBTYPE_ORDER, &b.subtype))
            .then_with(by_name),
    }
}

/// Stable sort returning a new list; `items` is left untouched.
pub fn sort_records(
    items: &[CanonicalRecord],
    key: SortKey,
    direction: SortDirection,
) -> Vec<CanonicalRecord> {
    let mut sorted = items.to_vec();
    sorted.sort_by(|a, b| direction.apply(compare(a, b, key)));
    sorted
}

/// Case-insensitive substring match on name, category or subtype.
///
/// A blank query returns the input unchanged.
pub fn filter_by_query(items: &[CanonicalRecord], query: &str) -> Vec<CanonicalRecord> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return items.to_vec();
    }

    items
        .iter()
        .filter(|record| {
            [&record.name, &record.category, &record.subtype]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_record(name: &str, category: &str, subtype: &str) -> CanonicalRecord {
        CanonicalRecord {
            name: name.to_string(),
            category: category.to_string(),
            subtype: subtype.to_string(),
            ..CanonicalRecord::default()
        }
    }

    fn names(records: &[CanonicalRecord]) -> Vec<&str> {
        records.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn test_sort_by_name() {
        let items = vec![
            make_record("Hina", "", ""),
            make_record("Aru", "", ""),
            make_record("Mika", "", ""),
        ];

        let asc = sort_records(&items, SortKey::Name, SortDirection::Asc);
        let desc = sort_records(&items, SortKey::Name, SortDirection::Desc);

        assert_eq!(names(&asc), vec!["Aru", "Hina", "Mika"]);
        assert_eq!(names(&desc), vec!["Mika", "Hina", "Aru"]);
    }

    #[test]
    fn test_sort_does_not_mutate_input() {
        let items = vec![make_record("B", "", ""), make_record("A", "", "")];
        let _ = sort_records(&items, SortKey::Name, SortDirection::Asc);
        assert_eq!(names(&items), vec!["B", "A"]);
    }

    #[test]
    fn test_sort_by_category_uses_rank_table() {
        let items = vec![
            make_record("Shiroko", "Abydos", ""),
            make_record("Hina", "Gehenna", ""),
            make_record("Mika", "Trinity", ""),
            make_record("Yuuka", "Millennium", ""),
        ];

        let sorted = sort_records(&items, SortKey::Category, SortDirection::Asc);

        assert_eq!(names(&sorted), vec!["Mika", "Hina", "Yuuka", "Shiroko"]);
    }

    #[test]
    fn test_rank_lookup_is_case_insensitive() {
        assert_eq!(rank(CATEGORY_ORDER, "red winter"), 6);
        assert_eq!(rank(CATEGORY_ORDER, "srt"), 8);
        assert_eq!(rank(SUBTYPE_ORDER, "MYSTIC"), 2);
        assert_eq!(rank(SUBTYPE_ORDER, "Sonic"), usize::MAX);
    }

    #[test]
    fn test_unknown_category_ranks_last() {
        let items = vec![
            make_record("Zed", "Unknown Academy", ""),
            make_record("Neru", "Millennium", ""),
            make_record("Empty", "", ""),
        ];

        let sorted = sort_records(&items, SortKey::Category, SortDirection::Asc);

        assert_eq!(names(&sorted), vec!["Neru", "Empty", "Zed"]);
    }

    #[test]
    fn test_tie_break_flips_with_direction() {
        let items = vec![make_record("B", "Nowhere", ""), make_record("A", "Nowhere", "")];

        let asc = sort_records(&items, SortKey::Category, SortDirection::Asc);
        let desc = sort_records(&items, SortKey::Category, SortDirection::Desc);

        assert_eq!(names(&asc), vec!["A", "B"]);
        assert_eq!(names(&desc), vec!["B", "A"]);
    }

    #[test]
    fn test_desc_flips_rank_and_tie_break_together() {
        let items = vec![
            make_record("Aru", "Gehenna", "Explosive"),
            make_record("Mika", "Trinity", "Mystic"),
            make_record("Hina", "Gehenna", "Explosive"),
            make_record("Wakamo", "Hyakkiyako", "Penetration"),
        ];

        let desc = sort_records(&items, SortKey::Subtype, SortDirection::Desc);

        assert_eq!(names(&desc), vec!["Mika", "Wakamo", "Hina", "Aru"]);
    }

    #[test]
    fn test_filter_matches_any_field() {
        let items = vec![
            make_record("Hoshino", "Abydos", "Explosive"),
            make_record("Hina", "Gehenna", "Explosive"),
            make_record("Mika", "Trinity", "Mystic"),
        ];

        assert_eq!(names(&filter_by_query(&items, "abyd")), vec!["Hoshino"]);
        assert_eq!(names(&filter_by_query(&items, "MYST")), vec!["Mika"]);
        assert_eq!(names(&filter_by_query(&items, " h ")), vec!["Hoshino", "Hina"]);
        assert!(filter_by_query(&items, "nobody").is_empty());
    }

    #[test]
    fn test_blank_query_returns_input() {
        let items = vec![make_record("B", "", ""), make_record("A", "", "")];

        assert_eq!(filter_by_query(&items, ""), items);
        assert_eq!(filter_by_query(&items, "   "), items);
    }

    #[test]
    fn test_parse_keys_and_directions() {
        assert_eq!("school".parse::<SortKey>(), Ok(SortKey::Category));
        assert_eq!("Damage".parse::<SortKey>(), Ok(SortKey::Subtype));
        assert_eq!("name".parse::<SortKey>(), Ok(SortKey::Name));
        assert!("age".parse::<SortKey>().is_err());
        assert_eq!("DESC".parse::<SortDirection>(), Ok(SortDirection::Desc));
        assert!("up".parse::<SortDirection>().is_err());
    }
}
