use serde::{Deserialize, Serialize};

use crate::record::CanonicalRecord;

/// Minimal description of a list entry, enough to navigate to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiblingRef {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl From<&CanonicalRecord> for SiblingRef {
    fn from(record: &CanonicalRecord) -> Self {
        Self {
            name: record.name.clone(),
            category: (!record.category.is_empty()).then(|| record.category.clone()),
        }
    }
}

/// Previous/next entries around the current record in a list context.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Neighbors {
    /// Position of the current record in the context, if found.
    pub index: Option<usize>,
    pub prev: Option<SiblingRef>,
    pub next: Option<SiblingRef>,
}

/// Detail view payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailOutput {
    pub record: CanonicalRecord,
    pub neighbors: Neighbors,
}

fn same_category(candidate: &str, wanted: &str) -> bool {
    candidate.to_lowercase() == wanted.to_lowercase()
}

/// Pick the record to show from a name lookup.
///
/// Several characters can share a name across schools; prefer the one whose
/// category matches `category`, otherwise fall back to the first.
pub fn pick_by_category<'a>(
    candidates: &'a [CanonicalRecord],
    category: Option<&str>,
) -> Option<&'a CanonicalRecord> {
    let first = candidates.first()?;
    let Some(category) = category else {
        return Some(first);
    };
    candidates
        .iter()
        .find(|record| same_category(&record.category, category))
        .or(Some(first))
}

/// Locate `name` (and `category` when given) in `context` and return its neighbours.
///
/// Without a context, or when the record is not part of it, no navigation is offered.
pub fn neighbors(context: &[SiblingRef], name: &str, category: Option<&str>) -> Neighbors {
    let index = context.iter().position(|entry| {
        entry.name == name
            && match category {
                Some(wanted) => {
                    same_category(entry.category.as_deref().unwrap_or_default(), wanted)
                }
                None => true,
            }
    });

    let Some(index) = index else {
        return Neighbors::default();
    };

    Neighbors {
        index: Some(index),
        prev: index.checked_sub(1).and_then(|i| context.get(i)).cloned(),
        next: context.get(index + 1).cloned(),
    }
}

/// Assemble the detail payload for a name lookup, or `None` when nothing matched.
pub fn build_detail(
    candidates: &[CanonicalRecord],
    category: Option<&str>,
    context: &[SiblingRef],
) -> Option<DetailOutput> {
    let record = pick_by_category(candidates, category)?.clone();
    let neighbors = neighbors(context, &record.name, category);
    Some(DetailOutput { record, neighbors })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_record(name: &str, category: &str) -> CanonicalRecord {
        CanonicalRecord {
            name: name.to_string(),
            category: category.to_string(),
            ..CanonicalRecord::default()
        }
    }

    fn context() -> Vec<SiblingRef> {
        [
            make_record("Aru", "Gehenna"),
            make_record("Hina", "Gehenna"),
            make_record("Mika", "Trinity"),
        ]
        .iter()
        .map(SiblingRef::from)
        .collect()
    }

    #[test]
    fn test_pick_prefers_matching_category() {
        let candidates = vec![make_record("Shiroko", "Abydos"), make_record("Shiroko", "Arius")];

        let picked = pick_by_category(&candidates, Some("arius")).unwrap();
        assert_eq!(picked.category, "Arius");
    }

    #[test]
    fn test_pick_falls_back_to_first() {
        let candidates = vec![make_record("Shiroko", "Abydos"), make_record("Shiroko", "Arius")];

        assert_eq!(pick_by_category(&candidates, Some("SRT")).unwrap().category, "Abydos");
        assert_eq!(pick_by_category(&candidates, None).unwrap().category, "Abydos");
        assert!(pick_by_category(&[], None).is_none());
    }

    #[test]
    fn test_neighbors_in_the_middle() {
        let result = neighbors(&context(), "Hina", None);

        assert_eq!(result.index, Some(1));
        assert_eq!(result.prev.unwrap().name, "Aru");
        assert_eq!(result.next.unwrap().name, "Mika");
    }

    #[test]
    fn test_neighbors_at_edges() {
        let first = neighbors(&context(), "Aru", None);
        assert!(first.prev.is_none());
        assert_eq!(first.next.unwrap().name, "Hina");

        let last = neighbors(&context(), "Mika", Some("trinity"));
        assert_eq!(last.prev.unwrap().name, "Hina");
        assert!(last.next.is_none());
    }

    #[test]
    fn test_neighbors_require_category_match() {
        let result = neighbors(&context(), "Mika", Some("Gehenna"));
        assert_eq!(result, Neighbors::default());
    }

    #[test]
    fn test_no_context_means_no_navigation() {
        assert_eq!(neighbors(&[], "Aru", None), Neighbors::default());
    }

    #[test]
    fn test_build_detail() {
        let candidates = vec![make_record("Hina", "Gehenna")];

        let detail = build_detail(&candidates, Some("Gehenna"), &context()).unwrap();
        assert_eq!(detail.record.name, "Hina");
        assert_eq!(detail.neighbors.index, Some(1));

        assert!(build_detail(&[], None, &context()).is_none());
    }

    #[test]
    fn test_sibling_ref_omits_empty_category() {
        let sibling = SiblingRef::from(&make_record("Arona", ""));
        assert_eq!(sibling.category, None);
    }
}
