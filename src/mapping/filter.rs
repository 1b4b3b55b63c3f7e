//! Tag filters deciding whether an element is relevant to the import.

use super::rules::RuleTable;
use crate::element::Tags;

/// Tag key holding the structural type of a relation.
pub const RELATION_TYPE_KEY: &str = "type";

const ACCEPTED_RELATION_TYPES: [&str; 3] = ["multipolygon", "boundary", "land_area"];

/// Filters the tags of nodes or ways against a [`RuleTable`].
///
/// The filter is immutable and can be shared between threads; it only
/// mutates the tags passed to [`TagFilter::filter`].
#[derive(Debug, Clone)]
pub struct TagFilter {
    rules: RuleTable,
}

impl TagFilter {
    pub fn new(rules: RuleTable) -> Self {
        Self { rules }
    }

    /// Remove tags that neither match a rule nor are extra tags.
    ///
    /// Returns true if at least one tag matched a rule. Extra tags are kept
    /// but do not make an element relevant on their own.
    pub fn filter(&self, tags: &mut Tags) -> bool {
        let mut matched = false;
        tags.retain(|key, value| {
            if self.rules.matches(key, value) {
                matched = true;
                true
            } else {
                self.rules.is_extra_tag(key)
            }
        });
        matched
    }
}

/// Relation filter: only multipolygon, boundary and land_area relations
/// pass. The `type` tag always survives filtering.
#[derive(Debug, Clone)]
pub struct RelationTagFilter {
    inner: TagFilter,
}

impl RelationTagFilter {
    pub fn new(mut rules: RuleTable) -> Self {
        rules.insert_extra_tag(RELATION_TYPE_KEY);
        Self {
            inner: TagFilter::new(rules),
        }
    }

    /// Rejects relations without an accepted `type` and leaves their tags
    /// untouched. Accepted relations are pruned like ways and always pass,
    /// whether or not any other tag matched a rule.
    pub fn filter(&self, tags: &mut Tags) -> bool {
        let accepted = tags
            .get(RELATION_TYPE_KEY)
            .is_some_and(|kind| ACCEPTED_RELATION_TYPES.contains(&kind.as_str()));
        if !accepted {
            return false;
        }

        self.inner.filter(tags);
        // the type tag already decided relevance
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(pairs: &[(&str, &str)]) -> Tags {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn point_filter() -> TagFilter {
        let mut rules = RuleTable::new();
        rules.insert_rule("shop", "bakery");
        rules.insert_extra_tag("name");
        TagFilter::new(rules)
    }

    fn relation_filter() -> RelationTagFilter {
        let mut rules = RuleTable::new();
        rules.insert_rule("building", "__any__");
        rules.insert_extra_tag("name");
        RelationTagFilter::new(rules)
    }

    #[test]
    fn matching_tag_keeps_rule_and_extra_tags() {
        let mut t = tags(&[("shop", "bakery"), ("name", "Joe's"), ("foo", "bar")]);

        assert!(point_filter().filter(&mut t));
        assert_eq!(t, tags(&[("shop", "bakery"), ("name", "Joe's")]));
    }

    #[test]
    fn extra_tags_alone_are_not_relevant() {
        let mut t = tags(&[("name", "Joe's"), ("foo", "bar")]);

        assert!(!point_filter().filter(&mut t));
        assert_eq!(t, tags(&[("name", "Joe's")]));
    }

    #[test]
    fn unmatched_value_of_mapped_key_is_removed() {
        let mut t = tags(&[("shop", "florist"), ("name", "Petals")]);

        assert!(!point_filter().filter(&mut t));
        assert_eq!(t, tags(&[("name", "Petals")]));
    }

    #[test]
    fn wildcard_rule_matches_any_value() {
        let mut rules = RuleTable::new();
        rules.insert_rule("amenity", "__any__");
        let filter = TagFilter::new(rules);

        for value in ["restaurant", "bench", ""] {
            let mut t = tags(&[("amenity", value)]);
            assert!(filter.filter(&mut t));
            assert_eq!(t["amenity"], value);
        }
    }

    #[test]
    fn filter_is_idempotent() {
        let filter = point_filter();
        let mut once = tags(&[("shop", "bakery"), ("name", "Joe's"), ("foo", "bar")]);
        let first = filter.filter(&mut once);
        let mut twice = once.clone();
        let second = filter.filter(&mut twice);

        assert_eq!(first, second);
        assert_eq!(once, twice);
    }

    #[test]
    fn empty_tags_are_not_relevant() {
        let mut t = Tags::new();
        assert!(!point_filter().filter(&mut t));
        assert!(t.is_empty());
    }

    #[test]
    fn relation_without_type_is_rejected_untouched() {
        let mut t = tags(&[("building", "yes"), ("foo", "bar")]);

        assert!(!relation_filter().filter(&mut t));
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn relation_with_unknown_type_is_rejected() {
        let mut t = tags(&[("type", "route"), ("building", "yes")]);
        assert!(!relation_filter().filter(&mut t));
    }

    #[test]
    fn accepted_relation_types_pass_without_rule_match() {
        let filter = relation_filter();
        for kind in ["multipolygon", "boundary", "land_area"] {
            let mut t = tags(&[("type", kind), ("foo", "bar")]);
            assert!(filter.filter(&mut t), "type={kind}");
            assert_eq!(t, tags(&[("type", kind)]));
        }
    }

    #[test]
    fn accepted_relation_is_pruned() {
        let mut t = tags(&[
            ("type", "multipolygon"),
            ("building", "yes"),
            ("name", "Hall"),
            ("note", "fixme"),
        ]);

        assert!(relation_filter().filter(&mut t));
        assert_eq!(
            t,
            tags(&[("type", "multipolygon"), ("building", "yes"), ("name", "Hall")])
        );
    }
}
