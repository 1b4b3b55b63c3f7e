use anyhow::{Context, Result};

use crate::changeset::{ChangeEvent, ChangeResult, Operation};
use crate::config::RuntimeConfig;
use crate::element::Element;
use crate::mapping::{Mapping, RelationTagFilter, TagFilter};
use crate::sinks::{ChangeRecord, ChangeSink};

/// One filter per element kind, built from the same mapping.
#[derive(Debug, Clone)]
pub struct ChangeFilters {
    pub node: TagFilter,
    pub way: TagFilter,
    pub relation: RelationTagFilter,
}

impl ChangeFilters {
    pub fn from_mapping(mapping: &Mapping) -> Self {
        Self {
            node: mapping.node_tag_filter(),
            way: mapping.way_tag_filter(),
            relation: mapping.relation_tag_filter(),
        }
    }

    /// Prune the element's tags and report whether it is relevant.
    pub fn apply(&self, element: &mut Element) -> bool {
        match element {
            Element::Node(node) => self.node.filter(&mut node.tags),
            Element::Way(way) => self.way.filter(&mut way.tags),
            Element::Relation(rel) => self.relation.filter(&mut rel.tags),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSummary {
    pub created: u64,
    pub modified: u64,
    pub deleted: u64,
    pub nodes: u64,
    pub ways: u64,
    pub relations: u64,
    pub relevant: u64,
    pub written: u64,
}

impl ChangeSummary {
    pub fn total(&self) -> u64 {
        self.created + self.modified + self.deleted
    }

    fn record(&mut self, change: &ChangeEvent, relevant: bool) {
        match change.operation {
            Operation::Added => self.created += 1,
            Operation::Modified => self.modified += 1,
            Operation::Deleted => self.deleted += 1,
        }
        match change.element {
            Element::Node(_) => self.nodes += 1,
            Element::Way(_) => self.ways += 1,
            Element::Relation(_) => self.relations += 1,
        }
        if relevant {
            self.relevant += 1;
        }
    }
}

/// Filter decoded changes and write the ones the import needs.
///
/// Deletions are always written since the element has to disappear
/// downstream whatever its tags were. Stops at the first decode error.
pub fn process_changes<I>(
    changes: I,
    filters: &ChangeFilters,
    runtime: &RuntimeConfig,
    sink: &mut dyn ChangeSink,
) -> Result<ChangeSummary>
where
    I: IntoIterator<Item = ChangeResult>,
{
    let mut summary = ChangeSummary::default();

    for item in changes {
        let mut change = item.context("Pipeline: Failed to decode changeset")?;
        let relevant = filters.apply(&mut change.element);
        summary.record(&change, relevant);

        let keep = relevant || runtime.keep_irrelevant || change.operation == Operation::Deleted;
        if !keep {
            tracing::trace!(
                "skipping irrelevant {} {}",
                change.element.kind(),
                change.element.id()
            );
            continue;
        }

        let (kind, id) = (change.element.kind(), change.element.id());
        sink.add_change(ChangeRecord { change, relevant })
            .with_context(|| format!("Pipeline: Failed writing {} {}", kind, id))?;
        summary.written += 1;
    }

    Ok(summary)
}
