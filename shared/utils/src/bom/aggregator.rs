//! BOM Aggregator
//!
//! Groups drawing objects by their grouping-field values, counts them and
//! collapses each extra field to one display value per group.

use std::collections::{HashMap, HashSet};

use cadbom_models::{AttrValue, BomRow, NAME_FIELD, TYPE_FIELD};
use tracing::debug;

use super::extractor::{FieldCandidates, PropertyExtractor};
use crate::config::AggregationConfig;

/// Joins the distinct values of an extra field that varies within a group
pub const COLLAPSE_SEPARATOR: &str = "; ";

/// Tuple of an object's grouping-field values; absent equals absent
pub type GroupingKey = Vec<Option<AttrValue>>;

/// Totals over an aggregated BOM
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BomSummary {
    pub rows: usize,
    pub total_quantity: usize,
}

impl BomSummary {
    pub fn from_rows(rows: &[BomRow]) -> Self {
        Self {
            rows: rows.len(),
            total_quantity: rows.iter().map(BomRow::quantity).sum(),
        }
    }
}

/// Rows under construction, kept in first-seen order
struct Group {
    row: BomRow,
    /// Distinct non-absent values per extra field, parallel to `extra_fields`
    seen: Vec<HashSet<AttrValue>>,
}

/// BOM aggregator
pub struct BomAggregator {
    extractor: PropertyExtractor,
    key_fields: Vec<String>,
    extra_fields: Vec<String>,
}

impl Default for BomAggregator {
    fn default() -> Self {
        Self {
            extractor: PropertyExtractor::default(),
            key_fields: vec![NAME_FIELD.to_string(), TYPE_FIELD.to_string()],
            extra_fields: Vec::new(),
        }
    }
}

impl BomAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the `[aggregation]` config section
    pub fn from_config(config: &AggregationConfig) -> Self {
        let extractor = config
            .candidates
            .iter()
            .fold(PropertyExtractor::new(), |extractor, (field, tiers)| {
                extractor.with_candidates(FieldCandidates::new(field.clone(), tiers.clone()))
            });

        Self::new()
            .with_extractor(extractor)
            .with_key_fields(config.key_fields.iter().cloned())
            .with_extra_fields(config.extra_fields.iter().cloned())
    }

    /// Configure grouping fields
    pub fn with_key_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.key_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Configure collapsed extra fields
    pub fn with_extra_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_extractor(mut self, extractor: PropertyExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn key_fields(&self) -> &[String] {
        &self.key_fields
    }

    pub fn extra_fields(&self) -> &[String] {
        &self.extra_fields
    }

    /// Aggregate objects into BOM rows, in first-seen order of their grouping key
    pub fn aggregate<'a, I>(&self, records: I) -> Vec<BomRow>
    where
        I: IntoIterator<Item = &'a AttrValue>,
    {
        let mut index: HashMap<GroupingKey, usize> = HashMap::new();
        let mut groups: Vec<Group> = Vec::new();
        let mut record_count = 0usize;

        for record in records {
            record_count += 1;
            let properties = self.extractor.extract(record, self.extra_fields.as_slice());

            let key: GroupingKey = self
                .key_fields
                .iter()
                .map(|field| properties.get(field).cloned())
                .collect();

            let slot = match index.get(&key) {
                Some(&slot) => slot,
                None => {
                    let row = BomRow::new(self.key_fields.iter().cloned().zip(key.iter().cloned()));
                    groups.push(Group {
                        row,
                        seen: vec![HashSet::new(); self.extra_fields.len()],
                    });
                    index.insert(key, groups.len() - 1);
                    groups.len() - 1
                }
            };

            let group = &mut groups[slot];
            group.row.increment();

            for (field, seen) in self.extra_fields.iter().zip(group.seen.iter_mut()) {
                if let Some(value) = properties.get(field) {
                    seen.insert(value.clone());
                }
            }
        }

        let rows: Vec<BomRow> = groups
            .into_iter()
            .map(|group| {
                let mut row = group.row;
                for (field, seen) in self.extra_fields.iter().zip(group.seen) {
                    row.set_extra(field.clone(), collapse(seen));
                }
                row
            })
            .collect();

        debug!(
            records = record_count,
            rows = rows.len(),
            "aggregated BOM"
        );
        rows
    }
}

/// Aggregate with the default candidate table
pub fn aggregate_bom<'a, I, K, E>(records: I, key_fields: K, extra_fields: E) -> Vec<BomRow>
where
    I: IntoIterator<Item = &'a AttrValue>,
    K: IntoIterator,
    K::Item: Into<String>,
    E: IntoIterator,
    E::Item: Into<String>,
{
    BomAggregator::new()
        .with_key_fields(key_fields)
        .with_extra_fields(extra_fields)
        .aggregate(records)
}

/// Reduce the distinct values observed for one field in one group.
/// Several values become their display strings, sorted and joined.
fn collapse(values: HashSet<AttrValue>) -> Option<AttrValue> {
    match values.len() {
        0 => None,
        1 => values.into_iter().next(),
        _ => {
            let mut labels: Vec<String> = values.iter().map(ToString::to_string).collect();
            labels.sort();
            Some(AttrValue::Text(labels.join(COLLAPSE_SEPARATOR)))
        }
    }
}
