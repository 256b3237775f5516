use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::{debug, warn};

use super::dom::Element;
use super::fields::{extract, FieldSpec, FieldValue};

/// One item's fields, in the order the shape declares them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    fields: Vec<(String, FieldValue)>,
}

impl Record {
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    fn push(&mut self, name: &str, value: FieldValue) {
        self.fields.push((name.to_string(), value));
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordBucket {
    pub label: String,
    pub records: Vec<Record>,
}

/// Label and item cap for one bucket. `limit <= 0` is unbounded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketSpec {
    pub label: String,
    pub limit: i64,
}

impl BucketSpec {
    pub fn new(label: &str, limit: i64) -> Self {
        BucketSpec {
            label: label.to_string(),
            limit,
        }
    }
}

fn bound(limit: i64) -> Option<usize> {
    if limit > 0 {
        Some(usize::try_from(limit).unwrap_or(usize::MAX))
    } else {
        None
    }
}

/// Build one record per container, in order, stopping after `limit`
/// containers when `limit > 0`.
pub fn assemble<E, I>(containers: I, specs: &[FieldSpec], limit: i64) -> Vec<Record>
where
    E: Element,
    I: IntoIterator<Item = E>,
{
    containers
        .into_iter()
        .take(bound(limit).unwrap_or(usize::MAX))
        .map(|c| build_record(&c, specs))
        .collect()
}

fn build_record<E: Element>(container: &E, specs: &[FieldSpec]) -> Record {
    let mut record = Record::default();
    for spec in specs {
        record.push(&spec.name, extract(container, spec));
    }
    record
}

/// Assemble each caller-partitioned group into its own bucket. Group `i`
/// feeds bucket `i`; a bucket without a group comes out empty.
pub fn assemble_buckets<E: Element>(
    groups: Vec<Vec<E>>,
    buckets: &[BucketSpec],
    specs: &[FieldSpec],
) -> Vec<RecordBucket> {
    if groups.len() > buckets.len() {
        debug!(groups = groups.len(), buckets = buckets.len(), "ignoring extra groups");
    }
    let mut groups = groups.into_iter();
    buckets
        .iter()
        .map(|bucket| {
            let containers = groups.next().unwrap_or_else(|| {
                warn!(bucket = %bucket.label, "group missing from document");
                Vec::new()
            });
            let records = assemble(containers, specs, bucket.limit);
            debug!(bucket = %bucket.label, records = records.len(), "assembled bucket");
            RecordBucket {
                label: bucket.label.clone(),
                records,
            }
        })
        .collect()
}
