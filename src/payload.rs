use serde_json::{Map, Value};

use crate::parser::assemble::RecordBucket;

pub const LINK_KEY: &str = "imdbLink";

/// Buckets of records plus the page they came from, ready for delivery.
#[derive(Debug, Clone, PartialEq)]
pub struct Payload {
    pub buckets: Vec<RecordBucket>,
    pub link: String,
}

impl Payload {
    pub fn new(buckets: Vec<RecordBucket>, link: &str) -> Self {
        Payload {
            buckets,
            link: link.to_string(),
        }
    }

    fn to_value(&self) -> Result<Map<String, Value>, serde_json::Error> {
        let mut map = Map::new();
        for bucket in &self.buckets {
            map.insert(bucket.label.clone(), serde_json::to_value(&bucket.records)?);
        }
        map.insert(LINK_KEY.to_string(), Value::String(self.link.clone()));
        Ok(map)
    }

    /// JSON text with one key per bucket, in bucket order, followed by the
    /// source link. Every bucket key holds an array, even when it is empty.
    pub fn serialize(&self) -> Result<String, serde_json::Error> {
        let mut map = self.to_value()?;
        fill_empty_buckets(&mut map, self.buckets.iter().map(|b| b.label.as_str()));
        serde_json::to_string(&Value::Object(map))
    }
}

/// Make every listed bucket key an array: absent or null becomes `[]`.
pub fn fill_empty_buckets<'a>(map: &mut Map<String, Value>, labels: impl IntoIterator<Item = &'a str>) {
    for label in labels {
        match map.get_mut(label) {
            Some(Value::Array(_)) => {}
            Some(slot) => *slot = Value::Array(Vec::new()),
            None => {
                map.insert(label.to_string(), Value::Array(Vec::new()));
            }
        }
    }
}
