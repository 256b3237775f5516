pub mod assemble;
pub mod dom;
pub mod fields;
pub mod shapes;

use scraper::Html;
use tracing::info;

use assemble::{assemble_buckets, RecordBucket};
use dom::Element;
use shapes::RecordShape;

/// Document → groups → item containers → bounded buckets of records.
pub fn extract_page(doc: &Html, shape: &RecordShape) -> Vec<RecordBucket> {
    let groups: Vec<_> = dom::groups(doc, shape.group.as_ref())
        .iter()
        .map(|g| g.find_all(&shape.item))
        .collect();
    let buckets = assemble_buckets(groups, &shape.buckets, &shape.fields);
    for b in &buckets {
        info!(bucket = %b.label, records = b.records.len(), "extracted");
    }
    buckets
}
