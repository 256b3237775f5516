pub mod error;
pub mod notify;
pub mod parser;
pub mod payload;
pub mod settings;
pub mod source;

use tracing::info;

use error::RunError;
use notify::Notifier;
use parser::shapes::Shape;
use payload::Payload;
use source::MarkupSource;

/// One invocation: fetch → extract → serialize → deliver, strictly in
/// sequence. Fails only on configuration, the source, or delivery.
pub fn run(
    source: &dyn MarkupSource,
    notifier: &dyn Notifier,
    shape: Shape,
    limits: &[i64],
    url: &str,
) -> Result<Payload, RunError> {
    let record_shape = shape.build(limits)?;
    let doc = source.fetch(url)?;
    let payload = Payload::new(parser::extract_page(&doc, &record_shape), url);
    let text = payload.serialize()?;
    notifier.send(&text)?;
    info!(bytes = text.len(), "Run complete");
    Ok(payload)
}
