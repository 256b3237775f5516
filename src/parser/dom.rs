use scraper::{ElementRef, Html, Selector};

use crate::error::ConfigError;

/// A CSS selector parsed once, when the record shape is built.
#[derive(Debug, Clone)]
pub struct Locator {
    css: String,
    selector: Selector,
}

impl Locator {
    pub fn parse(css: &str) -> Result<Self, ConfigError> {
        let selector = Selector::parse(css).map_err(|e| ConfigError::Selector {
            css: css.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Locator {
            css: css.to_string(),
            selector,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.css
    }
}

/// What the extractor needs from a parsed document node: locate-by-selector,
/// read-attribute, read-text and enumerate-matches. Nodes are read-only.
pub trait Element: Sized + Clone {
    /// All descendants matching `locator`, in document order.
    fn find_all(&self, locator: &Locator) -> Vec<Self>;

    fn find_first(&self, locator: &Locator) -> Option<Self> {
        self.find_all(locator).into_iter().next()
    }

    fn attr(&self, name: &str) -> Option<String>;

    /// Concatenated text of the node and its descendants.
    fn text(&self) -> String;
}

impl<'a> Element for ElementRef<'a> {
    fn find_all(&self, locator: &Locator) -> Vec<Self> {
        self.select(&locator.selector).collect()
    }

    fn find_first(&self, locator: &Locator) -> Option<Self> {
        self.select(&locator.selector).next()
    }

    fn attr(&self, name: &str) -> Option<String> {
        self.value().attr(name).map(str::to_string)
    }

    fn text(&self) -> String {
        ElementRef::text(self).collect()
    }
}

/// Top-level groups of a document. Without a group locator the whole
/// document is a single group.
pub fn groups<'a>(doc: &'a Html, group: Option<&Locator>) -> Vec<ElementRef<'a>> {
    match group {
        Some(locator) => doc.root_element().find_all(locator),
        None => vec![doc.root_element()],
    }
}
