use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::debug;
use url::Url;

use super::dom::{Element, Locator};
use crate::error::ConfigError;

static WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static LINK_BASE: LazyLock<Url> = LazyLock::new(|| Url::parse("http://localhost/").unwrap());

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Integer(i64),
    List(Vec<String>),
}

/// Declared type of a single-value field; decides the default and the final
/// conversion. `Mode::List` fields always produce a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Text,
    Number,
    Integer,
}

impl Kind {
    pub fn default_value(self) -> FieldValue {
        match self {
            Kind::Text => FieldValue::Text(String::new()),
            Kind::Number => FieldValue::Number(0.0),
            Kind::Integer => FieldValue::Integer(0),
        }
    }

    fn convert(self, field: &str, raw: String) -> FieldValue {
        match self {
            Kind::Text => FieldValue::Text(raw),
            Kind::Number => match raw.trim().parse::<f64>() {
                Ok(v) if v.is_finite() => FieldValue::Number(v),
                _ => {
                    debug!(field, raw = %raw, "not a number, using 0");
                    self.default_value()
                }
            },
            Kind::Integer => match raw.trim().parse::<i64>() {
                Ok(v) => FieldValue::Integer(v),
                Err(_) => {
                    debug!(field, raw = %raw, "not an integer, using 0");
                    self.default_value()
                }
            },
        }
    }
}

#[derive(Debug, Clone)]
pub enum Mode {
    /// Named attribute of the first match.
    Attr(String),
    /// Text content of the first match.
    Text,
    /// Text of every match, in document order.
    List,
    /// One segment of the link path held in `attr` of the first match.
    PathSegment { attr: String, index: usize },
}

/// Text post-processing, applied in declared order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Post {
    StripOnce(String),
    Trim,
    CollapseWhitespace,
    TitlePart,
    YearPart,
}

impl Post {
    fn apply(&self, s: String) -> String {
        match self {
            Post::StripOnce(pat) => s.replacen(pat.as_str(), "", 1),
            Post::Trim => s.trim().to_string(),
            Post::CollapseWhitespace => WS_RE.replace_all(&s, " ").into_owned(),
            Post::TitlePart => split_title_year(&s).0,
            Post::YearPart => split_title_year(&s).1,
        }
    }
}

/// How to pull one named field out of an item container.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: String,
    /// `None` reads the container itself.
    pub locator: Option<Locator>,
    pub mode: Mode,
    pub post: Vec<Post>,
    pub kind: Kind,
}

impl FieldSpec {
    fn new(name: &str, css: Option<&str>, mode: Mode, kind: Kind) -> Result<Self, ConfigError> {
        let locator = css.map(Locator::parse).transpose()?;
        Ok(FieldSpec {
            name: name.to_string(),
            locator,
            mode,
            post: Vec::new(),
            kind,
        })
    }

    pub fn attr(name: &str, css: &str, attr: &str) -> Result<Self, ConfigError> {
        Self::new(name, Some(css), Mode::Attr(attr.to_string()), Kind::Text)
    }

    pub fn text(name: &str, css: &str) -> Result<Self, ConfigError> {
        Self::new(name, Some(css), Mode::Text, Kind::Text)
    }

    pub fn list(name: &str, css: &str) -> Result<Self, ConfigError> {
        Self::new(name, Some(css), Mode::List, Kind::Text)
    }

    pub fn path_segment(name: &str, css: &str, attr: &str, index: usize) -> Result<Self, ConfigError> {
        let mode = Mode::PathSegment {
            attr: attr.to_string(),
            index,
        };
        Self::new(name, Some(css), mode, Kind::Text)
    }

    /// Reads the container itself rather than a descendant.
    pub fn own_text(name: &str) -> Result<Self, ConfigError> {
        Self::new(name, None, Mode::Text, Kind::Text)
    }

    pub fn then(mut self, step: Post) -> Self {
        self.post.push(step);
        self
    }

    pub fn number(mut self) -> Self {
        self.kind = Kind::Number;
        self
    }

    pub fn integer(mut self) -> Self {
        self.kind = Kind::Integer;
        self
    }

    fn finish(&self, raw: String) -> String {
        self.post.iter().fold(raw, |acc, step| step.apply(acc))
    }
}

/// Extract one field from `container`. Never fails: a locator that matches
/// nothing, a missing attribute or an unparsable number all give the
/// declared default.
pub fn extract<E: Element>(container: &E, spec: &FieldSpec) -> FieldValue {
    let raw = match &spec.mode {
        Mode::List => {
            let items = match &spec.locator {
                Some(locator) => container.find_all(locator),
                None => vec![container.clone()],
            };
            return FieldValue::List(items.iter().map(|e| spec.finish(e.text())).collect());
        }
        Mode::Attr(attr) => first_match(container, spec).map(|n| n.attr(attr)),
        Mode::Text => first_match(container, spec).map(|n| Some(n.text())),
        Mode::PathSegment { attr, index } => {
            first_match(container, spec).map(|n| n.attr(attr).and_then(|link| path_segment(&link, *index)))
        }
    };
    match raw {
        Some(Some(raw)) => spec.kind.convert(&spec.name, spec.finish(raw)),
        Some(None) => {
            debug!(field = %spec.name, selector = selector(spec), "no value on matched element");
            spec.kind.default_value()
        }
        None => {
            debug!(field = %spec.name, selector = selector(spec), "locator matched nothing");
            spec.kind.default_value()
        }
    }
}

fn first_match<E: Element>(container: &E, spec: &FieldSpec) -> Option<E> {
    match &spec.locator {
        Some(locator) => container.find_first(locator),
        None => Some(container.clone()),
    }
}

fn selector(spec: &FieldSpec) -> &str {
    spec.locator.as_ref().map_or(":self", Locator::as_str)
}

/// Non-empty path segment `index` of a (possibly relative) link;
/// query and fragment are ignored.
pub fn path_segment(link: &str, index: usize) -> Option<String> {
    let url = LINK_BASE.join(link).ok()?;
    let segment = url.path_segments()?.filter(|s| !s.is_empty()).nth(index)?;
    Some(segment.to_string())
}

/// "Dune (2021)" → ("Dune", "2021"). Without " (" the whole text is the
/// title and the year is empty.
pub fn split_title_year(raw: &str) -> (String, String) {
    match raw.split_once(" (") {
        Some((title, rest)) => {
            let year = rest.strip_suffix(')').unwrap_or(rest);
            (title.trim().to_string(), year.to_string())
        }
        None => (raw.trim().to_string(), String::new()),
    }
}

#[cfg(test)]
mod tests {
    use scraper::Html;

    use super::*;

    fn item(html: &str) -> Html {
        Html::parse_fragment(html)
    }

    #[test]
    fn title_year_split() {
        assert_eq!(split_title_year("Dune (2021)"), ("Dune".into(), "2021".into()));
        assert_eq!(split_title_year("Untitled"), ("Untitled".into(), String::new()));
        assert_eq!(split_title_year("  Spaced Out  (1999)"), ("Spaced Out".into(), "1999".into()));
        // Only the first " (" splits.
        assert_eq!(split_title_year("Up (2009) (II)"), ("Up".into(), "2009) (II".into()));
    }

    #[test]
    fn path_segments() {
        assert_eq!(path_segment("/title/tt0111161/", 1).as_deref(), Some("tt0111161"));
        assert_eq!(path_segment("/title/tt0111161/?ref_=inth_ov_tt", 1).as_deref(), Some("tt0111161"));
        assert_eq!(path_segment("https://www.imdb.com/title/tt42/", 1).as_deref(), Some("tt42"));
        assert_eq!(path_segment("/title/", 1), None);
        assert_eq!(path_segment("", 1), None);
    }

    #[test]
    fn missing_locator_gives_declared_default() {
        let doc = item("<div><p>nothing here</p></div>");
        let root = doc.root_element();
        let cases = [
            (FieldSpec::text("plot", ".outline").unwrap(), FieldValue::Text(String::new())),
            (FieldSpec::attr("score", ".s", "data-value").unwrap().number(), FieldValue::Number(0.0)),
            (FieldSpec::text("meta", ".metascore").unwrap().integer(), FieldValue::Integer(0)),
            (FieldSpec::list("cast", ".actor").unwrap(), FieldValue::List(vec![])),
            (FieldSpec::path_segment("id", "h4 a", "href", 1).unwrap(), FieldValue::Text(String::new())),
        ];
        for (spec, expected) in cases {
            assert_eq!(extract(&root, &spec), expected, "field {}", spec.name);
        }
    }

    #[test]
    fn attribute_mode_reads_first_match() {
        let doc = item(r#"<div><span class="r" data-value="8.1"></span><span class="r" data-value="2.0"></span></div>"#);
        let spec = FieldSpec::attr("imdbRating", ".r", "data-value").unwrap().number();
        assert_eq!(extract(&doc.root_element(), &spec), FieldValue::Number(8.1));
    }

    #[test]
    fn missing_attribute_gives_default() {
        let doc = item(r#"<div><span class="r"></span></div>"#);
        let spec = FieldSpec::attr("id", ".r", "data-tconst").unwrap();
        assert_eq!(extract(&doc.root_element(), &spec), FieldValue::Text(String::new()));
    }

    #[test]
    fn malformed_numbers_degrade_to_zero() {
        let doc = item(r#"<div><span class="r" data-value="n/a"></span><span class="m">NaN</span><span class="i">7.5</span></div>"#);
        let root = doc.root_element();
        let rating = FieldSpec::attr("rating", ".r", "data-value").unwrap().number();
        let nan = FieldSpec::text("nan", ".m").unwrap().number();
        let int = FieldSpec::text("meta", ".i").unwrap().integer();
        assert_eq!(extract(&root, &rating), FieldValue::Number(0.0));
        assert_eq!(extract(&root, &nan), FieldValue::Number(0.0));
        assert_eq!(extract(&root, &int), FieldValue::Integer(0));
    }

    #[test]
    fn text_mode_strips_one_newline_then_trims() {
        let doc = item("<div><p class=\"outline\">\n  A desert planet.\nMore.  </p></div>");
        let spec = FieldSpec::text("plot", ".outline")
            .unwrap()
            .then(Post::StripOnce("\n".into()))
            .then(Post::Trim);
        assert_eq!(extract(&doc.root_element(), &spec), FieldValue::Text("A desert planet.\nMore.".into()));
    }

    #[test]
    fn collapse_whitespace() {
        let doc = item("<div><p class=\"d\">  Denis \n\t Villeneuve </p></div>");
        let spec = FieldSpec::text("director", ".d")
            .unwrap()
            .then(Post::CollapseWhitespace)
            .then(Post::Trim);
        assert_eq!(extract(&doc.root_element(), &spec), FieldValue::Text("Denis Villeneuve".into()));
    }

    #[test]
    fn enumeration_keeps_document_order() {
        let doc = item(r#"<div><span class="a"><a> Timothée Chalamet</a></span><span class="a"><a>Zendaya </a></span></div>"#);
        let spec = FieldSpec::list("cast", ".a a").unwrap().then(Post::Trim);
        assert_eq!(
            extract(&doc.root_element(), &spec),
            FieldValue::List(vec!["Timothée Chalamet".into(), "Zendaya".into()])
        );
    }

    #[test]
    fn compound_title_and_year_fields() {
        let doc = item(r#"<div><h4><a href="/title/tt1160419/">  Dune (2021) </a></h4></div>"#);
        let root = doc.root_element();
        let title = FieldSpec::text("title", "h4 a").unwrap().then(Post::Trim).then(Post::TitlePart);
        let year = FieldSpec::text("year", "h4 a").unwrap().then(Post::Trim).then(Post::YearPart);
        let id = FieldSpec::path_segment("id", "h4 a", "href", 1).unwrap();
        assert_eq!(extract(&root, &title), FieldValue::Text("Dune".into()));
        assert_eq!(extract(&root, &year), FieldValue::Text("2021".into()));
        assert_eq!(extract(&root, &id), FieldValue::Text("tt1160419".into()));
    }

    #[test]
    fn selector_names_the_locator() {
        let spec = FieldSpec::text("plot", ".outline").unwrap();
        assert_eq!(selector(&spec), ".outline");
        assert_eq!(selector(&FieldSpec::own_text("label").unwrap()), ":self");
    }

    #[test]
    fn list_field_ignores_kind() {
        let doc = item(r#"<div><span class="a">7</span><span class="a">x</span></div>"#);
        let spec = FieldSpec::list("tags", ".a").unwrap().number();
        assert_eq!(extract(&doc.root_element(), &spec), FieldValue::List(vec!["7".into(), "x".into()]));
    }

    #[test]
    fn own_text_reads_container() {
        let doc = item("<div>  hi </div>");
        let div = doc.root_element().find_first(&Locator::parse("div").unwrap()).unwrap();
        let spec = FieldSpec::own_text("label").unwrap().then(Post::Trim);
        assert_eq!(extract(&div, &spec), FieldValue::Text("hi".into()));
    }
}
