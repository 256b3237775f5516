use chrono::{Days, NaiveDate};
use clap::ValueEnum;
use serde::Deserialize;

use super::assemble::BucketSpec;
use super::dom::Locator;
use super::fields::{FieldSpec, Post};
use crate::error::ConfigError;

const SEARCH_URL: &str = "https://www.imdb.com/search/title/";
const IN_THEATERS_URL: &str = "https://www.imdb.com/movies-in-theaters/";

/// Which listing page to read and which record shape to build from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    /// Feature films released this week: identifier and rating.
    #[default]
    Ratings,
    /// Movies in theaters, split into new and already-playing releases.
    Showtimes,
}

/// Everything needed to turn one listing page into buckets of records.
#[derive(Debug, Clone)]
pub struct RecordShape {
    /// Top-level groups; `None` treats the page as one group.
    pub group: Option<Locator>,
    pub item: Locator,
    pub fields: Vec<FieldSpec>,
    pub buckets: Vec<BucketSpec>,
}

impl Shape {
    pub fn listing_url(self, today: NaiveDate, window_days: u64) -> String {
        match self {
            Shape::Ratings => {
                let start = today.checked_sub_days(Days::new(window_days)).unwrap_or(today);
                format!(
                    "{SEARCH_URL}?title_type=feature&year={},{}&view=advanced",
                    start.format("%Y-%m-%d"),
                    today.format("%Y-%m-%d")
                )
            }
            Shape::Showtimes => IN_THEATERS_URL.to_string(),
        }
    }

    /// Bucket labels this shape produces, in payload order.
    pub fn labels(self) -> &'static [&'static str] {
        match self {
            Shape::Ratings => &["movies"],
            Shape::Showtimes => &["new", "old"],
        }
    }

    /// Build the shape with one limit per label; missing limits are unbounded.
    pub fn build(self, limits: &[i64]) -> Result<RecordShape, ConfigError> {
        let buckets = self
            .labels()
            .iter()
            .enumerate()
            .map(|(i, label)| BucketSpec::new(label, limits.get(i).copied().unwrap_or(0)))
            .collect();

        let shape = match self {
            Shape::Ratings => RecordShape {
                group: None,
                item: Locator::parse(".lister-item")?,
                fields: vec![
                    FieldSpec::attr("id", ".ribbonize", "data-tconst")?,
                    FieldSpec::attr("imdbRating", ".ratings-imdb-rating", "data-value")?.number(),
                ],
                buckets,
            },
            Shape::Showtimes => RecordShape {
                group: Some(Locator::parse(".list.detail.sub-list")?),
                item: Locator::parse(".list_item")?,
                fields: vec![
                    FieldSpec::path_segment("id", "h4 a", "href", 1)?,
                    FieldSpec::text("title", "h4 a")?.then(Post::Trim).then(Post::TitlePart),
                    FieldSpec::text("year", "h4 a")?.then(Post::Trim).then(Post::YearPart),
                    FieldSpec::text("metascore", ".metascore")?.integer(),
                    FieldSpec::text("rating", ".rating_txt .value")?.number(),
                    FieldSpec::text("plot", ".outline")?
                        .then(Post::StripOnce("\n".to_string()))
                        .then(Post::Trim),
                    FieldSpec::text("director", r#"span[itemprop="director"] a"#)?
                        .then(Post::CollapseWhitespace)
                        .then(Post::Trim),
                    FieldSpec::list("cast", r#"span[itemprop="actors"] a"#)?
                        .then(Post::CollapseWhitespace)
                        .then(Post::Trim),
                ],
                buckets,
            },
        };
        Ok(shape)
    }
}
