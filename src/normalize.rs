//! Article normalization.
//!
//! Maps a [`RawArticleRecord`] onto an [`Article`] using a fixed table of
//! `(field, placeholder)` pairs. A field that is absent, blank, or not a
//! string gets its placeholder. The image URL is always left pending here;
//! [`crate::images::ImageResolver`] decides what ends up in it.

use crate::models::{Article, NO_DATE, NO_SUMMARY, NO_TITLE, RawArticleRecord};

/// Text fields copied from the raw record, with their fallback values.
const TEXT_FIELDS: [(&str, &str); 3] = [
    ("title", NO_TITLE),
    ("summary", NO_SUMMARY),
    ("date", NO_DATE),
];

/// An article whose image has not been resolved yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingArticle {
    pub title: String,
    pub summary: String,
    pub date: String,
}

impl PendingArticle {
    /// Attach the resolved image URL, producing the final article.
    pub fn with_image(self, image_url: String) -> Article {
        Article {
            title: self.title,
            summary: self.summary,
            date: self.date,
            image_url,
        }
    }
}

/// Build a pending article from one raw record. Never fails.
pub fn normalize(raw: &RawArticleRecord) -> PendingArticle {
    let [title, summary, date] =
        TEXT_FIELDS.map(|(field, fallback)| raw.text(field).unwrap_or(fallback).to_string());
    PendingArticle {
        title,
        summary,
        date,
    }
}
