//! Blog post data structure.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

/// A blog post as served by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlogPost {
    pub id: i64,

    pub title: String,

    #[serde(default)]
    pub excerpt: String,

    /// Cover image URL
    #[serde(default)]
    pub image: String,

    /// Publication date
    #[serde(deserialize_with = "deserialize_date")]
    pub date: NaiveDate,

    #[serde(default)]
    pub category: String,

    pub slug: String,

    /// Body sections in display order
    #[serde(default)]
    pub content: Vec<ContentSection>,

    #[serde(default, alias = "likesCount")]
    pub likes_count: u64,

    #[serde(default, alias = "commentsCount")]
    pub comments_count: u64,
}

/// One titled section of a post body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContentSection {
    #[serde(default)]
    pub subtitle: String,

    #[serde(default)]
    pub paragraphs: Vec<String>,
}

impl BlogPost {
    /// Whether the search term appears in the title, excerpt or category.
    pub fn matches_search(&self, needle_lower: &str) -> bool {
        [&self.title, &self.excerpt, &self.category]
            .iter()
            .any(|field| field.to_lowercase().contains(needle_lower))
    }
}

/// Accepts either a plain date or a full RFC 3339 timestamp.
fn deserialize_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_date(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid date: {raw}")))
}

pub(crate) fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_camel_case_counters() {
        let post: BlogPost = serde_json::from_str(
            r#"{
                "id": 7,
                "title": "Shipping faster",
                "excerpt": "How we cut build times",
                "image": "/img/7.png",
                "date": "2024-03-15",
                "category": "Engineering",
                "slug": "shipping-faster",
                "content": [{"subtitle": "Intro", "paragraphs": ["a", "b"]}],
                "likesCount": 12,
                "commentsCount": 3
            }"#,
        )
        .unwrap();

        assert_eq!(post.likes_count, 12);
        assert_eq!(post.comments_count, 3);
        assert_eq!(post.date, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert_eq!(post.content[0].paragraphs.len(), 2);
    }

    #[test]
    fn accepts_timestamp_dates() {
        assert_eq!(
            parse_date("2024-03-15T10:30:00Z"),
            NaiveDate::from_ymd_opt(2024, 3, 15)
        );
        assert_eq!(parse_date("15/03/2024"), None);
    }

    #[test]
    fn search_is_case_insensitive() {
        let post: BlogPost = serde_json::from_value(serde_json::json!({
            "id": 1, "title": "Rust Tips", "date": "2024-01-01",
            "slug": "rust-tips", "category": "Guides"
        }))
        .unwrap();

        assert!(post.matches_search("rust"));
        assert!(post.matches_search("guides"));
        assert!(!post.matches_search("python"));
    }
}
