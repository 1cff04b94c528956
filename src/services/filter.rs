// src/services/filter.rs

//! Client-side filtering and pagination of blog posts.
//!
//! Everything here is pure and synchronous; views recompute it whenever a
//! filter input changes.

use std::collections::HashSet;

use chrono::{NaiveDate, TimeDelta};
use serde::Serialize;

use crate::models::BlogPost;

/// Category value meaning "no category filter".
pub const ALL_CATEGORIES: &str = "all";

/// Predicates applied to the post list. Unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    /// Case-insensitive substring of title, excerpt or category
    pub search: Option<String>,
    /// Exact category name
    pub category: Option<String>,
    /// Earliest date, inclusive
    pub from: Option<NaiveDate>,
    /// Latest date, inclusive
    pub to: Option<NaiveDate>,
    /// Only posts from the last N days
    pub recent_days: Option<i64>,
}

impl PostFilter {
    /// Whether a post passes every set predicate. `today` anchors the recent window.
    pub fn matches(&self, post: &BlogPost, today: NaiveDate) -> bool {
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            if !post.matches_search(&search.to_lowercase()) {
                return false;
            }
        }

        if let Some(category) = self
            .category
            .as_deref()
            .filter(|c| !c.is_empty() && *c != ALL_CATEGORIES)
        {
            if post.category != category {
                return false;
            }
        }

        if self.from.is_some_and(|from| post.date < from) {
            return false;
        }
        if self.to.is_some_and(|to| post.date > to) {
            return false;
        }

        if let Some(days) = self.recent_days {
            // A window reaching past the calendar range has no lower bound
            let cutoff = TimeDelta::try_days(days).and_then(|d| today.checked_sub_signed(d));
            if cutoff.is_some_and(|c| post.date < c) || post.date > today {
                return false;
            }
        }

        true
    }

    /// Matching posts, newest first.
    pub fn apply<'a>(&self, posts: &'a [BlogPost], today: NaiveDate) -> Vec<&'a BlogPost> {
        let mut matched: Vec<&BlogPost> = posts.iter().filter(|p| self.matches(p, today)).collect();
        matched.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id)));
        matched
    }
}

/// One page of results.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based, clamped into range
    pub page: usize,
    /// Never zero
    pub total_pages: usize,
    pub total_items: usize,
}

/// Slice `items` into a page. Out-of-range pages clamp to the nearest valid page.
pub fn paginate<T: Clone>(items: &[T], page: usize, page_size: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(page_size).max(1);
    let page = page.clamp(1, total_pages);

    let start = (page - 1) * page_size;
    let end = (start + page_size).min(total_items);

    Page {
        items: items[start..end].to_vec(),
        page,
        total_pages,
        total_items,
    }
}

/// Distinct categories in first-seen order.
pub fn categories(posts: &[BlogPost]) -> Vec<String> {
    let mut seen = HashSet::new();
    posts
        .iter()
        .filter(|p| !p.category.is_empty())
        .filter(|p| seen.insert(p.category.as_str()))
        .map(|p| p.category.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::post;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap()
    }

    fn sample() -> Vec<BlogPost> {
        vec![
            post(1, "design-systems", "Design", (2024, 1, 10)),
            post(2, "rust-async", "Engineering", (2024, 6, 20)),
            post(3, "hiring", "Company", (2024, 5, 5)),
            post(4, "design-tokens", "Design", (2024, 6, 1)),
            post(5, "designers-guide", "Design Ops", (2024, 6, 25)),
        ]
    }

    #[test]
    fn category_filter_is_exact() {
        let posts = sample();
        let filter = PostFilter {
            category: Some("Design".into()),
            ..Default::default()
        };

        let matched = filter.apply(&posts, today());
        assert!(matched.iter().all(|p| p.category == "Design"));
        let ids: Vec<_> = matched.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![4, 1]);
    }

    #[test]
    fn all_category_disables_filter() {
        let posts = sample();
        let filter = PostFilter {
            category: Some(ALL_CATEGORIES.into()),
            ..Default::default()
        };
        assert_eq!(filter.apply(&posts, today()).len(), posts.len());
    }

    #[test]
    fn search_covers_excerpt_and_category() {
        let posts = sample();
        let by_excerpt = PostFilter {
            search: Some("RUST-ASYNC".into()),
            ..Default::default()
        };
        assert_eq!(by_excerpt.apply(&posts, today())[0].id, 2);

        let by_category = PostFilter {
            search: Some("ops".into()),
            ..Default::default()
        };
        assert_eq!(by_category.apply(&posts, today()).len(), 1);

        let blank = PostFilter {
            search: Some("   ".into()),
            ..Default::default()
        };
        assert_eq!(blank.apply(&posts, today()).len(), posts.len());
    }

    #[test]
    fn date_range_is_inclusive() {
        let posts = sample();
        let filter = PostFilter {
            from: NaiveDate::from_ymd_opt(2024, 5, 5),
            to: NaiveDate::from_ymd_opt(2024, 6, 20),
            ..Default::default()
        };
        let ids: Vec<_> = filter.apply(&posts, today()).iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![2, 4, 3]);
    }

    #[test]
    fn recent_window_counts_back_from_today() {
        let posts = sample();
        let filter = PostFilter {
            recent_days: Some(30),
            ..Default::default()
        };
        let ids: Vec<_> = filter.apply(&posts, today()).iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![5, 2, 4]);
    }

    #[test]
    fn huge_recent_window_keeps_everything_up_to_today() {
        let mut posts = sample();
        posts.push(post(6, "tomorrow", "News", (2024, 7, 1)));
        let filter = PostFilter {
            recent_days: Some(10_000_000_000),
            ..Default::default()
        };
        let ids: Vec<_> = filter.apply(&posts, today()).iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![5, 2, 4, 3, 1]);
    }

    #[test]
    fn paginate_clamps_pages() {
        let items: Vec<i32> = (1..=7).collect();

        let first = paginate(&items, 1, 3);
        assert_eq!(first.items, vec![1, 2, 3]);
        assert_eq!(first.total_pages, 3);

        let last = paginate(&items, 99, 3);
        assert_eq!(last.page, 3);
        assert_eq!(last.items, vec![7]);

        let zero = paginate(&items, 0, 3);
        assert_eq!(zero.page, 1);
    }

    #[test]
    fn paginate_empty_has_one_page() {
        let page = paginate::<i32>(&[], 2, 6);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.page, 1);
        assert!(page.items.is_empty());
    }

    #[test]
    fn categories_are_distinct_in_order() {
        assert_eq!(
            categories(&sample()),
            vec!["Design", "Engineering", "Company", "Design Ops"]
        );
    }
}
