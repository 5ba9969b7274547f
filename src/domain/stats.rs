use noticeboard_api_types::{Category, Post};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub category: Category,
    pub count: u64,
}

/// Post count view shown by the admin tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostStats {
    pub total: u64,
    /// Categories in first-seen order; absent categories are omitted.
    pub categories: Vec<CategoryCount>,
}

impl PostStats {
    pub fn from_posts(posts: &[Post]) -> Self {
        let mut categories: Vec<CategoryCount> = Vec::new();
        for post in posts {
            match categories
                .iter_mut()
                .find(|entry| entry.category == post.category)
            {
                Some(entry) => entry.count += 1,
                None => categories.push(CategoryCount {
                    category: post.category,
                    count: 1,
                }),
            }
        }

        Self {
            total: posts.len() as u64,
            categories,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Share of `total` for one entry, in percent.
    pub fn percentage(&self, entry: &CategoryCount) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        entry.count as f64 * 100.0 / self.total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn post(id: &str, category: Category) -> Post {
        Post {
            id: id.to_string(),
            user_id: "u".to_string(),
            title: "t".to_string(),
            body: "b".to_string(),
            category,
            tags: Vec::new(),
            created_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn counts_categories_in_first_seen_order() {
        let posts = vec![
            post("1", Category::Qna),
            post("2", Category::Free),
            post("3", Category::Qna),
        ];
        let stats = PostStats::from_posts(&posts);

        assert_eq!(stats.total, 3);
        assert_eq!(
            stats.categories,
            vec![
                CategoryCount {
                    category: Category::Qna,
                    count: 2
                },
                CategoryCount {
                    category: Category::Free,
                    count: 1
                },
            ]
        );
        let share = stats.percentage(&stats.categories[1]);
        assert!((share - 33.333).abs() < 0.01);
    }

    #[test]
    fn empty_stats_have_zero_share() {
        let stats = PostStats::from_posts(&[]);
        assert!(stats.is_empty());
        let entry = CategoryCount {
            category: Category::Free,
            count: 0,
        };
        assert_eq!(stats.percentage(&entry), 0.0);
    }
}
