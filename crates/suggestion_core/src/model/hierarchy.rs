//! Topic, category and suggestion records.
//!
//! Serialized field names are camelCase (`topicId`, `categoryId`) to keep
//! the JSON shape clients of the store already consume.

use serde::{Deserialize, Serialize};

/// Store-assigned topic identifier.
pub type TopicId = i64;
/// Store-assigned category identifier.
pub type CategoryId = i64;
/// Store-assigned suggestion identifier.
pub type SuggestionId = i64;

/// Root of the hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub id: TopicId,
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Grouping under one topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: Option<String>,
    /// `None` only for orphaned rows; the column is nullable.
    pub topic_id: Option<TopicId>,
}

/// Leaf entry holding suggestion text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub id: SuggestionId,
    pub name: Option<String>,
    pub content: Option<String>,
    pub category_id: Option<CategoryId>,
}

/// Create input for [`Topic`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewTopic {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Create input for [`Category`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewCategory {
    pub name: Option<String>,
    pub topic_id: Option<TopicId>,
}

/// Create input for [`Suggestion`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewSuggestion {
    pub name: Option<String>,
    pub content: Option<String>,
    pub category_id: Option<CategoryId>,
}

impl NewTopic {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            description: Some(description.into()),
        }
    }

    pub(crate) fn into_topic(self, id: TopicId) -> Topic {
        Topic {
            id,
            name: self.name,
            description: self.description,
        }
    }
}

impl NewCategory {
    pub fn new(name: impl Into<String>, topic_id: TopicId) -> Self {
        Self {
            name: Some(name.into()),
            topic_id: Some(topic_id),
        }
    }

    pub(crate) fn into_category(self, id: CategoryId) -> Category {
        Category {
            id,
            name: self.name,
            topic_id: self.topic_id,
        }
    }
}

impl NewSuggestion {
    pub fn new(
        name: impl Into<String>,
        content: impl Into<String>,
        category_id: CategoryId,
    ) -> Self {
        Self {
            name: Some(name.into()),
            content: Some(content.into()),
            category_id: Some(category_id),
        }
    }

    pub(crate) fn into_suggestion(self, id: SuggestionId) -> Suggestion {
        Suggestion {
            id,
            name: self.name,
            content: self.content,
            category_id: self.category_id,
        }
    }
}

/// Category with its suggestions nested in row order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTree {
    #[serde(flatten)]
    pub category: Category,
    /// Empty, never absent, for categories without suggestions.
    pub suggestions: Vec<Suggestion>,
}

impl CategoryTree {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            suggestions: Vec::new(),
        }
    }
}

/// One topic with its full category/suggestion subtree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicTree {
    pub topic: Topic,
    pub categories: Vec<CategoryTree>,
}

/// One row of the category/suggestion left join.
///
/// `suggestion` is `None` when the join found no suggestion for the
/// category (every suggestion column was NULL).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySuggestionRow {
    pub category: Category,
    pub suggestion: Option<Suggestion>,
}
