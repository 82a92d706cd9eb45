//! Flat join rows to nested category trees.
//!
//! # Invariants
//! - Each category appears once, at the position of its first row.
//! - Suggestions keep row order within their category.
//! - A row contributes a suggestion only when the suggestion content is
//!   present; all-NULL left-join rows contribute nothing.
//! - A category without suggestions is kept with an empty list.

use crate::model::hierarchy::{CategoryId, CategorySuggestionRow, CategoryTree};
use std::collections::HashMap;

/// Groups join rows by category in one pass.
pub fn group_category_rows<I>(rows: I) -> Vec<CategoryTree>
where
    I: IntoIterator<Item = CategorySuggestionRow>,
{
    let mut positions: HashMap<CategoryId, usize> = HashMap::new();
    let mut grouped: Vec<CategoryTree> = Vec::new();

    for CategorySuggestionRow {
        category,
        suggestion,
    } in rows
    {
        let index = match positions.get(&category.id) {
            Some(&index) => index,
            None => {
                positions.insert(category.id, grouped.len());
                grouped.push(CategoryTree::new(category));
                grouped.len() - 1
            }
        };

        if let Some(suggestion) = suggestion {
            if suggestion.content.is_some() {
                grouped[index].suggestions.push(suggestion);
            }
        }
    }

    grouped
}
