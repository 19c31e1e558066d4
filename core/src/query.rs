use crate::model::{Category, Recipe};

/// Category value meaning "no category constraint".
pub const ANY_CATEGORY: &str = "all";

/// Constraints for [`crate::RecipeStore::find`]. Absent fields do not narrow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeFilter {
    /// Exact category name; `all` or empty means any.
    pub category: Option<String>,
    /// Literal, case-insensitive substring of title or ingredients.
    pub search: Option<String>,
    /// Stemmed keywords resolved through the text index; all must match.
    pub keywords: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CategoryConstraint {
    Any,
    Only(Category),
    Nothing,
}

impl RecipeFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn keywords(mut self, keywords: impl Into<String>) -> Self {
        self.keywords = Some(keywords.into());
        self
    }

    fn category_constraint(&self) -> CategoryConstraint {
        match self.category.as_deref() {
            None | Some("") | Some(ANY_CATEGORY) => CategoryConstraint::Any,
            // stored categories are always valid, so an unknown one selects nothing
            Some(c) => Category::ALL
                .into_iter()
                .find(|known| known.as_str() == c)
                .map_or(CategoryConstraint::Nothing, CategoryConstraint::Only),
        }
    }

    pub(crate) fn keyword_query(&self) -> Option<&str> {
        self.keywords.as_deref().filter(|k| !k.trim().is_empty())
    }

    fn search_needle(&self) -> Option<String> {
        self.search
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    /// Category and substring constraints; keywords are resolved by the store.
    pub fn matches(&self, recipe: &Recipe) -> bool {
        let category_ok = match self.category_constraint() {
            CategoryConstraint::Any => true,
            CategoryConstraint::Only(c) => recipe.category == c,
            CategoryConstraint::Nothing => false,
        };
        category_ok
            && self.search_needle().map_or(true, |needle| {
                recipe.title.to_lowercase().contains(&needle)
                    || recipe.ingredients.to_lowercase().contains(&needle)
            })
    }

    /// True when the filter can never match, letting the store skip the scan.
    pub(crate) fn is_unsatisfiable(&self) -> bool {
        self.category_constraint() == CategoryConstraint::Nothing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RecipeInput;
    use time::macros::datetime;

    fn recipe(title: &str, category: &str, ingredients: &str) -> Recipe {
        let fields = RecipeInput::titled(title)
            .with_category(category)
            .with_ingredients(ingredients)
            .normalize()
            .unwrap();
        Recipe::create("0000000000000001".into(), fields, datetime!(2024-01-01 0:00 UTC))
    }

    #[test]
    fn empty_filter_matches_everything() {
        assert!(RecipeFilter::all().matches(&recipe("Stew", "main", "beef")));
        assert!(RecipeFilter::all().category("all").matches(&recipe("Stew", "main", "beef")));
        assert!(RecipeFilter::all().search("").matches(&recipe("Stew", "main", "beef")));
    }

    #[test]
    fn search_is_case_insensitive_substring_over_title_or_ingredients() {
        let stew = recipe("Beef Stew", "main", "Carrots, ONIONS");
        assert!(RecipeFilter::all().search("stew").matches(&stew));
        assert!(RecipeFilter::all().search("onion").matches(&stew));
        assert!(RecipeFilter::all().search("ef st").matches(&stew));
        assert!(!RecipeFilter::all().search("pepper").matches(&stew));
    }

    #[test]
    fn search_is_literal_not_a_pattern() {
        let pie = recipe("Pie (apple)", "dessert", "");
        assert!(RecipeFilter::all().search("(apple)").matches(&pie));
        assert!(!RecipeFilter::all().search("p.e").matches(&pie));
    }

    #[test]
    fn unknown_category_matches_nothing() {
        let filter = RecipeFilter::all().category("breakfast");
        assert!(filter.is_unsatisfiable());
        assert!(!filter.matches(&recipe("Toast", "other", "")));
    }

    #[test]
    fn category_filter_is_exact() {
        let soup = recipe("Broth", "soup", "");
        assert!(RecipeFilter::all().category("soup").matches(&soup));
        for near_miss in ["SOUP", "Soup", " soup", "soup "] {
            let filter = RecipeFilter::all().category(near_miss);
            assert!(filter.is_unsatisfiable(), "{near_miss:?}");
            assert!(!filter.matches(&soup), "{near_miss:?}");
        }
        assert!(RecipeFilter::all().category("ALL").is_unsatisfiable());
    }
}
