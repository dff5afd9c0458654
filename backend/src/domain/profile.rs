//! Read-only aggregates for profile and dashboard pages.

use serde::Serialize;

use super::user::User;

/// Number of favourite categories reported on a profile.
pub const FAVORITE_CATEGORY_LIMIT: usize = 5;

/// A category and how many of a user's collected books carry it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    /// Category name.
    pub name: String,
    /// Distinct books in the user's collections with this category.
    pub book_count: i64,
}

/// Reading statistics for one user.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ProfileStats {
    /// Collections owned.
    pub collection_count: i64,
    /// Sum of book counts across owned collections.
    pub total_books_in_collections: i64,
    /// Distinct categories across collected books.
    pub unique_categories: i64,
    /// Most frequent categories, highest count first.
    pub favorite_categories: Vec<CategoryCount>,
}

/// Profile page payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    /// Account data.
    #[serde(flatten)]
    pub user: User,
    /// Reading statistics.
    #[serde(flatten)]
    pub stats: ProfileStats,
}

/// Catalogue-wide counts for the admin dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DashboardCounts {
    /// Books in the catalogue.
    pub books: i64,
    /// Authors in the catalogue.
    pub authors: i64,
    /// Category terms.
    pub categories: i64,
    /// Language terms.
    pub languages: i64,
    /// Registered accounts.
    pub users: i64,
    /// Collections across all users.
    pub collections: i64,
    /// Books lacking a cover id.
    pub books_without_covers: i64,
}
