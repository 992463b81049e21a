//! Read-only catalog types.
//!
//! The catalog itself is owned by the remote Catalog API; these types
//! cover what the cart and product views consume: product summaries,
//! categories, and the paginated query surface.

use crate::ids::{CategoryId, ProductId};
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// A product as served by the catalog.
///
/// This is the one canonical product shape; cart items embed it
/// directly so guest and account carts never diverge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    /// Unique product identifier.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Unit price.
    pub price: Money,
    /// Primary image URL.
    pub image_url: Option<String>,
    /// Brand name.
    pub brand: Option<String>,
    /// Long description.
    pub description: Option<String>,
    /// Category slug.
    pub category: Option<String>,
    /// Average rating, 0.0-5.0.
    pub rating: Option<f64>,
}

/// A product category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    /// Unique category identifier.
    pub id: CategoryId,
    /// Display name.
    pub name: String,
}

/// Sort options for product listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortOption {
    /// Manual/featured order (default; omitted from the query string).
    #[default]
    Featured,
    /// Price, low to high.
    PriceAsc,
    /// Price, high to low.
    PriceDesc,
    /// Highest rated first.
    Rating,
    /// Newest first.
    Newest,
}

impl SortOption {
    /// Get the query-parameter value.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOption::Featured => "featured",
            SortOption::PriceAsc => "price_asc",
            SortOption::PriceDesc => "price_desc",
            SortOption::Rating => "rating",
            SortOption::Newest => "newest",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SortOption::Featured => "Featured",
            SortOption::PriceAsc => "Price: Low to High",
            SortOption::PriceDesc => "Price: High to Low",
            SortOption::Rating => "Highest Rated",
            SortOption::Newest => "Newest",
        }
    }
}

/// A product listing query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductQuery {
    /// Category filter.
    pub category: Option<String>,
    /// Minimum price.
    pub min_price: Option<Money>,
    /// Maximum price.
    pub max_price: Option<Money>,
    /// Minimum rating filter (only sent when above zero).
    pub rating: f64,
    /// Free-text search.
    pub search: Option<String>,
    /// Sort option.
    pub sort: SortOption,
    /// Current page (1-indexed).
    pub page: i64,
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl ProductQuery {
    /// Create a query for the first page, featured order.
    pub fn new() -> Self {
        Self {
            category: None,
            min_price: None,
            max_price: None,
            rating: 0.0,
            search: None,
            sort: SortOption::Featured,
            page: 1,
        }
    }

    /// Set the category filter.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Set the price range filter.
    pub fn with_price_range(mut self, min: Money, max: Money) -> Self {
        self.min_price = Some(min);
        self.max_price = Some(max);
        self
    }

    /// Set the minimum rating filter.
    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = rating;
        self
    }

    /// Set the free-text search term.
    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Set the sort option.
    pub fn with_sort(mut self, sort: SortOption) -> Self {
        self.sort = sort;
        self
    }

    /// Set the page, clamped to 1.
    pub fn with_page(mut self, page: i64) -> Self {
        self.page = page.max(1);
        self
    }

    /// Render as query-string pairs.
    ///
    /// Matches the collaborator contract: `rating` only when positive,
    /// `sort` only when not featured.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(category) = &self.category {
            params.push(("category", category.clone()));
        }
        if let Some(min) = &self.min_price {
            params.push(("min", format!("{:.2}", min.to_decimal())));
        }
        if let Some(max) = &self.max_price {
            params.push(("max", format!("{:.2}", max.to_decimal())));
        }
        if self.rating > 0.0 {
            params.push(("rating", self.rating.to_string()));
        }
        if let Some(search) = &self.search {
            params.push(("search", search.clone()));
        }
        if self.sort != SortOption::Featured {
            params.push(("sort", self.sort.as_str().to_string()));
        }
        params.push(("page", self.page.to_string()));
        params
    }
}

/// One page of product results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductPage {
    /// Products on this page.
    pub products: Vec<Product>,
    /// Total matching products.
    pub total: i64,
    /// Current page (1-indexed).
    pub page: i64,
    /// Total number of pages.
    pub total_pages: i64,
}
