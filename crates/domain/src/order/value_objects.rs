//! Value objects for the order domain.
//!
//! Every value object here is immutable and can only be obtained through a
//! validating factory, so a held value is always valid.

use common::AggregateId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Identity of the customer aggregate an order belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CustomerId(Uuid);

impl CustomerId {
    /// Creates a new random customer ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parses a customer ID from its textual UUID form.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        AggregateId::parse(value)
            .map(|id| Self(id.as_uuid()))
            .map_err(|source| ValidationError::InvalidIdentifier {
                field: "customer id",
                source,
            })
    }

    /// Creates a customer ID from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for CustomerId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CustomerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for CustomerId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Article number of an ordered product, 1 to 8 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArticleNo(String);

impl ArticleNo {
    /// Maximum length in characters.
    pub const MAX_LEN: usize = 8;

    /// Validates and wraps an article number.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let len = value.chars().count();
        if len == 0 || len > Self::MAX_LEN {
            return Err(ValidationError::InvalidArticleNo {
                article_no: value,
                max: Self::MAX_LEN,
            });
        }
        Ok(Self(value))
    }

    /// Returns the article number as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ArticleNo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ArticleNo {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Ordered quantity of a single article, between 1 and 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quantity(u32);

impl Quantity {
    /// Smallest accepted quantity.
    pub const MIN: u32 = 1;

    /// Largest accepted quantity.
    pub const MAX: u32 = 100;

    /// Validates and wraps a quantity.
    pub fn new(value: i64) -> Result<Self, ValidationError> {
        if value < i64::from(Self::MIN) || value > i64::from(Self::MAX) {
            return Err(ValidationError::InvalidQuantity {
                quantity: value,
                min: Self::MIN,
                max: Self::MAX,
            });
        }
        Ok(Self(value as u32))
    }

    /// Returns the quantity as an integer.
    pub fn get(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A line of an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItem {
    article_no: ArticleNo,
    quantity: Quantity,
}

impl OrderItem {
    /// Creates an order item from raw input, validating both fields.
    pub fn new(article_no: &str, quantity: i64) -> Result<Self, ValidationError> {
        Ok(Self {
            article_no: ArticleNo::new(article_no)?,
            quantity: Quantity::new(quantity)?,
        })
    }

    /// Creates an order item from already validated parts.
    pub fn from_parts(article_no: ArticleNo, quantity: Quantity) -> Self {
        Self {
            article_no,
            quantity,
        }
    }

    /// Returns the article number.
    pub fn article_no(&self) -> &ArticleNo {
        &self.article_no
    }

    /// Returns the ordered quantity.
    pub fn quantity(&self) -> Quantity {
        self.quantity
    }
}
