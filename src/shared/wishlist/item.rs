//! Wish Item Data Structure
//!
//! Items belong to exactly one wishlist. Reservation is an exclusive claim by
//! one user: `is_reserved` and `reserved_by` are always set or cleared together.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::{require_non_empty, SharedError};

/// Represents an item on a wishlist
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WishItem {
    pub id: Uuid,
    /// Owning wishlist
    pub wishlist_id: Uuid,
    /// User who added the item; may never reserve it
    pub creator_id: Uuid,
    pub name: String,
    /// Price in minor units (cents)
    pub price_cents: Option<i64>,
    /// ISO 4217 currency code
    pub currency: Option<String>,
    pub image_url: Option<String>,
    pub is_favorite: bool,
    pub is_reserved: bool,
    pub reserved_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WishItem {
    /// Create a new, unreserved item
    pub fn new(wishlist_id: Uuid, creator_id: Uuid, request: CreateItemRequest) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            wishlist_id,
            creator_id,
            name: request.name.trim().to_string(),
            price_cents: request.price_cents,
            currency: request.currency.map(|c| c.to_uppercase()),
            image_url: request.image_url,
            is_favorite: request.is_favorite.unwrap_or(false),
            is_reserved: false,
            reserved_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether `user_id` currently holds the reservation
    pub fn is_reserved_by(&self, user_id: Uuid) -> bool {
        self.is_reserved && self.reserved_by == Some(user_id)
    }
}

fn validate_currency(currency: &Option<String>) -> Result<(), SharedError> {
    if let Some(code) = currency {
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(SharedError::validation(
                "currency",
                "Currency must be a 3-letter ISO code",
            ));
        }
    }
    Ok(())
}

fn validate_price(price_cents: Option<i64>) -> Result<(), SharedError> {
    match price_cents {
        Some(p) if p < 0 => Err(SharedError::validation("price_cents", "Price cannot be negative")),
        _ => Ok(()),
    }
}

/// Request to add an item to a wishlist
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateItemRequest {
    pub name: String,
    #[serde(default)]
    pub price_cents: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub is_favorite: Option<bool>,
}

impl CreateItemRequest {
    pub fn validate(&self) -> Result<(), SharedError> {
        require_non_empty("name", &self.name)?;
        validate_price(self.price_cents)?;
        validate_currency(&self.currency)
    }
}

/// Partial update of an item; reservation state is not editable here
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateItemRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price_cents: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub is_favorite: Option<bool>,
}

impl UpdateItemRequest {
    pub fn validate(&self) -> Result<(), SharedError> {
        if let Some(name) = &self.name {
            require_non_empty("name", name)?;
        }
        validate_price(self.price_cents)?;
        validate_currency(&self.currency)
    }

    pub fn apply_to(&self, item: &mut WishItem) {
        if let Some(name) = &self.name {
            item.name = name.trim().to_string();
        }
        if let Some(price) = self.price_cents {
            item.price_cents = Some(price);
        }
        if let Some(currency) = &self.currency {
            item.currency = Some(currency.to_uppercase());
        }
        if let Some(url) = &self.image_url {
            item.image_url = Some(url.clone());
        }
        if let Some(is_favorite) = self.is_favorite {
            item.is_favorite = is_favorite;
        }
        item.updated_at = Utc::now();
    }
}

/// Request to reserve (`true`) or release (`false`) an item
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ReservationRequest {
    pub reserve: bool,
}

/// Response for listing items
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListItemsResponse {
    pub items: Vec<WishItem>,
}
