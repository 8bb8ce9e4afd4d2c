use serde::{Deserialize, Serialize};

use jsfashion_core::{DomainError, DomainResult, Entity, ProductId, VariantId};

/// One line item in the cart, keyed by variant.
///
/// Display fields, price, currency and `max_stock` are a snapshot taken when
/// the variant was first added; they are never refreshed from the catalog.
/// Field names follow the storefront's persisted camelCase shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: ProductId,
    pub product_slug: String,
    pub product_title: String,
    pub variant_id: VariantId,
    pub variant_name: String,
    /// Unit price in the unit given by `currency`.
    pub price: f64,
    pub currency: String,
    /// Always `1..=max_stock` while the item is in a cart.
    pub quantity: u32,
    pub max_stock: u32,
    #[serde(default)]
    pub thumbnail: Option<String>,
}

impl CartItem {
    /// `price * quantity` for this line.
    pub fn line_total(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }

    /// Whether one more unit fits under the stock ceiling.
    pub fn can_increment(&self) -> bool {
        self.quantity < self.max_stock
    }
}

impl Entity for CartItem {
    type Id = VariantId;

    fn id(&self) -> &Self::Id {
        &self.variant_id
    }
}

/// Catalog data for a variant being added to the cart (everything but quantity).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCartItem {
    pub product_id: ProductId,
    pub product_slug: String,
    pub product_title: String,
    pub variant_id: VariantId,
    pub variant_name: String,
    pub price: f64,
    pub currency: String,
    pub max_stock: u32,
    #[serde(default)]
    pub thumbnail: Option<String>,
}

impl NewCartItem {
    /// Check the catalog data before it becomes a cart line.
    ///
    /// A non-finite price cannot be written to the persisted blob (JSON has
    /// no NaN or infinity), so it is refused here.
    pub fn validate(&self) -> DomainResult<()> {
        if !self.price.is_finite() {
            return Err(DomainError::validation(format!(
                "variant {} has a non-finite price",
                self.variant_id
            )));
        }
        Ok(())
    }

    /// Materialize a cart line with the given quantity.
    pub fn with_quantity(self, quantity: u32) -> CartItem {
        CartItem {
            product_id: self.product_id,
            product_slug: self.product_slug,
            product_title: self.product_title,
            variant_id: self.variant_id,
            variant_name: self.variant_name,
            price: self.price,
            currency: self.currency,
            quantity,
            max_stock: self.max_stock,
            thumbnail: self.thumbnail,
        }
    }
}
