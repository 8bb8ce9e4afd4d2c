use serde::{Deserialize, Serialize};

use jsfashion_core::VariantId;

use crate::cart::Cart;

/// One entry of the order-creation request body (`items[]` of `POST /api/v1/orders`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutLine {
    pub variant_id: VariantId,
    pub quantity: u32,
}

impl Cart {
    /// Lines to submit at checkout, in cart order.
    pub fn checkout_lines(&self) -> Vec<CheckoutLine> {
        self.items()
            .iter()
            .map(|item| CheckoutLine {
                variant_id: item.variant_id.clone(),
                quantity: item.quantity,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::CartItem;
    use jsfashion_core::ProductId;

    fn line(variant: &str, quantity: u32) -> CartItem {
        CartItem {
            product_id: ProductId::new(1),
            product_slug: "tee".to_string(),
            product_title: "Tee".to_string(),
            variant_id: VariantId::new(variant).unwrap(),
            variant_name: "S".to_string(),
            price: 5.0,
            currency: "ETB".to_string(),
            quantity,
            max_stock: 10,
            thumbnail: None,
        }
    }

    #[test]
    fn checkout_lines_follow_cart_order_and_snake_case() {
        let cart = Cart::from_items(vec![line("b", 2), line("a", 1)]).unwrap();
        let lines = cart.checkout_lines();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].variant_id.as_str(), "b");
        assert_eq!(lines[1].quantity, 1);

        let json = serde_json::to_string(&lines[0]).unwrap();
        assert_eq!(json, r#"{"variant_id":"b","quantity":2}"#);
    }

    #[test]
    fn empty_cart_has_no_checkout_lines() {
        assert!(Cart::new().checkout_lines().is_empty());
    }
}
