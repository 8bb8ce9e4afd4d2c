use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use jsfashion_core::{Aggregate, AggregateRoot, DomainError, DomainResult, Entity, VariantId};
use jsfashion_events::Event;

use crate::item::{CartItem, NewCartItem};

/// Aggregate root: the shopping cart.
///
/// Invariants held after every applied event:
/// - no two items share a `variant_id`
/// - every item has `1 <= quantity <= max_stock`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Cart {
    items: Vec<CartItem>,
    version: u64,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a cart from already-validated items, rejecting any invariant violation.
    pub fn from_items(items: Vec<CartItem>) -> DomainResult<Self> {
        for (idx, item) in items.iter().enumerate() {
            if item.variant_id.is_blank() {
                return Err(DomainError::invalid_id("VariantId: cannot be empty"));
            }
            if items[..idx].iter().any(|i| i.is_same_as(item)) {
                return Err(DomainError::invariant(format!(
                    "duplicate variant {} in cart",
                    item.variant_id
                )));
            }
            if item.quantity == 0 {
                return Err(DomainError::invariant(format!(
                    "variant {} has zero quantity",
                    item.variant_id
                )));
            }
            if item.quantity > item.max_stock {
                return Err(DomainError::invariant(format!(
                    "variant {} quantity {} exceeds stock {}",
                    item.variant_id, item.quantity, item.max_stock
                )));
            }
        }
        Ok(Self { items, version: 0 })
    }

    /// Build a cart from untrusted items (e.g. a stored blob), repairing
    /// whatever would break the cart's invariants instead of failing.
    pub fn hydrate(items: Vec<CartItem>) -> Hydrated {
        let mut kept: Vec<CartItem> = Vec::with_capacity(items.len());
        let mut repairs = Vec::new();

        for mut item in items {
            if item.variant_id.is_blank() {
                repairs.push(HydrationRepair::BlankVariantDropped);
                continue;
            }
            if kept.iter().any(|i| i.is_same_as(&item)) {
                repairs.push(HydrationRepair::DuplicateDropped {
                    variant_id: item.variant_id,
                });
                continue;
            }
            if item.quantity == 0 {
                repairs.push(HydrationRepair::ZeroQuantityDropped {
                    variant_id: item.variant_id,
                });
                continue;
            }
            if item.quantity > item.max_stock {
                if item.max_stock == 0 {
                    repairs.push(HydrationRepair::OutOfStockDropped {
                        variant_id: item.variant_id,
                    });
                    continue;
                }
                repairs.push(HydrationRepair::Clamped {
                    variant_id: item.variant_id.clone(),
                    from: item.quantity,
                    to: item.max_stock,
                });
                item.quantity = item.max_stock;
            }
            kept.push(item);
        }

        Hydrated {
            cart: Self {
                items: kept,
                version: 0,
            },
            repairs,
        }
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn item(&self, variant_id: &VariantId) -> Option<&CartItem> {
        self.items.iter().find(|i| &i.variant_id == variant_id)
    }

    pub fn contains(&self, variant_id: &VariantId) -> bool {
        self.item(variant_id).is_some()
    }

    /// Quantity of a variant currently in the cart (0 when absent).
    pub fn quantity_of(&self, variant_id: &VariantId) -> u32 {
        self.item(variant_id).map_or(0, |i| i.quantity)
    }

    /// Whether one more unit of `variant_id` fits under its stock ceiling.
    pub fn can_increment(&self, variant_id: &VariantId) -> bool {
        self.item(variant_id).is_some_and(CartItem::can_increment)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct line items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Sum of quantities across all lines.
    pub fn total_items(&self) -> u64 {
        self.items.iter().map(|i| u64::from(i.quantity)).sum()
    }

    /// Sum of `price * quantity` across all lines. No currency conversion.
    pub fn total_price(&self) -> f64 {
        self.items.iter().map(CartItem::line_total).sum()
    }
}

impl AggregateRoot for Cart {
    fn version(&self) -> u64 {
        self.version
    }
}

/// Result of [`Cart::hydrate`].
#[derive(Debug, Clone, PartialEq)]
pub struct Hydrated {
    pub cart: Cart,
    pub repairs: Vec<HydrationRepair>,
}

/// A correction made while hydrating a cart from untrusted items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HydrationRepair {
    BlankVariantDropped,
    DuplicateDropped { variant_id: VariantId },
    ZeroQuantityDropped { variant_id: VariantId },
    OutOfStockDropped { variant_id: VariantId },
    Clamped { variant_id: VariantId, from: u32, to: u32 },
    /// A stored entry that could not be read as a cart item at all.
    UndecodableDropped { index: usize, reason: String },
}

/// Rejection: the requested quantity is above the item's stock ceiling.
///
/// The display form is the user-facing notice.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("Only {max_stock} items available in stock")]
pub struct StockLimitExceeded {
    pub variant_id: VariantId,
    pub max_stock: u32,
    /// Quantity the line would have ended up with.
    pub requested: u64,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CartError {
    #[error(transparent)]
    StockLimitExceeded(#[from] StockLimitExceeded),

    /// The incoming item data is unusable (e.g. a non-finite price).
    #[error(transparent)]
    InvalidItem(#[from] DomainError),
}

/// Command: AddItem.
///
/// `quantity` of `None` or `Some(0)` adds a single unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddItem {
    pub item: NewCartItem,
    pub quantity: Option<u32>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RemoveItem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveItem {
    pub variant_id: VariantId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: UpdateQuantity. A quantity `<= 0` removes the line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateQuantity {
    pub variant_id: VariantId,
    pub quantity: i64,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ClearCart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearCart {
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CartCommand {
    AddItem(AddItem),
    RemoveItem(RemoveItem),
    UpdateQuantity(UpdateQuantity),
    ClearCart(ClearCart),
}

/// Event: ItemAdded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemAdded {
    pub item: CartItem,
    pub occurred_at: DateTime<Utc>,
}

/// Event: QuantityChanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantityChanged {
    pub variant_id: VariantId,
    pub from: u32,
    pub to: u32,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ItemRemoved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRemoved {
    pub variant_id: VariantId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: CartCleared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartCleared {
    /// Number of lines dropped.
    pub removed: usize,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CartEvent {
    ItemAdded(ItemAdded),
    QuantityChanged(QuantityChanged),
    ItemRemoved(ItemRemoved),
    CartCleared(CartCleared),
}

impl Event for CartEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CartEvent::ItemAdded(_) => "cart.item.added",
            CartEvent::QuantityChanged(_) => "cart.item.quantity_changed",
            CartEvent::ItemRemoved(_) => "cart.item.removed",
            CartEvent::CartCleared(_) => "cart.cleared",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            CartEvent::ItemAdded(e) => e.occurred_at,
            CartEvent::QuantityChanged(e) => e.occurred_at,
            CartEvent::ItemRemoved(e) => e.occurred_at,
            CartEvent::CartCleared(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Cart {
    type Command = CartCommand;
    type Event = CartEvent;
    type Error = CartError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            CartEvent::ItemAdded(e) => {
                self.items.push(e.item.clone());
            }
            CartEvent::QuantityChanged(e) => {
                if let Some(item) = self.items.iter_mut().find(|i| i.variant_id == e.variant_id) {
                    item.quantity = e.to;
                }
            }
            CartEvent::ItemRemoved(e) => {
                self.items.retain(|i| i.variant_id != e.variant_id);
            }
            CartEvent::CartCleared(_) => {
                self.items.clear();
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            CartCommand::AddItem(cmd) => self.handle_add(cmd),
            CartCommand::RemoveItem(cmd) => Ok(self.handle_remove(&cmd.variant_id, cmd.occurred_at)),
            CartCommand::UpdateQuantity(cmd) => self.handle_update(cmd),
            CartCommand::ClearCart(cmd) => Ok(self.handle_clear(cmd)),
        }
    }
}

impl Cart {
    fn handle_add(&self, cmd: &AddItem) -> Result<Vec<CartEvent>, CartError> {
        cmd.item.validate()?;
        let quantity = cmd.quantity.filter(|q| *q > 0).unwrap_or(1);

        // An existing line keeps its own stock snapshot; the incoming one is ignored.
        if let Some(existing) = self.item(&cmd.item.variant_id) {
            let requested = u64::from(existing.quantity) + u64::from(quantity);
            if requested > u64::from(existing.max_stock) {
                return Err(StockLimitExceeded {
                    variant_id: existing.variant_id.clone(),
                    max_stock: existing.max_stock,
                    requested,
                }
                .into());
            }
            return Ok(vec![CartEvent::QuantityChanged(QuantityChanged {
                variant_id: existing.variant_id.clone(),
                from: existing.quantity,
                // Bounded by max_stock (a u32) above.
                to: requested as u32,
                occurred_at: cmd.occurred_at,
            })]);
        }

        if quantity > cmd.item.max_stock {
            return Err(StockLimitExceeded {
                variant_id: cmd.item.variant_id.clone(),
                max_stock: cmd.item.max_stock,
                requested: u64::from(quantity),
            }
            .into());
        }

        Ok(vec![CartEvent::ItemAdded(ItemAdded {
            item: cmd.item.clone().with_quantity(quantity),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_remove(&self, variant_id: &VariantId, occurred_at: DateTime<Utc>) -> Vec<CartEvent> {
        if !self.contains(variant_id) {
            return vec![];
        }
        vec![CartEvent::ItemRemoved(ItemRemoved {
            variant_id: variant_id.clone(),
            occurred_at,
        })]
    }

    fn handle_update(&self, cmd: &UpdateQuantity) -> Result<Vec<CartEvent>, CartError> {
        if cmd.quantity <= 0 {
            return Ok(self.handle_remove(&cmd.variant_id, cmd.occurred_at));
        }

        let Some(existing) = self.item(&cmd.variant_id) else {
            return Ok(vec![]);
        };

        if cmd.quantity > i64::from(existing.max_stock) {
            return Err(StockLimitExceeded {
                variant_id: existing.variant_id.clone(),
                max_stock: existing.max_stock,
                requested: cmd.quantity as u64,
            }
            .into());
        }

        // 1..=max_stock, so it fits in u32.
        let to = cmd.quantity as u32;
        if to == existing.quantity {
            return Ok(vec![]);
        }

        Ok(vec![CartEvent::QuantityChanged(QuantityChanged {
            variant_id: existing.variant_id.clone(),
            from: existing.quantity,
            to,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_clear(&self, cmd: &ClearCart) -> Vec<CartEvent> {
        if self.items.is_empty() {
            return vec![];
        }
        vec![CartEvent::CartCleared(CartCleared {
            removed: self.items.len(),
            occurred_at: cmd.occurred_at,
        })]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsfashion_core::ProductId;
    use proptest::prelude::*;

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn variant(id: &str) -> VariantId {
        VariantId::new(id).unwrap()
    }

    fn new_item(id: &str, price: f64, max_stock: u32) -> NewCartItem {
        NewCartItem {
            product_id: ProductId::new(1),
            product_slug: "wrap-dress".to_string(),
            product_title: "Wrap Dress".to_string(),
            variant_id: variant(id),
            variant_name: "M".to_string(),
            price,
            currency: "ETB".to_string(),
            max_stock,
            thumbnail: Some("/img/wrap-dress.jpg".to_string()),
        }
    }

    fn add(item: NewCartItem, quantity: Option<u32>) -> CartCommand {
        CartCommand::AddItem(AddItem {
            item,
            quantity,
            occurred_at: test_time(),
        })
    }

    fn update(id: &str, quantity: i64) -> CartCommand {
        CartCommand::UpdateQuantity(UpdateQuantity {
            variant_id: variant(id),
            quantity,
            occurred_at: test_time(),
        })
    }

    fn remove(id: &str) -> CartCommand {
        CartCommand::RemoveItem(RemoveItem {
            variant_id: variant(id),
            occurred_at: test_time(),
        })
    }

    fn clear() -> CartCommand {
        CartCommand::ClearCart(ClearCart {
            occurred_at: test_time(),
        })
    }

    #[test]
    fn add_to_existing_line_increments_quantity() {
        let mut cart = Cart::new();
        cart.execute(&add(new_item("v1", 10.0, 5), Some(1))).unwrap();
        let events = cart.execute(&add(new_item("v1", 10.0, 5), Some(3))).unwrap();

        match &events[0] {
            CartEvent::QuantityChanged(e) => {
                assert_eq!(e.from, 1);
                assert_eq!(e.to, 4);
            }
            _ => panic!("Expected QuantityChanged event"),
        }
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.quantity_of(&variant("v1")), 4);
    }

    #[test]
    fn add_above_stock_is_rejected_without_state_change() {
        let mut cart = Cart::new();
        let err = cart.execute(&add(new_item("v1", 10.0, 5), Some(6))).unwrap_err();

        match err {
            CartError::StockLimitExceeded(e) => {
                assert_eq!(e.max_stock, 5);
                assert_eq!(e.requested, 6);
                assert_eq!(e.to_string(), "Only 5 items available in stock");
            }
            other => panic!("Expected StockLimitExceeded, got {other:?}"),
        }
        assert!(cart.is_empty());
        assert_eq!(cart.version(), 0);
    }

    #[test]
    fn repeat_add_uses_existing_stock_snapshot() {
        let mut cart = Cart::new();
        cart.execute(&add(new_item("v1", 10.0, 2), Some(2))).unwrap();

        // The catalog now reports more stock, but the line keeps its snapshot.
        let err = cart.execute(&add(new_item("v1", 10.0, 50), Some(1))).unwrap_err();
        match err {
            CartError::StockLimitExceeded(e) => assert_eq!(e.max_stock, 2),
            other => panic!("Expected StockLimitExceeded, got {other:?}"),
        }
        assert_eq!(cart.item(&variant("v1")).unwrap().max_stock, 2);
    }

    #[test]
    fn non_finite_price_is_refused() {
        let mut cart = Cart::new();
        cart.execute(&add(new_item("v1", 10.0, 5), None)).unwrap();

        let err = cart.execute(&add(new_item("v2", f64::NAN, 5), None)).unwrap_err();
        assert!(matches!(err, CartError::InvalidItem(DomainError::Validation(_))));
        let err = cart
            .execute(&add(new_item("v1", f64::INFINITY, 5), None))
            .unwrap_err();
        assert!(matches!(err, CartError::InvalidItem(_)));

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.quantity_of(&variant("v1")), 1);
        assert_eq!(cart.version(), 1);
    }

    #[test]
    fn zero_or_missing_add_quantity_defaults_to_one() {
        let mut cart = Cart::new();
        cart.execute(&add(new_item("v1", 10.0, 5), None)).unwrap();
        cart.execute(&add(new_item("v2", 10.0, 5), Some(0))).unwrap();

        assert_eq!(cart.quantity_of(&variant("v1")), 1);
        assert_eq!(cart.quantity_of(&variant("v2")), 1);
    }

    #[test]
    fn add_with_zero_stock_is_rejected() {
        let cart = Cart::new();
        assert!(cart.handle(&add(new_item("v1", 10.0, 0), None)).is_err());
    }

    #[test]
    fn update_to_zero_removes_line() {
        let mut cart = Cart::new();
        cart.execute(&add(new_item("v1", 10.0, 5), Some(2))).unwrap();
        let events = cart.execute(&update("v1", 0)).unwrap();

        assert!(matches!(events[0], CartEvent::ItemRemoved(_)));
        assert!(!cart.contains(&variant("v1")));
    }

    #[test]
    fn update_above_stock_leaves_item_unchanged() {
        let mut cart = Cart::new();
        cart.execute(&add(new_item("v1", 10.0, 5), Some(2))).unwrap();

        assert!(cart.execute(&update("v1", 6)).is_err());
        assert_eq!(cart.quantity_of(&variant("v1")), 2);

        cart.execute(&update("v1", 5)).unwrap();
        assert_eq!(cart.quantity_of(&variant("v1")), 5);
        assert!(!cart.can_increment(&variant("v1")));
    }

    #[test]
    fn update_unknown_variant_is_a_no_op() {
        let cart = Cart::new();
        assert!(cart.handle(&update("missing", 3)).unwrap().is_empty());
        assert!(cart.handle(&update("missing", -1)).unwrap().is_empty());
    }

    #[test]
    fn update_to_same_quantity_emits_nothing() {
        let mut cart = Cart::new();
        cart.execute(&add(new_item("v1", 10.0, 5), Some(2))).unwrap();
        assert!(cart.handle(&update("v1", 2)).unwrap().is_empty());
    }

    #[test]
    fn remove_unknown_variant_is_a_no_op() {
        let mut cart = Cart::new();
        cart.execute(&add(new_item("v1", 10.0, 5), Some(2))).unwrap();
        let before = cart.clone();

        let events = cart.execute(&remove("unknown")).unwrap();
        assert!(events.is_empty());
        assert_eq!(cart, before);
    }

    #[test]
    fn totals_sum_quantities_and_line_prices() {
        let mut cart = Cart::new();
        cart.execute(&add(new_item("v1", 10.0, 5), Some(2))).unwrap();
        cart.execute(&add(new_item("v2", 5.0, 5), Some(3))).unwrap();

        assert_eq!(cart.total_items(), 5);
        assert_eq!(cart.total_price(), 35.0);
    }

    #[test]
    fn clear_empties_and_second_clear_is_a_no_op() {
        let mut cart = Cart::new();
        cart.execute(&add(new_item("v1", 10.0, 5), Some(2))).unwrap();

        let events = cart.execute(&clear()).unwrap();
        match &events[0] {
            CartEvent::CartCleared(e) => assert_eq!(e.removed, 1),
            _ => panic!("Expected CartCleared event"),
        }
        assert!(cart.is_empty());

        assert!(cart.execute(&clear()).unwrap().is_empty());
        assert!(cart.is_empty());
    }

    #[test]
    fn apply_bumps_version_per_event() {
        let mut cart = Cart::new();
        cart.execute(&add(new_item("v1", 10.0, 5), None)).unwrap();
        cart.execute(&add(new_item("v1", 10.0, 5), None)).unwrap();
        assert_eq!(cart.version(), 2);
    }

    #[test]
    fn event_types_are_stable() {
        let mut cart = Cart::new();
        let events = cart.execute(&add(new_item("v1", 10.0, 5), None)).unwrap();
        assert_eq!(events[0].event_type(), "cart.item.added");
        assert_eq!(events[0].version(), 1);
    }

    #[test]
    fn from_items_rejects_duplicates_and_over_stock() {
        let a = new_item("v1", 1.0, 2).with_quantity(1);
        let dup = Cart::from_items(vec![a.clone(), a.clone()]).unwrap_err();
        assert!(matches!(dup, DomainError::InvariantViolation(_)));

        let over = new_item("v2", 1.0, 2).with_quantity(3);
        assert!(Cart::from_items(vec![over]).is_err());

        let zero = new_item("v3", 1.0, 2).with_quantity(0);
        assert!(Cart::from_items(vec![zero]).is_err());
    }

    #[test]
    fn hydrate_repairs_invalid_entries() {
        let items = vec![
            new_item("v1", 1.0, 5).with_quantity(2),
            new_item("v1", 1.0, 5).with_quantity(4),
            new_item("v2", 1.0, 5).with_quantity(0),
            new_item("v3", 1.0, 3).with_quantity(9),
            new_item("v4", 1.0, 0).with_quantity(1),
        ];

        let hydrated = Cart::hydrate(items);

        assert_eq!(hydrated.cart.len(), 2);
        assert_eq!(hydrated.cart.quantity_of(&variant("v1")), 2);
        assert_eq!(hydrated.cart.quantity_of(&variant("v3")), 3);
        assert_eq!(
            hydrated.repairs,
            vec![
                HydrationRepair::DuplicateDropped { variant_id: variant("v1") },
                HydrationRepair::ZeroQuantityDropped { variant_id: variant("v2") },
                HydrationRepair::Clamped { variant_id: variant("v3"), from: 9, to: 3 },
                HydrationRepair::OutOfStockDropped { variant_id: variant("v4") },
            ]
        );
    }

    #[derive(Debug, Clone)]
    enum Op {
        Add { slot: u8, quantity: u32, max_stock: u32, price: u16 },
        Update { slot: u8, quantity: i64 },
        Remove { slot: u8 },
        Clear,
    }

    fn slot_id(slot: u8) -> String {
        format!("variant-{slot}")
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            4 => (0u8..4, 0u32..8, 0u32..10, 0u16..500).prop_map(|(slot, quantity, max_stock, price)| {
                Op::Add { slot, quantity, max_stock, price }
            }),
            3 => (0u8..4, -3i64..12).prop_map(|(slot, quantity)| Op::Update { slot, quantity }),
            1 => (0u8..4).prop_map(|slot| Op::Remove { slot }),
            1 => Just(Op::Clear),
        ]
    }

    fn to_command(op: &Op) -> CartCommand {
        match op {
            Op::Add { slot, quantity, max_stock, price } => add(
                new_item(&slot_id(*slot), f64::from(*price), *max_stock),
                Some(*quantity),
            ),
            Op::Update { slot, quantity } => update(&slot_id(*slot), *quantity),
            Op::Remove { slot } => remove(&slot_id(*slot)),
            Op::Clear => clear(),
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: any sequence of operations keeps variants unique and
        /// every quantity within 1..=max_stock.
        #[test]
        fn invariants_hold_for_any_operation_sequence(
            ops in prop::collection::vec(op_strategy(), 1..40)
        ) {
            let mut cart = Cart::new();
            for op in &ops {
                let before = cart.clone();
                match cart.execute(&to_command(op)) {
                    Ok(_) => {}
                    Err(_) => prop_assert_eq!(&cart, &before),
                }

                for (idx, item) in cart.items().iter().enumerate() {
                    prop_assert!(item.quantity >= 1);
                    prop_assert!(item.quantity <= item.max_stock);
                    prop_assert!(cart.items()[..idx].iter().all(|i| i.variant_id != item.variant_id));
                }
            }
        }

        /// Property: updating to a non-positive quantity is the same as removing.
        #[test]
        fn non_positive_update_equals_remove(
            ops in prop::collection::vec(op_strategy(), 0..20),
            slot in 0u8..4,
            quantity in -5i64..=0,
        ) {
            let mut cart = Cart::new();
            for op in &ops {
                let _ = cart.execute(&to_command(op));
            }

            let mut updated = cart.clone();
            let mut removed = cart.clone();
            updated.execute(&update(&slot_id(slot), quantity)).unwrap();
            removed.execute(&remove(&slot_id(slot))).unwrap();

            prop_assert_eq!(updated.items(), removed.items());
        }

        /// Property: aggregates always match a fresh fold over the items.
        #[test]
        fn totals_match_item_fold(
            ops in prop::collection::vec(op_strategy(), 0..30)
        ) {
            let mut cart = Cart::new();
            for op in &ops {
                let _ = cart.execute(&to_command(op));
            }

            let items: u64 = cart.items().iter().map(|i| u64::from(i.quantity)).sum();
            let price: f64 = cart.items().iter().map(|i| i.price * f64::from(i.quantity)).sum();
            prop_assert_eq!(cart.total_items(), items);
            prop_assert_eq!(cart.total_price(), price);
        }
    }
}
