//! Client-side cart modeled as a reducer: a `Cart` holds the ordered lines
//! and every mutation goes through [`Cart::apply`] with a [`CartAction`].
//! Price and discount are captured at add time, so the subtotal shown to the
//! customer does not drift if the menu changes before checkout.

use serde::{Deserialize, Serialize};

use crate::services::messages::{OrderDishInput, OrderDrinkInput};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Dish,
    Drink,
}

/// Reference to a menu item: which catalog it lives in plus its id.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct ItemRef {
    pub kind: ItemKind,
    pub id: i64,
}

impl ItemRef {
    pub fn dish(id: i64) -> Self {
        Self { kind: ItemKind::Dish, id }
    }

    pub fn drink(id: i64) -> Self {
        Self { kind: ItemKind::Drink, id }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub item: ItemRef,
    pub quantity: u32,
    pub price: f64,
    pub discount: Option<f64>,
}

impl CartLine {
    /// `price * (1 - discount / 100)` when a positive discount was captured,
    /// plain price otherwise.
    pub fn effective_price(&self) -> f64 {
        match self.discount {
            Some(d) if d > 0.0 => self.price * (1.0 - d / 100.0),
            _ => self.price,
        }
    }

    pub fn line_total(&self) -> f64 {
        self.effective_price() * f64::from(self.quantity)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum CartAction {
    Add {
        item: ItemRef,
        price: f64,
        discount: Option<f64>,
    },
    Remove {
        item: ItemRef,
    },
    SetQuantity {
        item: ItemRef,
        quantity: i64,
    },
    Clear,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, action: CartAction) {
        match action {
            CartAction::Add { item, price, discount } => {
                match self.lines.iter_mut().find(|line| line.item == item) {
                    Some(line) => line.quantity += 1,
                    None => self.lines.push(CartLine {
                        item,
                        quantity: 1,
                        price,
                        discount,
                    }),
                }
            }
            CartAction::Remove { item } => self.lines.retain(|line| line.item != item),
            CartAction::SetQuantity { item, quantity } => {
                if quantity <= 0 {
                    self.lines.retain(|line| line.item != item);
                } else if let Some(line) = self.lines.iter_mut().find(|line| line.item == item) {
                    // saturates instead of wrapping on an out-of-range count
                    line.quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
                }
            }
            CartAction::Clear => self.lines.clear(),
        }
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn subtotal(&self) -> f64 {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Splits the cart into the dish/drink line arrays the order endpoint
    /// expects, preserving the order the items were added in.
    pub fn order_lines(&self) -> (Vec<OrderDishInput>, Vec<OrderDrinkInput>) {
        let mut dishes = Vec::new();
        let mut drinks = Vec::new();
        for line in &self.lines {
            let quantity = i32::try_from(line.quantity).unwrap_or(i32::MAX);
            match line.item.kind {
                ItemKind::Dish => dishes.push(OrderDishInput {
                    dish_id: line.item.id,
                    quantity,
                }),
                ItemKind::Drink => drinks.push(OrderDrinkInput {
                    drink_id: line.item.id,
                    quantity,
                }),
            }
        }
        (dishes, drinks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add(cart: &mut Cart, item: ItemRef, price: f64, discount: Option<f64>) {
        cart.apply(CartAction::Add { item, price, discount });
    }

    #[test]
    fn repeated_add_merges_into_quantity_increments() {
        let mut cart = Cart::new();
        add(&mut cart, ItemRef::dish(3), 450.0, None);
        add(&mut cart, ItemRef::dish(3), 450.0, None);
        add(&mut cart, ItemRef::drink(5), 120.0, None);

        assert_eq!(cart.lines().len(), 2);
        assert_eq!(cart.lines()[0].quantity, 2);
        assert_eq!(cart.lines()[1].quantity, 1);
    }

    #[test]
    fn same_id_in_different_catalogs_stays_separate() {
        let mut cart = Cart::new();
        add(&mut cart, ItemRef::dish(7), 300.0, None);
        add(&mut cart, ItemRef::drink(7), 90.0, None);

        assert_eq!(cart.lines().len(), 2);
    }

    #[test]
    fn effective_price_applies_percentage_discount() {
        let line = CartLine {
            item: ItemRef::dish(1),
            quantity: 1,
            price: 200.0,
            discount: Some(25.0),
        };
        assert!((line.effective_price() - 150.0).abs() < 1e-9);
    }

    #[test]
    fn effective_price_without_discount_equals_price() {
        for discount in [None, Some(0.0)] {
            let line = CartLine {
                item: ItemRef::drink(1),
                quantity: 1,
                price: 120.0,
                discount,
            };
            assert_eq!(line.effective_price(), 120.0);
        }
    }

    #[test]
    fn subtotal_sums_discounted_line_totals() {
        let mut cart = Cart::new();
        add(&mut cart, ItemRef::dish(1), 100.0, Some(10.0));
        add(&mut cart, ItemRef::dish(1), 100.0, Some(10.0));
        add(&mut cart, ItemRef::drink(2), 50.0, None);

        // 2 * 90 + 50
        assert!((cart.subtotal() - 230.0).abs() < 1e-9);
    }

    #[test]
    fn set_quantity_zero_or_less_removes_the_line() {
        let mut cart = Cart::new();
        add(&mut cart, ItemRef::dish(1), 100.0, None);
        add(&mut cart, ItemRef::drink(2), 50.0, None);

        cart.apply(CartAction::SetQuantity { item: ItemRef::dish(1), quantity: 0 });
        assert_eq!(cart.lines().len(), 1);

        cart.apply(CartAction::SetQuantity { item: ItemRef::drink(2), quantity: -3 });
        assert!(cart.is_empty());
    }

    #[test]
    fn set_quantity_overwrites_the_count() {
        let mut cart = Cart::new();
        add(&mut cart, ItemRef::dish(1), 100.0, None);
        cart.apply(CartAction::SetQuantity { item: ItemRef::dish(1), quantity: 4 });

        assert_eq!(cart.lines()[0].quantity, 4);
        assert_eq!(cart.subtotal(), 400.0);
    }

    #[test]
    fn oversized_quantities_saturate_instead_of_wrapping() {
        let mut cart = Cart::new();
        add(&mut cart, ItemRef::dish(1), 100.0, None);
        cart.apply(CartAction::SetQuantity {
            item: ItemRef::dish(1),
            quantity: i64::from(u32::MAX) + 1,
        });
        assert_eq!(cart.lines()[0].quantity, u32::MAX);

        let (dishes, _) = cart.order_lines();
        assert_eq!(dishes[0].quantity, i32::MAX);
    }

    #[test]
    fn remove_and_clear_empty_the_cart() {
        let mut cart = Cart::new();
        add(&mut cart, ItemRef::dish(1), 100.0, None);
        add(&mut cart, ItemRef::drink(2), 50.0, None);

        cart.apply(CartAction::Remove { item: ItemRef::dish(1) });
        assert_eq!(cart.lines().len(), 1);

        cart.apply(CartAction::Clear);
        assert!(cart.is_empty());
        assert_eq!(cart.subtotal(), 0.0);
    }

    #[test]
    fn order_lines_split_by_catalog_in_add_order() {
        let mut cart = Cart::new();
        add(&mut cart, ItemRef::dish(3), 450.0, None);
        add(&mut cart, ItemRef::drink(5), 120.0, None);
        add(&mut cart, ItemRef::dish(3), 450.0, None);
        add(&mut cart, ItemRef::dish(8), 300.0, None);

        let (dishes, drinks) = cart.order_lines();
        assert_eq!(dishes.len(), 2);
        assert_eq!(dishes[0].dish_id, 3);
        assert_eq!(dishes[0].quantity, 2);
        assert_eq!(dishes[1].dish_id, 8);
        assert_eq!(drinks.len(), 1);
        assert_eq!(drinks[0].drink_id, 5);
        assert_eq!(drinks[0].quantity, 1);
    }
}
