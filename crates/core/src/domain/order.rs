use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::domain::product::ProductId;
use crate::errors::OrderError;
use crate::money::format_cents;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub String);

impl OrderId {
    fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Cart-like aggregate mapping product ids to strictly positive quantities.
///
/// Every mutation validates the product against the catalog first; an unknown
/// product fails with [`OrderError::ProductNotFound`] and leaves the order
/// untouched. Orders live in memory only and are never persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Order {
    id: OrderId,
    entries: BTreeMap<ProductId, u32>,
}

/// Outcome of pricing an order against the catalog.
///
/// `missing_products` lists ordered products the catalog no longer knows.
/// Their contribution is skipped rather than failing the whole total, since a
/// missing product signals upstream corruption, not a caller mistake.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OrderTotal {
    pub total_cents: i64,
    pub missing_products: Vec<ProductId>,
}

impl OrderTotal {
    pub fn is_consistent(&self) -> bool {
        self.missing_products.is_empty()
    }
}

impl Order {
    /// Highest quantity a single product can reach through `add_product`
    /// increments or `set_quantity` overwrites.
    pub const MAX_QUANTITY: u32 = 25;

    pub fn new() -> Self {
        Self { id: OrderId::generate(), entries: BTreeMap::new() }
    }

    /// Sanitizing constructor: entries with quantity zero or a product id the
    /// catalog does not know are silently dropped, never an error.
    pub fn from_entries<C>(
        catalog: &C,
        entries: impl IntoIterator<Item = (ProductId, u32)>,
    ) -> Self
    where
        C: Catalog + ?Sized,
    {
        let entries = entries
            .into_iter()
            .filter(|(product_id, quantity)| *quantity > 0 && catalog.exists(product_id))
            .collect();

        Self { id: OrderId::generate(), entries }
    }

    /// Draw `count` product ids with replacement uniformly from the catalog,
    /// each assigned a quantity uniformly in 1..=5. Repeated draws of the
    /// same id overwrite, so the order may end up with fewer than `count`
    /// entries. Intended for synthetic test fixtures, not production orders.
    pub fn with_random_products<C>(catalog: &C, count: usize) -> Self
    where
        C: Catalog + ?Sized,
    {
        use rand::Rng;

        let ids = catalog.product_ids();
        let mut entries = BTreeMap::new();
        if !ids.is_empty() {
            let mut rng = rand::thread_rng();
            for _ in 0..count {
                let product_id = ids[rng.gen_range(0..ids.len())].clone();
                entries.insert(product_id, rng.gen_range(1..=5));
            }
        }

        Self { id: OrderId::generate(), entries }
    }

    pub fn id(&self) -> &OrderId {
        &self.id
    }

    /// Quantity for `product_id`; absent products count as zero.
    pub fn quantity(&self, product_id: &ProductId) -> u32 {
        self.entries.get(product_id).copied().unwrap_or(0)
    }

    pub fn entries(&self) -> &BTreeMap<ProductId, u32> {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Increment `product_id`'s quantity by one, inserting it at quantity one
    /// if absent. Once the quantity is at or above [`Self::MAX_QUANTITY`] the
    /// call is a silent no-op, not an error.
    pub fn add_product<C>(&mut self, catalog: &C, product_id: &ProductId) -> Result<(), OrderError>
    where
        C: Catalog + ?Sized,
    {
        self.ensure_known(catalog, product_id)?;

        match self.entries.get(product_id).copied() {
            None => {
                self.entries.insert(product_id.clone(), 1);
            }
            Some(quantity) if quantity < Self::MAX_QUANTITY => {
                self.entries.insert(product_id.clone(), quantity + 1);
            }
            Some(_) => {}
        }

        Ok(())
    }

    /// Decrement `product_id`'s quantity by one, dropping the entry entirely
    /// when the quantity is one. Removing a product that is not in the order
    /// is a silent no-op.
    pub fn remove_product<C>(
        &mut self,
        catalog: &C,
        product_id: &ProductId,
    ) -> Result<(), OrderError>
    where
        C: Catalog + ?Sized,
    {
        self.ensure_known(catalog, product_id)?;

        match self.entries.get(product_id).copied() {
            Some(1) => {
                self.entries.remove(product_id);
            }
            Some(quantity) => {
                self.entries.insert(product_id.clone(), quantity - 1);
            }
            None => {}
        }

        Ok(())
    }

    /// Set `product_id`'s quantity directly.
    ///
    /// A quantity of zero removes the entry and fails with
    /// [`OrderError::ProductNotInOrder`] if there is nothing to remove,
    /// unlike `remove_product`. Overwrites above [`Self::MAX_QUANTITY`] are
    /// silently ignored; fresh inserts are not capped.
    pub fn set_quantity<C>(
        &mut self,
        catalog: &C,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<(), OrderError>
    where
        C: Catalog + ?Sized,
    {
        self.ensure_known(catalog, product_id)?;

        if quantity == 0 {
            if self.entries.remove(product_id).is_none() {
                return Err(OrderError::ProductNotInOrder(product_id.clone()));
            }
            return Ok(());
        }

        match self.entries.get(product_id) {
            None => {
                self.entries.insert(product_id.clone(), quantity);
            }
            Some(_) if quantity <= Self::MAX_QUANTITY => {
                self.entries.insert(product_id.clone(), quantity);
            }
            Some(_) => {}
        }

        Ok(())
    }

    /// Sum of `unit_price * quantity` over all entries, recomputed from the
    /// catalog. Entries whose product the catalog no longer knows are skipped
    /// and reported, both in the returned total and as a warning.
    pub fn total_price<C>(&self, catalog: &C) -> OrderTotal
    where
        C: Catalog + ?Sized,
    {
        let mut total = OrderTotal::default();
        for (product_id, quantity) in &self.entries {
            match catalog.find(product_id) {
                Some(product) => {
                    total.total_cents += product.unit_price_cents * i64::from(*quantity);
                }
                None => {
                    tracing::warn!(
                        order_id = %self.id,
                        product_id = %product_id,
                        "ordered product is missing from the catalog, skipping its contribution"
                    );
                    total.missing_products.push(product_id.clone());
                }
            }
        }
        total
    }

    /// Human-readable rendering: a numbered line per entry followed by the
    /// formatted grand total. Entries missing from the catalog are omitted.
    pub fn receipt<C>(&self, catalog: &C) -> String
    where
        C: Catalog + ?Sized,
    {
        let mut output = format!("Order {}\n", self.id);
        let mut line_no = 0;
        for (product_id, quantity) in &self.entries {
            let Some(product) = catalog.find(product_id) else {
                continue;
            };
            line_no += 1;
            output.push_str(&format!(
                "{line_no}. {quantity} of {} @ {} each\n",
                product.name,
                format_cents(product.unit_price_cents),
            ));
        }
        output.push_str(&format!("TOTAL: {}", format_cents(self.total_price(catalog).total_cents)));
        output
    }

    fn ensure_known<C>(&self, catalog: &C, product_id: &ProductId) -> Result<(), OrderError>
    where
        C: Catalog + ?Sized,
    {
        if catalog.exists(product_id) {
            Ok(())
        } else {
            Err(OrderError::ProductNotFound(product_id.clone()))
        }
    }
}

impl Default for Order {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{Order, OrderTotal};
    use crate::catalog::{Catalog, InMemoryCatalog};
    use crate::domain::product::{Product, ProductId};
    use crate::errors::OrderError;

    fn widget_id() -> ProductId {
        ProductId("widget".to_string())
    }

    fn gadget_id() -> ProductId {
        ProductId("gadget".to_string())
    }

    fn catalog() -> InMemoryCatalog {
        InMemoryCatalog::new(vec![
            Product {
                id: widget_id(),
                name: "Widget".to_string(),
                unit_price_cents: 150,
            },
            Product {
                id: gadget_id(),
                name: "Gadget".to_string(),
                unit_price_cents: 300,
            },
        ])
    }

    #[test]
    fn add_product_inserts_at_quantity_one() {
        let catalog = catalog();
        let mut order = Order::new();

        order.add_product(&catalog, &widget_id()).expect("add widget");

        assert_eq!(order.quantity(&widget_id()), 1);
    }

    #[test]
    fn add_product_rejects_unknown_product_without_mutating() {
        let catalog = catalog();
        let mut order = Order::new();
        order.add_product(&catalog, &widget_id()).expect("add widget");

        let unknown = ProductId("nope".to_string());
        let error = order.add_product(&catalog, &unknown).expect_err("unknown product");

        assert_eq!(error, OrderError::ProductNotFound(unknown));
        assert_eq!(order.entries().len(), 1);
    }

    #[test]
    fn add_product_counts_up_then_caps_at_max_quantity() {
        let catalog = catalog();
        let mut order = Order::new();

        for expected in 1..=Order::MAX_QUANTITY {
            order.add_product(&catalog, &widget_id()).expect("add widget");
            assert_eq!(order.quantity(&widget_id()), expected);
        }

        order.add_product(&catalog, &widget_id()).expect("add at cap");
        order.add_product(&catalog, &widget_id()).expect("add at cap again");
        assert_eq!(order.quantity(&widget_id()), Order::MAX_QUANTITY);
    }

    #[test]
    fn add_product_does_not_touch_externally_seeded_overweight_entries() {
        let catalog = catalog();
        let mut order = Order::new();
        order.set_quantity(&catalog, &widget_id(), 30).expect("seed above cap");

        order.add_product(&catalog, &widget_id()).expect("add at 30");

        assert_eq!(order.quantity(&widget_id()), 30);
    }

    #[test]
    fn remove_product_decrements_quantity() {
        let catalog = catalog();
        let mut order = Order::new();
        order.set_quantity(&catalog, &widget_id(), 3).expect("seed");

        order.remove_product(&catalog, &widget_id()).expect("remove");

        assert_eq!(order.quantity(&widget_id()), 2);
    }

    #[test]
    fn remove_product_at_quantity_one_drops_the_entry() {
        let catalog = catalog();
        let mut order = Order::new();
        order.add_product(&catalog, &widget_id()).expect("add");

        order.remove_product(&catalog, &widget_id()).expect("remove");

        assert!(order.is_empty());
        assert_eq!(order.quantity(&widget_id()), 0);
    }

    #[test]
    fn remove_product_on_absent_entry_is_a_noop() {
        let catalog = catalog();
        let mut order = Order::new();

        order.remove_product(&catalog, &widget_id()).expect("remove absent");

        assert!(order.is_empty());
    }

    #[test]
    fn remove_product_rejects_unknown_product() {
        let catalog = catalog();
        let mut order = Order::new();

        let unknown = ProductId("nope".to_string());
        let error = order.remove_product(&catalog, &unknown).expect_err("unknown product");

        assert_eq!(error, OrderError::ProductNotFound(unknown));
    }

    #[test]
    fn set_quantity_zero_removes_a_present_entry() {
        let catalog = catalog();
        let mut order = Order::new();
        order.set_quantity(&catalog, &widget_id(), 4).expect("seed");

        order.set_quantity(&catalog, &widget_id(), 0).expect("clear");

        assert!(order.is_empty());
    }

    #[test]
    fn set_quantity_zero_on_absent_entry_is_an_error() {
        let catalog = catalog();
        let mut order = Order::new();

        let error = order.set_quantity(&catalog, &widget_id(), 0).expect_err("clear absent");

        assert_eq!(error, OrderError::ProductNotInOrder(widget_id()));
    }

    #[test]
    fn set_quantity_fresh_insert_is_not_capped() {
        let catalog = catalog();
        let mut order = Order::new();

        order.set_quantity(&catalog, &widget_id(), 40).expect("fresh insert");

        assert_eq!(order.quantity(&widget_id()), 40);
    }

    #[test]
    fn set_quantity_overwrite_respects_the_cap() {
        let catalog = catalog();
        let mut order = Order::new();
        order.set_quantity(&catalog, &widget_id(), 3).expect("seed");

        order.set_quantity(&catalog, &widget_id(), 30).expect("over cap");
        assert_eq!(order.quantity(&widget_id()), 3);

        order.set_quantity(&catalog, &widget_id(), Order::MAX_QUANTITY).expect("at cap");
        assert_eq!(order.quantity(&widget_id()), Order::MAX_QUANTITY);
    }

    #[test]
    fn total_price_sums_unit_price_times_quantity() {
        let catalog = catalog();
        let mut order = Order::new();
        order.set_quantity(&catalog, &widget_id(), 2).expect("widgets");
        order.set_quantity(&catalog, &gadget_id(), 1).expect("gadget");

        let total = order.total_price(&catalog);

        assert_eq!(total, OrderTotal { total_cents: 600, missing_products: Vec::new() });
        assert!(total.is_consistent());
    }

    #[test]
    fn total_price_skips_products_the_catalog_no_longer_knows() {
        let catalog = catalog();
        let mut order = Order::new();
        order.set_quantity(&catalog, &widget_id(), 2).expect("widgets");
        order.set_quantity(&catalog, &gadget_id(), 1).expect("gadget");

        // Shrink the catalog after the fact to simulate upstream corruption.
        let shrunk = InMemoryCatalog::new(vec![Product {
            id: widget_id(),
            name: "Widget".to_string(),
            unit_price_cents: 150,
        }]);
        let total = order.total_price(&shrunk);

        assert_eq!(total.total_cents, 300);
        assert_eq!(total.missing_products, vec![gadget_id()]);
        assert!(!total.is_consistent());
    }

    #[test]
    fn from_entries_drops_zero_quantities_and_unknown_products() {
        let catalog = catalog();

        let order = Order::from_entries(
            &catalog,
            vec![
                (widget_id(), 2),
                (gadget_id(), 0),
                (ProductId("nope".to_string()), 7),
            ],
        );

        assert_eq!(order.entries().len(), 1);
        assert_eq!(order.quantity(&widget_id()), 2);
    }

    #[test]
    fn from_entries_preserves_already_valid_input() {
        let catalog = catalog();
        let input = vec![(widget_id(), 2), (gadget_id(), 5)];

        let order = Order::from_entries(&catalog, input.clone());

        let expected: std::collections::BTreeMap<_, _> = input.into_iter().collect();
        assert_eq!(order.entries(), &expected);
    }

    #[test]
    fn with_random_products_draws_known_ids_with_quantities_in_range() {
        let catalog = catalog();

        let order = Order::with_random_products(&catalog, 8);

        assert!(order.entries().len() <= 2);
        for (product_id, quantity) in order.entries() {
            assert!(catalog.exists(product_id));
            assert!((1..=5).contains(quantity));
        }
    }

    #[test]
    fn with_random_products_on_an_empty_catalog_yields_an_empty_order() {
        let catalog = InMemoryCatalog::default();

        let order = Order::with_random_products(&catalog, 4);

        assert!(order.is_empty());
    }

    #[test]
    fn receipt_renders_numbered_lines_and_a_grand_total() {
        let catalog = catalog();
        let mut order = Order::new();
        order.set_quantity(&catalog, &widget_id(), 2).expect("widgets");
        order.set_quantity(&catalog, &gadget_id(), 1).expect("gadget");

        let receipt = order.receipt(&catalog);

        let expected = format!(
            "Order {}\n1. 1 of Gadget @ $3.00 each\n2. 2 of Widget @ $1.50 each\nTOTAL: $6.00",
            order.id()
        );
        assert_eq!(receipt, expected);
    }

    #[test]
    fn orders_get_distinct_ids() {
        assert_ne!(Order::new().id(), Order::new().id());
    }
}
