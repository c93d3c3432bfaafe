//! Cart line set with derived totals.

use rust_decimal::Decimal;

use teeshop_core::Price;

use super::line::{CartLine, LineKey};

/// The cart's lines and the totals derived from them.
///
/// Totals are recomputed after every mutation, so they can never disagree
/// with the lines. Every line has a quantity of at least one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartState {
    lines: Vec<CartLine>,
    total_items: u32,
    total_price: Decimal,
}

impl CartState {
    /// Build a state from stored lines, merging duplicate keys and dropping
    /// lines with no quantity.
    #[must_use]
    pub fn from_lines(lines: impl IntoIterator<Item = CartLine>) -> Self {
        let mut state = Self::default();
        for line in lines {
            state.merge(line);
        }
        state.recompute();
        state
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of quantities over all lines.
    #[must_use]
    pub const fn total_items(&self) -> u32 {
        self.total_items
    }

    /// Sum of unit price times quantity over all lines.
    #[must_use]
    pub const fn total_price(&self) -> Decimal {
        self.total_price
    }

    #[must_use]
    pub fn total(&self) -> Price {
        Price::usd(self.total_price)
    }

    #[must_use]
    pub fn line(&self, key: LineKey<'_>) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.key() == key)
    }

    /// Add `line`, or add its quantity to the line with the same key.
    pub(crate) fn add(&mut self, line: CartLine) {
        self.merge(line);
        self.recompute();
    }

    /// Remove the line with `key`. Returns whether a line was removed.
    pub(crate) fn remove(&mut self, key: LineKey<'_>) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.key() != key);
        self.recompute();
        self.lines.len() != before
    }

    /// Overwrite the quantity of the line with `key`; zero removes it.
    /// Returns whether a line changed.
    pub(crate) fn set_quantity(&mut self, key: LineKey<'_>, quantity: u32) -> bool {
        if quantity == 0 {
            return self.remove(key);
        }
        let changed = match self.lines.iter_mut().find(|l| l.key() == key) {
            Some(line) => {
                line.quantity = quantity;
                true
            }
            None => false,
        };
        self.recompute();
        changed
    }

    pub(crate) fn clear(&mut self) {
        self.lines.clear();
        self.recompute();
    }

    fn merge(&mut self, line: CartLine) {
        if line.quantity == 0 {
            return;
        }
        match self.lines.iter_mut().find(|l| l.key() == line.key()) {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(line.quantity),
            None => self.lines.push(line),
        }
    }

    fn recompute(&mut self) {
        self.total_items = self
            .lines
            .iter()
            .fold(0u32, |sum, l| sum.saturating_add(l.quantity));
        self.total_price = self.lines.iter().map(CartLine::line_total).sum();
    }
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use teeshop_core::ProductId;

    use super::super::line::CartProduct;
    use super::*;

    fn line(id: &str, cents: i64, quantity: u32, size: &str) -> CartLine {
        CartLine {
            product: CartProduct {
                id: ProductId::from(id),
                name: id.to_string(),
                unit_price: Decimal::new(cents, 2),
                image: None,
            },
            quantity,
            size: size.to_string(),
            color: "Black".to_string(),
        }
    }

    #[test]
    fn test_same_key_merges() {
        let mut state = CartState::default();
        state.add(line("a", 1000, 2, "M"));
        state.add(line("a", 1000, 3, "M"));

        assert_eq!(state.lines().len(), 1);
        assert_eq!(state.lines()[0].quantity, 5);
        assert_eq!(state.total_items(), 5);
    }

    #[test]
    fn test_different_size_is_a_new_line() {
        let mut state = CartState::default();
        state.add(line("a", 1000, 1, "M"));
        state.add(line("a", 1000, 1, "L"));
        assert_eq!(state.lines().len(), 2);
    }

    #[test]
    fn test_totals_follow_every_mutation() {
        let mut state = CartState::default();
        state.add(line("a", 1000, 2, "M"));
        state.add(line("b", 500, 1, "M"));
        assert_eq!(state.total_items(), 3);
        assert_eq!(state.total_price(), Decimal::new(2500, 2));
        assert_eq!(state.total().to_string(), "$25.00");

        let id = ProductId::from("a");
        assert!(state.set_quantity(LineKey::new(&id, "M", "Black"), 1));
        assert_eq!(state.total_items(), 2);
        assert_eq!(state.total_price(), Decimal::new(1500, 2));

        assert!(state.remove(LineKey::new(&id, "M", "Black")));
        assert_eq!(state.total_items(), 1);
        assert_eq!(state.total_price(), Decimal::new(500, 2));

        state.clear();
        assert_eq!(state.total_items(), 0);
        assert_eq!(state.total_price(), Decimal::ZERO);
    }

    #[test]
    fn test_missing_line_is_a_no_op() {
        let mut state = CartState::default();
        state.add(line("a", 1000, 1, "M"));
        let id = ProductId::from("zzz");

        assert!(!state.remove(LineKey::new(&id, "M", "Black")));
        assert!(!state.set_quantity(LineKey::new(&id, "M", "Black"), 4));
        assert_eq!(state.total_items(), 1);
    }

    #[test]
    fn test_from_lines_normalizes() {
        let state = CartState::from_lines([
            line("a", 1000, 1, "M"),
            line("a", 1000, 2, "M"),
            line("b", 500, 0, "M"),
        ]);
        assert_eq!(state.lines().len(), 1);
        assert_eq!(state.total_items(), 3);
        assert_eq!(state.total_price(), Decimal::new(3000, 2));
    }
}
