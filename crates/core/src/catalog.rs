//! The static product catalog.
//!
//! The catalog is compiled into the binary. Every lookup here is a pure
//! function over an in-memory list; nothing in this module performs I/O.

use std::collections::HashSet;

use rust_decimal::Decimal;

use crate::product::{Product, ProductFlags};
use crate::types::ProductId;

/// Sizes offered across the range, in display order.
pub const STANDARD_SIZES: &[&str] = &["XS", "S", "M", "L", "XL", "XXL"];

/// An inclusive price band used by the browse filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceRange {
    pub label: &'static str,
    pub min: Decimal,
    /// `None` means open-ended.
    pub max: Option<Decimal>,
}

impl PriceRange {
    /// The bands offered on the products page.
    pub const STANDARD: [Self; 4] = [
        Self {
            label: "Under $25",
            min: Decimal::ZERO,
            max: Some(Decimal::from_parts(25, 0, 0, false, 0)),
        },
        Self {
            label: "$25 - $50",
            min: Decimal::from_parts(25, 0, 0, false, 0),
            max: Some(Decimal::from_parts(50, 0, 0, false, 0)),
        },
        Self {
            label: "$50 - $100",
            min: Decimal::from_parts(50, 0, 0, false, 0),
            max: Some(Decimal::ONE_HUNDRED),
        },
        Self {
            label: "Over $100",
            min: Decimal::ONE_HUNDRED,
            max: None,
        },
    ];

    /// Whether `price` falls inside the band (both ends inclusive).
    #[must_use]
    pub fn contains(&self, price: Decimal) -> bool {
        price >= self.min && self.max.is_none_or(|max| price <= max)
    }
}

/// Sort orders for the products page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Catalog order.
    #[default]
    Featured,
    PriceLowHigh,
    PriceHighLow,
    /// New arrivals first, otherwise catalog order.
    Newest,
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "featured" => Ok(Self::Featured),
            "price-low-high" => Ok(Self::PriceLowHigh),
            "price-high-low" => Ok(Self::PriceHighLow),
            "newest" => Ok(Self::Newest),
            _ => Err(format!("invalid sort order: {s}")),
        }
    }
}

/// Browse filters. Each non-empty list narrows the result to products
/// matching any of its entries; empty lists do not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub categories: Vec<String>,
    pub colors: Vec<String>,
    pub sizes: Vec<String>,
    pub price_ranges: Vec<PriceRange>,
}

impl ProductFilter {
    /// Whether no filter is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
            && self.colors.is_empty()
            && self.sizes.is_empty()
            && self.price_ranges.is_empty()
    }

    /// Number of selected filter values, shown next to the filter toggle.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.categories.len() + self.colors.len() + self.sizes.len() + self.price_ranges.len()
    }

    /// Whether `product` passes every active filter.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        let category_ok =
            self.categories.is_empty() || self.categories.iter().any(|c| *c == product.category);
        let color_ok = self.colors.is_empty() || self.colors.iter().any(|c| product.has_color(c));
        let size_ok = self.sizes.is_empty() || self.sizes.iter().any(|s| product.has_size(s));
        let price = product.effective_price();
        let price_ok =
            self.price_ranges.is_empty() || self.price_ranges.iter().any(|r| r.contains(price));

        category_ok && color_ok && size_ok && price_ok
    }
}

/// The product catalog.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// Build a catalog from an explicit product list.
    #[must_use]
    pub const fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// The catalog shipped with the store.
    #[must_use]
    pub fn builtin() -> Self {
        Self::new(builtin_products())
    }

    /// Look up a product by ID.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == *id)
    }

    /// Every product, in catalog order.
    #[must_use]
    pub fn all(&self) -> &[Product] {
        &self.products
    }

    #[must_use]
    pub fn featured(&self) -> Vec<&Product> {
        self.flagged(|f| f.featured)
    }

    #[must_use]
    pub fn best_sellers(&self) -> Vec<&Product> {
        self.flagged(|f| f.best_seller)
    }

    #[must_use]
    pub fn new_arrivals(&self) -> Vec<&Product> {
        self.flagged(|f| f.new)
    }

    /// Distinct categories in first-seen order.
    #[must_use]
    pub fn categories(&self) -> Vec<&str> {
        distinct(self.products.iter().map(|p| p.category.as_str()))
    }

    /// Distinct colors across all products in first-seen order.
    #[must_use]
    pub fn colors(&self) -> Vec<&str> {
        distinct(
            self.products
                .iter()
                .flat_map(|p| p.colors.iter().map(String::as_str)),
        )
    }

    /// Apply `filter` and then `sort`.
    ///
    /// Sorting is stable, so products with equal keys keep catalog order.
    #[must_use]
    pub fn browse(&self, filter: &ProductFilter, sort: SortOrder) -> Vec<&Product> {
        let mut result: Vec<&Product> = self.products.iter().filter(|p| filter.matches(p)).collect();

        match sort {
            SortOrder::Featured => {}
            SortOrder::PriceLowHigh => result.sort_by_key(|p| p.effective_price()),
            SortOrder::PriceHighLow => {
                result.sort_by_key(|p| std::cmp::Reverse(p.effective_price()));
            }
            SortOrder::Newest => result.sort_by_key(|p| !p.flags.new),
        }

        result
    }

    fn flagged(&self, pred: impl Fn(&ProductFlags) -> bool) -> Vec<&Product> {
        self.products.iter().filter(|p| pred(&p.flags)).collect()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| (*v).to_string()).collect()
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    values.filter(|v| seen.insert(*v)).collect()
}

struct Entry {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    cents: i64,
    colors: &'static [&'static str],
    sizes: &'static [&'static str],
    images: &'static [&'static str],
    category: &'static str,
    flags: ProductFlags,
}

impl From<Entry> for Product {
    fn from(e: Entry) -> Self {
        Self {
            id: ProductId::from(e.id),
            name: e.name.to_string(),
            description: e.description.to_string(),
            price: Decimal::new(e.cents, 2),
            colors: owned(e.colors),
            sizes: owned(e.sizes),
            images: owned(e.images),
            category: e.category.to_string(),
            flags: e.flags,
            sale: None,
        }
    }
}

macro_rules! unsplash {
    ($($photo:literal),+ $(,)?) => {
        &[$(concat!("https://images.unsplash.com/", $photo, "?ixlib=rb-1.2.1&auto=format&fit=crop&w=800&q=80")),+]
    };
}

#[allow(clippy::too_many_lines)]
fn builtin_products() -> Vec<Product> {
    let flags = |new, best_seller, featured| ProductFlags {
        new,
        best_seller,
        featured,
    };

    vec![
        Entry {
            id: "tshirt-001",
            name: "Essential Cotton Tee",
            description: "Our classic crew neck t-shirt made from premium organic cotton. \
                Designed for everyday comfort with a timeless fit and exceptional softness.",
            cents: 3999,
            colors: &["Black", "White", "Navy", "Heather Gray"],
            sizes: &["XS", "S", "M", "L", "XL", "XXL"],
            images: unsplash!("photo-1521572163474-6864f9cf17ab", "photo-1503341504253-dff4815485f1"),
            category: "Basic",
            flags: flags(false, true, true),
        },
        Entry {
            id: "tshirt-002",
            name: "Premium Minimalist Tee",
            description: "Crafted from luxurious long-staple cotton with a clean design and \
                immaculate finishing.",
            cents: 4999,
            colors: &["Black", "White", "Sage", "Sand"],
            sizes: &["XS", "S", "M", "L", "XL", "XXL"],
            images: unsplash!("photo-1581655353564-df123a1eb820", "photo-1583743814966-8936f5b7be1a"),
            category: "Premium",
            flags: flags(false, false, true),
        },
        Entry {
            id: "tshirt-003",
            name: "Oversized Contemporary Tee",
            description: "A dropped shoulder and relaxed fit in heavyweight cotton for \
                substantial feel and excellent drape.",
            cents: 4599,
            colors: &["Black", "White", "Washed Blue", "Terracotta"],
            sizes: &["S", "M", "L", "XL"],
            images: unsplash!("photo-1576566588028-4147f3842f27", "photo-1596755094514-f87e34085b2c"),
            category: "Contemporary",
            flags: flags(true, false, false),
        },
        Entry {
            id: "tshirt-004",
            name: "Heavyweight Textured Tee",
            description: "A slub texture gives depth and character to this elevated basic.",
            cents: 5599,
            colors: &["Charcoal", "Cream", "Rust", "Olive"],
            sizes: &["S", "M", "L", "XL", "XXL"],
            images: unsplash!("photo-1554568218-0f1715e72254", "photo-1551798507-629020c81463"),
            category: "Premium",
            flags: flags(false, true, false),
        },
        Entry {
            id: "tshirt-005",
            name: "Organic Cotton Pocket Tee",
            description: "A single chest pocket on our signature premium cotton base.",
            cents: 4299,
            colors: &["White", "Navy", "Olive", "Charcoal"],
            sizes: &["XS", "S", "M", "L", "XL"],
            images: unsplash!("photo-1596755094514-f87e34085b2c", "photo-1583744946564-b52ac1c389c8"),
            category: "Basic",
            flags: flags(false, false, true),
        },
        Entry {
            id: "tshirt-006",
            name: "Relaxed Merino Blend Tee",
            description: "Breathable, temperature-regulating and incredibly soft.",
            cents: 6599,
            colors: &["Black", "Gray Melange", "Burgundy", "Navy"],
            sizes: &["S", "M", "L", "XL"],
            images: unsplash!("photo-1594633312681-425c7b97ccd1", "photo-1583744946564-b52ac1c389c8"),
            category: "Premium",
            flags: flags(true, false, false),
        },
        Entry {
            id: "tshirt-007",
            name: "Vintage Wash Cotton Tee",
            description: "Garment dyed for unique color variation and pre-shrunk for a \
                consistent fit.",
            cents: 4799,
            colors: &["Washed Black", "Washed Blue", "Washed Burgundy", "Washed Green"],
            sizes: &["XS", "S", "M", "L", "XL", "XXL"],
            images: unsplash!("photo-1529374255404-311a2a4f1fd9", "photo-1516720262454-a5a1c0d48a58"),
            category: "Vintage",
            flags: flags(false, true, false),
        },
        Entry {
            id: "tshirt-008",
            name: "Long Sleeve Essential Tee",
            description: "The same premium quality as our classic tee with added versatility \
                for year-round wear.",
            cents: 4999,
            colors: &["Black", "White", "Gray", "Navy"],
            sizes: &["XS", "S", "M", "L", "XL"],
            images: unsplash!("photo-1618354691373-d851c5c3a990", "photo-1609873814058-a8928924184a"),
            category: "Basic",
            flags: flags(false, false, true),
        },
    ]
    .into_iter()
    .map(Product::from)
    .collect()
}
