//! Product and variant types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{ProductId, VariantId, discount_percent};

use super::Selection;

// =============================================================================
// Option Types
// =============================================================================

/// One of the four attributes that discriminate variants of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionKind {
    Size,
    Color,
    Measurement,
    Age,
}

impl OptionKind {
    /// All kinds in display order.
    pub const ALL: [Self; 4] = [Self::Size, Self::Color, Self::Measurement, Self::Age];
}

impl std::fmt::Display for OptionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Size => write!(f, "size"),
            Self::Color => write!(f, "color"),
            Self::Measurement => write!(f, "measurement"),
            Self::Age => write!(f, "age"),
        }
    }
}

/// A candidate value for one attribute, tagged with its kind.
///
/// Carrying the kind alongside the value means a color can never be
/// toggled into the size slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum OptionChoice {
    Size(String),
    Color(String),
    Measurement(Decimal),
    Age(String),
}

impl OptionChoice {
    /// The attribute this choice applies to.
    #[must_use]
    pub const fn kind(&self) -> OptionKind {
        match self {
            Self::Size(_) => OptionKind::Size,
            Self::Color(_) => OptionKind::Color,
            Self::Measurement(_) => OptionKind::Measurement,
            Self::Age(_) => OptionKind::Age,
        }
    }
}

impl std::fmt::Display for OptionChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Size(v) | Self::Color(v) | Self::Age(v) => write!(f, "{v}"),
            Self::Measurement(v) => write!(f, "{}", v.normalize()),
        }
    }
}

// =============================================================================
// Variant
// =============================================================================

/// A purchasable SKU of a product.
///
/// Variants are read-only snapshots fetched from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    /// Variant ID.
    pub id: VariantId,
    /// Current price.
    pub price: Decimal,
    /// Original price when on sale.
    #[serde(default)]
    pub old_price: Option<Decimal>,
    /// Units in stock. Zero or negative means sold out.
    #[serde(default)]
    pub inventory: i64,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub measurement: Option<Decimal>,
    #[serde(default)]
    pub age: Option<String>,
}

impl Variant {
    /// Create a variant without any discriminating attributes.
    #[must_use]
    pub const fn new(id: VariantId, price: Decimal, inventory: i64) -> Self {
        Self {
            id,
            price,
            old_price: None,
            inventory,
            size: None,
            color: None,
            measurement: None,
            age: None,
        }
    }

    /// Whether at least one unit is in stock.
    #[must_use]
    pub const fn is_in_stock(&self) -> bool {
        self.inventory > 0
    }

    /// The price this variant is compared against: `old_price`, or `price`
    /// itself when the variant is not on sale.
    #[must_use]
    pub fn compare_at_price(&self) -> Decimal {
        self.old_price.unwrap_or(self.price)
    }

    /// Whether `old_price` is strictly above `price`.
    #[must_use]
    pub fn is_discounted(&self) -> bool {
        self.old_price.is_some_and(|old| old > self.price)
    }

    /// Whole-percent discount of this variant (0 when not on sale).
    #[must_use]
    pub fn discount_percent(&self) -> u32 {
        discount_percent(self.compare_at_price(), self.price)
    }

    /// The value this variant has for `kind`, if any.
    #[must_use]
    pub fn choice(&self, kind: OptionKind) -> Option<OptionChoice> {
        match kind {
            OptionKind::Size => self.size.clone().map(OptionChoice::Size),
            OptionKind::Color => self.color.clone().map(OptionChoice::Color),
            OptionKind::Measurement => self.measurement.map(OptionChoice::Measurement),
            OptionKind::Age => self.age.clone().map(OptionChoice::Age),
        }
    }

    /// Whether this variant carries exactly the given attribute value.
    #[must_use]
    pub fn has_choice(&self, choice: &OptionChoice) -> bool {
        match choice {
            OptionChoice::Size(v) => self.size.as_ref() == Some(v),
            OptionChoice::Color(v) => self.color.as_ref() == Some(v),
            OptionChoice::Measurement(v) => self.measurement.as_ref() == Some(v),
            OptionChoice::Age(v) => self.age.as_ref() == Some(v),
        }
    }

    /// The selection that picks exactly this variant's attributes.
    #[must_use]
    pub fn selection(&self) -> Selection {
        Selection {
            size: self.size.clone(),
            color: self.color.clone(),
            measurement: self.measurement,
            age: self.age.clone(),
        }
    }

    /// Human-readable title built from the present attributes, e.g. `"M / Red"`.
    ///
    /// Returns `"Default"` for variants without attributes.
    #[must_use]
    pub fn title(&self) -> String {
        let parts: Vec<String> = OptionKind::ALL
            .iter()
            .filter_map(|kind| self.choice(*kind))
            .map(|choice| choice.to_string())
            .collect();

        if parts.is_empty() {
            "Default".to_string()
        } else {
            parts.join(" / ")
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// A catalog entry and its ordered variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Product ID.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// URL slug.
    pub slug: String,
    /// Purchasable variants in catalog order.
    #[serde(default)]
    pub variants: Vec<Variant>,
}

impl Product {
    /// Attribute combinations shared by more than one variant.
    ///
    /// Resolution picks the first variant in catalog order for such a
    /// combination, so any entry here means later duplicates are
    /// unreachable from the picker.
    #[must_use]
    pub fn duplicate_combinations(&self) -> Vec<Selection> {
        let mut seen: Vec<Selection> = Vec::with_capacity(self.variants.len());
        let mut duplicates: Vec<Selection> = Vec::new();

        for variant in &self.variants {
            let selection = variant.selection();
            if seen.contains(&selection) {
                if !duplicates.contains(&selection) {
                    duplicates.push(selection);
                }
            } else {
                seen.push(selection);
            }
        }

        duplicates
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn variant(id: i64, size: &str, color: &str) -> Variant {
        Variant {
            size: Some(size.to_string()),
            color: Some(color.to_string()),
            ..Variant::new(VariantId::new(id), Decimal::from(10), 1)
        }
    }

    #[test]
    fn test_variant_title() {
        assert_eq!(variant(1, "M", "Red").title(), "M / Red");

        let mut with_measurement = Variant::new(VariantId::new(2), Decimal::from(5), 0);
        with_measurement.measurement = Some(Decimal::new(4250, 2));
        assert_eq!(with_measurement.title(), "42.5");

        assert_eq!(Variant::new(VariantId::new(3), Decimal::ONE, 0).title(), "Default");
    }

    #[test]
    fn test_variant_discount() {
        let mut v = Variant::new(VariantId::new(1), Decimal::from(75), 3);
        assert!(!v.is_discounted());
        assert_eq!(v.compare_at_price(), Decimal::from(75));

        v.old_price = Some(Decimal::from(100));
        assert!(v.is_discounted());
        assert_eq!(v.discount_percent(), 25);
    }

    #[test]
    fn test_has_choice() {
        let v = variant(1, "M", "Red");
        assert!(v.has_choice(&OptionChoice::Size("M".to_string())));
        assert!(!v.has_choice(&OptionChoice::Size("L".to_string())));
        assert!(!v.has_choice(&OptionChoice::Age("adult".to_string())));
    }

    #[test]
    fn test_option_choice_kind() {
        assert_eq!(OptionChoice::Color("Red".to_string()).kind(), OptionKind::Color);
        assert_eq!(
            OptionChoice::Measurement(Decimal::from(42)).kind(),
            OptionKind::Measurement
        );
    }

    #[test]
    fn test_duplicate_combinations() {
        let product = Product {
            id: ProductId::new(1),
            name: "Tee".to_string(),
            slug: "tee".to_string(),
            variants: vec![
                variant(1, "M", "Red"),
                variant(2, "L", "Red"),
                variant(3, "M", "Red"),
                variant(4, "M", "Red"),
            ],
        };

        let duplicates = product.duplicate_combinations();
        assert_eq!(duplicates.len(), 1);
        assert_eq!(duplicates.first(), Some(&variant(1, "M", "Red").selection()));
    }

    #[test]
    fn test_variant_deserialize_defaults() {
        let json = r#"{"id": 5, "price": "19.90"}"#;
        let v: Variant = serde_json::from_str(json).unwrap();
        assert_eq!(v.id, VariantId::new(5));
        assert_eq!(v.inventory, 0);
        assert!(v.size.is_none());
    }
}
