//! Integration tests for variant picking over catalog payloads.

#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;
use serde_json::json;
use vitrine_core::{OptionChoice, OptionKind, Product, VariantId, VariantPicker};
use vitrine_storefront::api::ProductPage;

fn shirt() -> Product {
    serde_json::from_value(json!({
        "id": 1,
        "name": "Linen Shirt",
        "slug": "linen-shirt",
        "variants": [
            { "id": 11, "price": "100", "old_price": "150", "inventory": 0, "size": "S", "color": "White" },
            { "id": 12, "price": "100", "old_price": "150", "inventory": 4, "size": "M", "color": "White" },
            { "id": 13, "price": "200", "old_price": "200", "inventory": 2, "size": "M", "color": "Blue" },
            { "id": 14, "price": "200", "inventory": 0, "size": "L", "color": "Blue" }
        ]
    }))
    .unwrap()
}

fn size(v: &str) -> OptionChoice {
    OptionChoice::Size(v.to_string())
}

fn color(v: &str) -> OptionChoice {
    OptionChoice::Color(v.to_string())
}

fn selected_id(picker: &VariantPicker) -> Option<VariantId> {
    picker.selected_variant().map(|v| v.id)
}

#[test]
fn test_picker_opens_on_first_in_stock_variant() {
    let picker = VariantPicker::new(shirt().variants);

    assert_eq!(selected_id(&picker), Some(VariantId::new(12)));
    assert_eq!(picker.selection().size.as_deref(), Some("M"));
    assert_eq!(picker.selection().color.as_deref(), Some("White"));
    assert!(picker.can_purchase());
}

#[test]
fn test_price_summary_from_catalog_payload() {
    let picker = VariantPicker::new(shirt().variants);
    let summary = picker.price_summary().unwrap();

    assert_eq!(summary.min_price, Decimal::from(100));
    assert_eq!(summary.max_price, Decimal::from(200));
    assert_eq!(summary.max_compare_at_price, Decimal::from(200));
    assert!(summary.has_discount);
    assert!(!summary.all_discounted);
    assert_eq!(summary.max_discount_percent, 50);
    assert!(!summary.is_single_price());
}

#[test]
fn test_switching_color_resolves_matching_variant() {
    let mut picker = VariantPicker::new(shirt().variants);

    // M/White -> M/Blue
    let resolved = picker.toggle(&color("Blue")).map(|v| v.id);
    assert_eq!(resolved, Some(VariantId::new(13)));
    assert!(picker.can_purchase());

    // Only M is in stock in blue
    assert!(picker.is_available(&size("M")));
    assert!(!picker.is_available(&size("L")));
    assert!(!picker.is_available(&size("S")));
}

#[test]
fn test_sold_out_combination_is_resolved_but_not_purchasable() {
    let mut picker = VariantPicker::new(shirt().variants);

    picker.toggle(&size("S"));
    assert_eq!(selected_id(&picker), Some(VariantId::new(11)));
    assert!(!picker.can_purchase());
}

#[test]
fn test_toggle_twice_restores_selection() {
    let mut picker = VariantPicker::new(shirt().variants);
    let before = picker.selection().clone();

    picker.toggle(&color("White"));
    assert!(picker.selection().color.is_none());
    assert!(!picker.can_purchase());

    picker.toggle(&color("White"));
    assert_eq!(picker.selection(), &before);
    assert_eq!(selected_id(&picker), Some(VariantId::new(12)));
}

#[test]
fn test_clearing_every_option_falls_back_to_first_in_stock() {
    let mut picker = VariantPicker::new(shirt().variants);

    picker.toggle(&size("M"));
    picker.toggle(&color("White"));

    assert!(picker.selection().is_empty());
    assert_eq!(selected_id(&picker), Some(VariantId::new(12)));
}

#[test]
fn test_option_values_keep_catalog_order() {
    let picker = VariantPicker::new(shirt().variants);

    assert_eq!(
        picker.values(OptionKind::Size),
        vec![size("S"), size("M"), size("L")]
    );
    assert_eq!(
        picker.values(OptionKind::Color),
        vec![color("White"), color("Blue")]
    );
    assert!(picker.values(OptionKind::Age).is_empty());
}

#[test]
fn test_single_variant_product_ignores_selection() {
    let product: Product = serde_json::from_value(json!({
        "id": 2,
        "name": "Gift Card",
        "slug": "gift-card",
        "variants": [{ "id": 21, "price": "50", "inventory": 0 }]
    }))
    .unwrap();
    let mut picker = VariantPicker::new(product.variants);

    picker.toggle(&size("XL"));
    assert_eq!(selected_id(&picker), Some(VariantId::new(21)));
    assert!(picker.is_out_of_stock());
    assert!(!picker.can_purchase());
    assert!(picker.price_summary().unwrap().is_single_price());
}

#[test]
fn test_measurement_choices_compare_numerically() {
    let product: Product = serde_json::from_value(json!({
        "id": 3,
        "name": "Ring",
        "slug": "ring",
        "variants": [
            { "id": 31, "price": "80", "inventory": 1, "measurement": "16.5" },
            { "id": 32, "price": "80", "inventory": 1, "measurement": "17.50" }
        ]
    }))
    .unwrap();
    let mut picker = VariantPicker::new(product.variants);

    let resolved = picker
        .toggle(&OptionChoice::Measurement(Decimal::new(175, 1)))
        .map(|v| v.id);
    assert_eq!(resolved, Some(VariantId::new(32)));
}

#[test]
fn test_product_without_variants() {
    let product: Product = serde_json::from_value(json!({
        "id": 4,
        "name": "Coming Soon",
        "slug": "coming-soon"
    }))
    .unwrap();
    let picker = VariantPicker::new(product.variants);

    assert!(picker.selected_variant().is_none());
    assert!(picker.price_summary().is_none());
    assert!(picker.is_out_of_stock());
    assert!(!picker.can_purchase());
}

#[test]
fn test_product_page_payload() {
    let page: ProductPage = serde_json::from_value(json!({
        "products": [
            { "id": 1, "name": "Linen Shirt", "slug": "linen-shirt", "variants": [] }
        ],
        "page": 1,
        "total_pages": 3
    }))
    .unwrap();

    assert_eq!(page.products.len(), 1);
    assert!(page.has_next_page());
}
