//! Catalog commands.
//!
//! # Usage
//!
//! ```bash
//! vitrine product list --page 2
//! vitrine product show linen-shirt
//! vitrine product resolve linen-shirt --size M --measurement 32.5
//! ```

use rust_decimal::Decimal;
use vitrine_core::{
    OptionChoice, OptionKind, PriceSummary, Product, Selection, Variant, VariantPicker,
    format_amount, initialize_selection, is_option_available, option_values, resolve_variant,
};
use vitrine_storefront::error::AppError;
use vitrine_storefront::state::AppState;

/// Option choices given on the command line.
#[derive(Debug, Default)]
pub struct Choices {
    pub size: Option<String>,
    pub color: Option<String>,
    pub measurement: Option<Decimal>,
    pub age: Option<String>,
}

impl Choices {
    /// The selection these choices describe, or `None` if nothing was chosen.
    fn selection(self) -> Option<Selection> {
        let choices = [
            self.size.map(OptionChoice::Size),
            self.color.map(OptionChoice::Color),
            self.measurement.map(OptionChoice::Measurement),
            self.age.map(OptionChoice::Age),
        ];

        choices
            .into_iter()
            .flatten()
            .fold(None, |selection: Option<Selection>, choice| {
                Some(selection.unwrap_or_default().with(choice))
            })
    }
}

/// Show a product with its variants.
pub async fn show(state: &AppState, slug: &str) -> Result<(), AppError> {
    let product = state.api().get_product(slug).await?;
    let picker = VariantPicker::new(product.variants.clone());

    print_product_header(&product, picker.price_summary());
    for variant in picker.variants() {
        print_variant_line(variant, picker.selected_variant().map(|v| v.id) == Some(variant.id));
    }
    Ok(())
}

/// List one page of products.
pub async fn list(state: &AppState, page: u32) -> Result<(), AppError> {
    let listing = state.api().get_products(page).await?;
    print_listing(&listing.products, listing.page, listing.total_pages);
    Ok(())
}

/// Resolve a variant from the given choices and show which values remain
/// available alongside them.
///
/// With no choices the default selection (first in-stock variant) is used.
pub async fn resolve(state: &AppState, slug: &str, choices: Choices) -> Result<(), AppError> {
    let product = state.api().get_product(slug).await?;
    let selection = choices
        .selection()
        .unwrap_or_else(|| initialize_selection(&product.variants));

    for choice in OptionKind::ALL.iter().filter_map(|kind| selection.get(*kind)) {
        if option_values(&product.variants, choice.kind()).is_empty() {
            return Err(AppError::BadRequest(format!(
                "{} does not vary by {}",
                product.name,
                choice.kind()
            )));
        }
    }

    let resolved = resolve_variant(&product.variants, &selection);
    print_resolution(&product, &selection, resolved);
    Ok(())
}

// =============================================================================
// Output
// =============================================================================

#[allow(clippy::print_stdout)]
fn print_product_header(product: &Product, summary: Option<&PriceSummary>) {
    println!("{} ({})", product.name, product.slug);
    match summary {
        Some(summary) if summary.is_single_price() => {
            println!("  Price: {}", format_amount(summary.min_price));
        }
        Some(summary) => println!(
            "  Price: {} - {}",
            format_amount(summary.min_price),
            format_amount(summary.max_price)
        ),
        None => println!("  No variants"),
    }
    if let Some(summary) = summary.filter(|s| s.has_discount) {
        let prefix = if summary.all_discounted { "" } else { "up to " };
        println!("  Save {prefix}{}%", summary.max_discount_percent);
    }
}

#[allow(clippy::print_stdout)]
fn print_variant_line(variant: &Variant, selected: bool) {
    let marker = if selected { "*" } else { " " };
    let stock = if variant.is_in_stock() {
        format!("{} in stock", variant.inventory)
    } else {
        "sold out".to_string()
    };
    let sale = if variant.is_discounted() {
        format!(
            " (was {}, -{}%)",
            format_amount(variant.compare_at_price()),
            variant.discount_percent()
        )
    } else {
        String::new()
    };
    println!(
        " {marker} {:<8} {:<24} {:>10}{sale}  {stock}",
        format!("#{}", variant.id),
        variant.title(),
        format_amount(variant.price)
    );
}

#[allow(clippy::print_stdout)]
fn print_listing(products: &[Product], page: u32, total_pages: u32) {
    for product in products {
        let from = product.variants.iter().map(|v| v.price).min();
        match from {
            Some(price) => println!("{:<32} from {}", product.slug, format_amount(price)),
            None => println!("{:<32} -", product.slug),
        }
    }
    println!("Page {page} of {total_pages}");
}

#[allow(clippy::print_stdout)]
fn print_resolution(product: &Product, selection: &Selection, resolved: Option<&Variant>) {
    match resolved {
        Some(variant) => print_variant_line(variant, true),
        None => println!("No variant matches this selection"),
    }

    for kind in OptionKind::ALL {
        let values = option_values(&product.variants, kind);
        if values.is_empty() {
            continue;
        }
        let rendered: Vec<String> = values
            .iter()
            .map(|choice| {
                let mut label = choice.to_string();
                if selection.is_selected(choice) {
                    label = format!("[{label}]");
                }
                if !is_option_available(choice, &product.variants, selection) {
                    label.push_str(" (unavailable)");
                }
                label
            })
            .collect();
        println!("  {kind}: {}", rendered.join(", "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choices_to_selection() {
        assert!(Choices::default().selection().is_none());

        let selection = Choices {
            size: Some("M".to_string()),
            measurement: Some(Decimal::new(325, 1)),
            ..Choices::default()
        }
        .selection();

        let selection = selection.unwrap_or_default();
        assert_eq!(selection.size.as_deref(), Some("M"));
        assert_eq!(selection.measurement, Some(Decimal::new(325, 1)));
        assert!(selection.color.is_none());
    }
}
