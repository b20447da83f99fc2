//! Cart commands.
//!
//! Each command loads the cart first so local updates apply to the current
//! contents, then prints the cart as the backend returned it.

use vitrine_core::{CartItemId, VariantId, format_amount};
use vitrine_storefront::api::{Cart, CompletePayload, Order};
use vitrine_storefront::error::AppError;
use vitrine_storefront::state::AppState;

pub async fn show(state: &AppState) -> Result<(), AppError> {
    let cart = state.cart().load().await?;
    print_cart(&cart);
    Ok(())
}

pub async fn add(state: &AppState, variant: &str, quantity: i64) -> Result<(), AppError> {
    let variant_id: VariantId = variant.parse()?;
    let sync = state.cart();
    sync.load().await?;

    if let Some(item) = sync.item_for_variant(variant_id) {
        tracing::info!(
            item_id = %item.id,
            quantity = item.quantity,
            "Variant already in cart; increasing quantity"
        );
    }

    let cart = sync.add_to_cart(variant_id, quantity).await?;
    print_cart(&cart);
    Ok(())
}

pub async fn set_quantity(state: &AppState, item: &str, quantity: i64) -> Result<(), AppError> {
    let item_id: CartItemId = item.parse()?;
    let sync = state.cart();
    let current = sync.load().await?;
    if current.item(item_id).is_none() {
        return Err(AppError::NotFound(format!("cart item {item_id}")));
    }

    let cart = sync.change_quantity(item_id, quantity).await?;
    print_cart(&cart);
    Ok(())
}

pub async fn remove(state: &AppState, item: &str) -> Result<(), AppError> {
    let item_id: CartItemId = item.parse()?;
    let sync = state.cart();
    sync.load().await?;

    let cart = sync.delete_cart_item(item_id).await?;
    print_cart(&cart);
    Ok(())
}

/// Apply `code`, or remove the applied coupon when `None`.
pub async fn coupon(state: &AppState, code: Option<&str>) -> Result<(), AppError> {
    let sync = state.cart();
    sync.load().await?;

    let cart = match code {
        Some(code) if code.trim().is_empty() => {
            return Err(AppError::BadRequest("coupon code is empty".to_string()));
        }
        Some(code) => sync.apply_coupon(code).await?,
        None => sync.remove_coupon().await?,
    };
    print_cart(&cart);
    Ok(())
}

pub async fn wallet(state: &AppState, remove: bool) -> Result<(), AppError> {
    let sync = state.cart();
    sync.load().await?;

    let cart = if remove {
        sync.remove_wallet_credit().await?
    } else {
        sync.apply_wallet_credit().await?
    };
    print_cart(&cart);
    Ok(())
}

pub async fn checkout(
    state: &AppState,
    payment_method: String,
    note: Option<String>,
) -> Result<(), AppError> {
    let sync = state.cart();
    let cart = sync.load().await?;
    if cart.is_empty() {
        return Err(AppError::BadRequest("cart is empty".to_string()));
    }

    let order = sync
        .complete_cart(CompletePayload {
            payment_method,
            note,
        })
        .await?;
    print_order(&order);
    Ok(())
}

// =============================================================================
// Output
// =============================================================================

#[allow(clippy::print_stdout)]
fn print_cart(cart: &Cart) {
    if cart.is_empty() {
        println!("Cart is empty");
        return;
    }

    for item in &cart.items {
        let title = item
            .variant_title
            .as_deref()
            .map_or_else(|| item.name.clone(), |t| format!("{} ({t})", item.name));
        println!(
            "{:<8} {:<36} {:>4} x {:>10} = {:>10}",
            format!("#{}", item.id),
            title,
            item.quantity,
            format_amount(item.price),
            format_amount(item.line_total())
        );
    }

    println!("Subtotal: {}", format_amount(cart.subtotal));
    if let Some(code) = &cart.coupon_code {
        println!("Coupon {code}: -{}", format_amount(cart.discount_total));
    }
    if cart.has_wallet_credit() {
        println!("Wallet credit: -{}", format_amount(cart.wallet_credit));
    }
    println!("Total: {}", format_amount(cart.total));
}

#[allow(clippy::print_stdout)]
fn print_order(order: &Order) {
    let number = order
        .number
        .clone()
        .unwrap_or_else(|| order.id.to_string());
    println!(
        "Order {number} placed ({}), total {}",
        order.status,
        format_amount(order.total)
    );
}
