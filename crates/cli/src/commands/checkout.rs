//! Checkout command.
//!
//! Submitting an order means handing the order request to the order service.
//! This tool has no HTTP client, so the request JSON is written to a file or
//! to the output stream for another process to deliver. Once the write
//! succeeds the order counts as submitted and the cart is cleared.

use std::fs;
use std::io::Write;
use std::path::Path;

use tracing::info;
use zeecloths_cart::{CheckoutDetails, OrderRequest};

use super::Session;
use crate::error::{CliError, Result};

/// Submit the cart as an order.
///
/// With `keep`, the request is written but the cart is left as it is.
///
/// # Errors
///
/// Returns [`CliError::EmptyCart`] if there is nothing to order, or an error
/// if the request cannot be written or the cleared cart cannot be saved.
pub fn run(
    session: &mut Session,
    details: CheckoutDetails,
    target: Option<&Path>,
    keep: bool,
    out: &mut dyn Write,
) -> Result<()> {
    if keep {
        let snapshot = session.cart.snapshot();
        if snapshot.is_empty() {
            return Err(CliError::EmptyCart);
        }
        write_request(&snapshot.order_request(details), target, out)?;
        info!("Order request written, cart kept");
        return Ok(());
    }

    session
        .cart
        .checkout(details, |request| -> Result<()> {
            write_request(request, target, &mut *out)?;
            info!(
                lines = request.items.len(),
                total = %request.total_amount,
                "Order submitted"
            );
            Ok(())
        })
        .map_err(CliError::from)?;

    session.ensure_persisted()
}

fn write_request(request: &OrderRequest, target: Option<&Path>, out: &mut dyn Write) -> Result<()> {
    let json = serde_json::to_string_pretty(request)?;
    match target {
        Some(path) => fs::write(path, json)?,
        None => writeln!(out, "{json}")?,
    }
    Ok(())
}
