//! Cart viewing and editing commands.

use std::io::Write;
use std::num::NonZeroU32;

use zeecloths_cart::LineItem;
use zeecloths_core::{CurrencyCode, Price, Product, Variant};

use super::Session;
use crate::error::Result;

/// Print the cart, either as a table or as the stored JSON record.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn show(session: &Session, json: bool, out: &mut dyn Write) -> Result<()> {
    if json {
        serde_json::to_writer_pretty(&mut *out, session.cart.items())?;
        writeln!(out)?;
    } else {
        render(
            out,
            session.cart.items(),
            session.cart.subtotal(),
            session.currency,
        )?;
    }
    Ok(())
}

/// Add `quantity` units of `product` and print the resulting cart.
///
/// # Errors
///
/// Returns an error if the change could not be saved or printing fails.
pub fn add(
    session: &mut Session,
    product: &Product,
    variant: Variant,
    quantity: NonZeroU32,
    out: &mut dyn Write,
) -> Result<()> {
    session.cart.add_item(product, variant, quantity);
    session.ensure_persisted()?;
    show(session, false, out)
}

/// Remove the line item at `index`.
///
/// # Errors
///
/// Returns an error if `index` is out of range or the change was not saved.
pub fn remove(session: &mut Session, index: usize, out: &mut dyn Write) -> Result<()> {
    let removed = session.cart.remove_item(index)?;
    session.ensure_persisted()?;
    writeln!(out, "Removed {}", removed.name)?;
    show(session, false, out)
}

/// Set the quantity of the line item at `index`; zero or below removes it.
///
/// # Errors
///
/// Returns an error if `index` is out of range or the change was not saved.
pub fn update(session: &mut Session, index: usize, quantity: i64, out: &mut dyn Write) -> Result<()> {
    session.cart.update_quantity(index, quantity)?;
    session.ensure_persisted()?;
    show(session, false, out)
}

/// Empty the cart.
///
/// # Errors
///
/// Returns an error if the change was not saved or printing fails.
pub fn clear(session: &mut Session, out: &mut dyn Write) -> Result<()> {
    session.cart.clear();
    session.ensure_persisted()?;
    writeln!(out, "Cart cleared")?;
    Ok(())
}

/// Write a human-readable cart listing.
fn render(
    out: &mut dyn Write,
    items: &[LineItem],
    subtotal: Price,
    currency: CurrencyCode,
) -> std::io::Result<()> {
    if items.is_empty() {
        return writeln!(out, "Your cart is empty");
    }

    for (index, item) in items.iter().enumerate() {
        write!(out, "[{index}] {}", item.name)?;
        if !item.variant.is_none() {
            write!(out, " ({})", item.variant)?;
        }
        writeln!(
            out,
            " x{} @ {} = {}",
            item.quantity,
            currency.format(item.unit_price),
            currency.format(item.line_total())
        )?;
    }
    writeln!(out, "Subtotal: {}", currency.format(subtotal))
}
