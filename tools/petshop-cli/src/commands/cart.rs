//! Cart commands.

use anyhow::Result;
use dialoguer::Confirm;
use petshop_commerce::cart::{Cart, CartBadge, CartStore, NewLineItem};
use petshop_commerce::LineItemId;

use super::{CartArgs, CartCommand};
use crate::context::Context;
use crate::output::money;

/// Run the cart command.
pub async fn run(args: CartArgs, ctx: &Context) -> Result<()> {
    let store = open_store(ctx)?;

    match args.command {
        CartCommand::Show => {
            let cart = store.fetch_cart().await?;
            print_cart(&cart, ctx);
        }
        CartCommand::Add { variant, quantity } => {
            let cart = store.add_item(NewLineItem::new(variant.as_str(), quantity)).await?;
            ctx.output
                .success(&format!("Added {} x {}", quantity, variant));
            print_cart(&cart, ctx);
        }
        CartCommand::Update { item, quantity } => {
            let cart = store
                .update_item_quantity(&LineItemId::new(item.as_str()), quantity)
                .await?;
            report_quantity(&cart, &item, quantity, ctx);
            print_cart(&cart, ctx);
        }
        CartCommand::Remove { item } => {
            // Prime the snapshot so the badge can drop the removed quantity.
            store.fetch_cart().await?;
            let cart = store.remove_item(&LineItemId::new(item.as_str())).await?;
            ctx.output.success(&format!("Removed {}", item));
            print_cart(&cart, ctx);
        }
        CartCommand::Clear { yes } => {
            if !yes && !ctx.output.is_json() {
                let confirmed = Confirm::new()
                    .with_prompt("Remove every item from the cart?")
                    .default(false)
                    .interact()?;
                if !confirmed {
                    ctx.output.warn("Cart left unchanged");
                    return Ok(());
                }
            }
            let cart = store.clear_cart().await?;
            ctx.output.success("Cart cleared");
            print_cart(&cart, ctx);
        }
    }

    Ok(())
}

/// Cart store for the signed-in customer. An anonymous session gets a store
/// that refuses every operation with an auth error.
fn open_store(ctx: &Context) -> Result<CartStore> {
    let client = ctx.client()?;
    let user = client.current_user().ok();
    Ok(CartStore::new(client, CartBadge::new(), user))
}

fn report_quantity(cart: &Cart, item: &str, requested: i64, ctx: &Context) {
    match cart.get_item(&LineItemId::new(item)) {
        Some(line) if line.quantity != requested => ctx.output.warn(&format!(
            "Quantity of {} is {} (requested {}); the store adjusted it",
            line.product_name, line.quantity, requested
        )),
        Some(line) => ctx
            .output
            .success(&format!("{} now x {}", line.product_name, line.quantity)),
        None => ctx.output.warn(&format!("{} is no longer in the cart", item)),
    }
}

fn print_cart(cart: &Cart, ctx: &Context) {
    if ctx.output.is_json() {
        ctx.output.json(cart);
        return;
    }

    ctx.output.header(&format!("Cart ({} items)", cart.item_count()));
    if cart.is_empty() {
        ctx.output.info("Your cart is empty");
        return;
    }

    let widths = [12, 28, 20, 5, 14];
    ctx.output
        .table_row(&["ID", "PRODUCT", "OPTIONS", "QTY", "LINE TOTAL"], &widths);
    for line in &cart.items {
        let options = line.attributes.display();
        let line_total = line
            .line_total()
            .map(|m| m.to_string())
            .unwrap_or_else(|_| "overflow".to_string());
        ctx.output.table_row(
            &[
                line.id.as_str(),
                &line.product_name,
                &options,
                &line.quantity.to_string(),
                &line_total,
            ],
            &widths,
        );
    }

    match cart.total() {
        Ok(total) => ctx.output.kv("total", &money(total)),
        Err(e) => ctx.output.warn(&e.to_string()),
    }
}
