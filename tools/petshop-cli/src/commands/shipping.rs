//! Shipping fee quote.

use anyhow::{bail, Result};
use petshop_commerce::api::{AddressApi, CartApi};
use petshop_commerce::cart::{Cart, CartLineItem};
use petshop_commerce::checkout::preferred_address;
use petshop_commerce::{AddressId, LineItemId, Money};
use serde_json::json;

use super::ShippingFeeArgs;
use crate::context::Context;
use crate::output::money;

/// Run the shipping-fee command.
///
/// `--city` and `--units` quote offline. Anything else reads the saved
/// addresses or the cart.
pub async fn run(args: ShippingFeeArgs, ctx: &Context) -> Result<()> {
    let rates = ctx.shipping_rates();

    let city = match (&args.city, &args.address) {
        (Some(city), _) => city.clone(),
        (None, address_id) => {
            let client = ctx.client()?;
            let addresses = client.list_addresses().await?;
            let address = match address_id {
                Some(id) => {
                    let id = AddressId::new(id.as_str());
                    addresses.iter().find(|a| a.id == id)
                }
                None => preferred_address(&addresses),
            };
            match address {
                Some(a) => a.city.clone(),
                None => bail!("No delivery address; pass --city or --address"),
            }
        }
    };

    let units = match args.units {
        Some(units) => units,
        None => {
            let client = ctx.client()?;
            let user = client.current_user()?;
            let cart = client.fetch_cart(&user).await?;
            selected_units(&cart, &args.items)?
        }
    };

    let fee = rates.fee_for_units(&city, units);
    report(&city, units, rates.base_fee(&city), fee, ctx);
    Ok(())
}

/// Units among the named line items, or the whole cart when none are named.
fn selected_units(cart: &Cart, items: &[String]) -> Result<u64> {
    let chosen: Vec<&CartLineItem> = if items.is_empty() {
        cart.items.iter().collect()
    } else {
        let mut chosen = Vec::with_capacity(items.len());
        for raw in items {
            let id = LineItemId::new(raw.as_str());
            match cart.get_item(&id) {
                Some(line) => chosen.push(line),
                None => bail!("Line item {} is not in the cart", raw),
            }
        }
        chosen
    };

    Ok(chosen
        .iter()
        .map(|l| u64::try_from(l.quantity).unwrap_or(0))
        .sum())
}

fn report(city: &str, units: u64, base: Money, fee: Money, ctx: &Context) {
    if ctx.output.is_json() {
        ctx.output.json(&json!({
            "city": city,
            "units": units,
            "baseFee": base,
            "shippingFee": fee,
        }));
        return;
    }

    ctx.output.header("Shipping fee");
    ctx.output.kv("city", city);
    ctx.output.kv("units", &units.to_string());
    if units == 0 {
        ctx.output.kv("fee", &money(fee));
        ctx.output.info("Nothing to ship");
        return;
    }
    ctx.output.kv("base", &base.to_string());
    ctx.output.kv("fee", &money(fee));
}
