//! Interactive checkout.

use std::collections::BTreeSet;

use anyhow::{anyhow, bail, Result};
use dialoguer::{Confirm, MultiSelect, Select};
use petshop_commerce::cart::SelectionPayload;
use petshop_commerce::checkout::{
    CheckoutOutcome, CheckoutServices, CheckoutSession, CheckoutSummary, PaymentMethod,
};
use petshop_commerce::{AddressId, ErrorKind, LineItemId};
use serde_json::json;

use super::CheckoutArgs;
use crate::context::Context;
use crate::output::{money, state_badge};

/// Run the checkout command.
pub async fn run(args: CheckoutArgs, ctx: &Context) -> Result<()> {
    let interactive = !args.yes && !ctx.output.is_json();
    let payment_method: PaymentMethod = args.payment.parse().map_err(|e: String| anyhow!(e))?;

    let client = ctx.client()?;
    let customer = client.current_user()?;

    let payload = if args.items.is_empty() {
        None
    } else {
        Some(SelectionPayload::new(args.items.iter().map(String::as_str)))
    };
    let mut session = CheckoutSession::new(CheckoutServices::from_shared(client), customer, payload)
        .with_rates(ctx.shipping_rates());

    ctx.output.step(1, 3, "Loading cart and addresses");
    let spinner = ctx.output.spinner("Loading...");
    let loaded = session.load().await;
    spinner.finish_and_clear();
    loaded?;

    if args.all {
        session.select_all()?;
    } else if args.items.is_empty() && interactive {
        choose_items(&mut session)?;
    }
    let missing = missing_items(&args.items, session.selection().len());
    if missing > 0 {
        ctx.output.warn(&format!(
            "{} of the requested items are no longer in the cart",
            missing
        ));
    }

    match &args.address {
        Some(id) => session.select_address(&AddressId::new(id.as_str()))?,
        None if interactive && session.addresses().len() > 1 => choose_address(&mut session)?,
        None => {}
    }
    session.set_payment_method(payment_method)?;
    if let Some(note) = &args.note {
        session.set_note(note.as_str())?;
    }

    // Surface guard failures before asking for confirmation.
    session.build_submission()?;
    let summary = session.summary()?;

    ctx.output.step(2, 3, "Review order");
    print_review(&session, &summary, ctx);

    if interactive {
        let confirmed = Confirm::new()
            .with_prompt(format!("Place order for {}?", summary.total))
            .default(true)
            .interact()?;
        if !confirmed {
            ctx.output.warn("Checkout cancelled");
            return Ok(());
        }
    }

    ctx.output.step(3, 3, "Placing order");
    let outcome = loop {
        let spinner = ctx.output.spinner("Submitting...");
        let result = session.submit().await;
        spinner.finish_and_clear();

        match result {
            Ok(outcome) => break outcome,
            Err(e) if interactive && e.kind() == ErrorKind::Network => {
                ctx.output.error(&e.to_string());
                ctx.output
                    .debug(&format!("attempt key {}", session.idempotency_key()));
                let retry = Confirm::new()
                    .with_prompt("Try again?")
                    .default(true)
                    .interact()?;
                if !retry {
                    bail!("Checkout {}", session.state().as_str());
                }
            }
            Err(e) => return Err(e.into()),
        }
    };

    report_outcome(&outcome, &summary, session.state().as_str(), ctx);
    Ok(())
}

/// Requested ids that did not survive the restore. Duplicates count once.
fn missing_items(requested: &[String], selected: usize) -> usize {
    let distinct: BTreeSet<&str> = requested.iter().map(String::as_str).collect();
    distinct.len().saturating_sub(selected)
}

fn choose_items(session: &mut CheckoutSession) -> Result<()> {
    let Some(cart) = session.cart() else {
        return Ok(());
    };
    if cart.is_empty() {
        bail!("Your cart is empty");
    }

    let labels: Vec<String> = cart
        .items
        .iter()
        .map(|l| format!("{} x{} ({})  {}", l.product_name, l.quantity, l.store_name, l.unit_price))
        .collect();
    let ids: Vec<LineItemId> = cart.items.iter().map(|l| l.id.clone()).collect();
    let defaults: Vec<bool> = ids.iter().map(|id| session.selection().contains(id)).collect();

    let chosen = MultiSelect::new()
        .with_prompt("Items to check out (space to toggle)")
        .items(&labels)
        .defaults(&defaults)
        .interact()?;

    session.clear_selection()?;
    for index in chosen {
        if let Some(id) = ids.get(index) {
            session.toggle_item(id)?;
        }
    }
    Ok(())
}

fn choose_address(session: &mut CheckoutSession) -> Result<()> {
    let labels: Vec<String> = session
        .addresses()
        .iter()
        .map(|a| format!("{}, {}", a.recipient_name, a.one_line()))
        .collect();
    let current = session
        .selected_address()
        .and_then(|sel| session.addresses().iter().position(|a| a.id == sel.id))
        .unwrap_or(0);

    let index = Select::new()
        .with_prompt("Deliver to")
        .items(&labels)
        .default(current)
        .interact()?;

    let id = session.addresses().get(index).map(|a| a.id.clone());
    if let Some(id) = id {
        session.select_address(&id)?;
    }
    Ok(())
}

fn print_review(session: &CheckoutSession, summary: &CheckoutSummary, ctx: &Context) {
    if ctx.output.is_json() {
        return;
    }

    ctx.output.header("Items");
    for line in session.selected_items() {
        let total = line
            .line_total()
            .map(|m| m.to_string())
            .unwrap_or_else(|_| "overflow".to_string());
        ctx.output
            .list_item(&format!("{} x{}  {}", line.product_name, line.quantity, total));
    }

    if let Some(address) = session.selected_address() {
        ctx.output.kv("deliver to", &address.recipient_name);
        ctx.output.kv("address", &address.one_line());
    }
    ctx.output.kv("payment", session.payment_method().display_name());
    if !session.note().is_empty() {
        ctx.output.kv("note", session.note());
    }
    ctx.output.kv("subtotal", &summary.subtotal.to_string());
    ctx.output.kv("shipping", &summary.shipping_fee.to_string());
    ctx.output.kv("total", &money(summary.total));
}

fn report_outcome(outcome: &CheckoutOutcome, summary: &CheckoutSummary, state: &str, ctx: &Context) {
    let order = outcome.order();

    if ctx.output.is_json() {
        let payment_url = match outcome {
            CheckoutOutcome::RedirectToPayment { payment_url, .. } => Some(payment_url.as_str()),
            CheckoutOutcome::Confirmed { .. } => None,
        };
        ctx.output.json(&json!({
            "orderId": order.id,
            "price": order.price,
            "summary": summary,
            "paymentUrl": payment_url,
        }));
        return;
    }

    ctx.output.success(&format!("Order {} placed", order.id));
    ctx.output.kv("checkout", &state_badge(state));
    ctx.output.kv("charged", &money(order.price));
    match outcome {
        CheckoutOutcome::Confirmed { .. } => {
            ctx.output.info("Pay the courier on delivery.");
        }
        CheckoutOutcome::RedirectToPayment { payment_url, .. } => {
            ctx.output.info("Complete the payment at:");
            println!("  {}", payment_url);
        }
    }
}
