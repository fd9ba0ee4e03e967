//! Address book commands.

use anyhow::Result;
use dialoguer::Confirm;
use petshop_commerce::api::AddressApi;
use petshop_commerce::checkout::{preferred_address, Address, AddressInput};
use petshop_commerce::AddressId;

use super::{AddressArgs, AddressCommand, AddressFields};
use crate::context::Context;

impl From<AddressFields> for AddressInput {
    fn from(f: AddressFields) -> Self {
        Self {
            recipient_name: f.name,
            phone: f.phone,
            street: f.street,
            ward: f.ward,
            district: f.district,
            city: f.city,
            is_default: f.default,
        }
    }
}

/// Run the address command.
pub async fn run(args: AddressArgs, ctx: &Context) -> Result<()> {
    let client = ctx.client()?;

    match args.command {
        AddressCommand::List => {
            let addresses = client.list_addresses().await?;
            print_addresses(&addresses, ctx);
        }
        AddressCommand::Add(fields) => {
            let address = client.create_address(&fields.into()).await?;
            report_saved("Saved", &address, ctx);
        }
        AddressCommand::Update { id, fields } => {
            let address = client
                .update_address(&AddressId::new(id), &fields.into())
                .await?;
            report_saved("Updated", &address, ctx);
        }
        AddressCommand::Delete { id, yes } => {
            if !yes && !ctx.output.is_json() {
                let confirmed = Confirm::new()
                    .with_prompt(format!("Delete address {}?", id))
                    .default(false)
                    .interact()?;
                if !confirmed {
                    ctx.output.warn("Address kept");
                    return Ok(());
                }
            }
            client.delete_address(&AddressId::new(id.as_str())).await?;
            if ctx.output.is_json() {
                ctx.output.json(&serde_json::json!({ "deleted": id }));
            } else {
                ctx.output.success(&format!("Deleted address {}", id));
            }
        }
    }

    Ok(())
}

fn report_saved(verb: &str, address: &Address, ctx: &Context) {
    if ctx.output.is_json() {
        ctx.output.json(address);
        return;
    }
    ctx.output
        .success(&format!("{} address {}", verb, address.id));
    ctx.output.kv("to", &address.recipient_name);
    ctx.output.kv("at", &address.one_line());
    if !address.is_complete() {
        ctx.output
            .warn("Address is missing a recipient, phone, street or city");
    }
}

fn print_addresses(addresses: &[Address], ctx: &Context) {
    if ctx.output.is_json() {
        ctx.output.json(&addresses);
        return;
    }

    ctx.output.header("Addresses");
    if addresses.is_empty() {
        ctx.output
            .info("No saved addresses. Add one with `petshop address add`.");
        return;
    }

    let preferred = preferred_address(addresses).map(|a| a.id.clone());
    let widths = [12, 20, 14, 40];
    ctx.output.table_row(&["ID", "RECIPIENT", "PHONE", "ADDRESS"], &widths);
    for address in addresses {
        let id = if preferred.as_ref() == Some(&address.id) {
            format!("{} *", address.id)
        } else {
            address.id.to_string()
        };
        ctx.output.table_row(
            &[&id, &address.recipient_name, &address.phone, &address.one_line()],
            &widths,
        );
    }
    ctx.output.info("* used by checkout unless --address is given");
}
