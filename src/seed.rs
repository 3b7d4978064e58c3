//! Demo data for a tenant.

use chrono::Duration;
use serde::Serialize;
use tracing::info;

use crate::actions::{self, customers, invoices, products, quotes, services, suppliers, users};
use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::{
    CustomerInput, InvoiceInput, LineItemInput, ProductInput, QuoteInput, ServiceInput,
    SupplierInput, UserInput,
};
use crate::totals::Adjustment;

/// Ids of everything the seed created.
#[derive(Debug, Clone, Serialize)]
pub struct SeedReport {
    pub user_id: i32,
    pub customer_ids: Vec<i32>,
    pub supplier_id: i32,
    pub product_ids: Vec<i32>,
    pub service_id: i32,
    pub invoice_number: String,
    pub quote_number: String,
}

fn item(description: &str, quantity: f64, unit_price: f64) -> LineItemInput {
    LineItemInput {
        description: description.to_string(),
        quantity,
        unit_price,
    }
}

/// Create (or reuse) the tenant registered under `email` and fill it with
/// a small demo data set.
pub async fn run(db: &Database, email: &str, name: &str) -> Result<SeedReport> {
    let user = users::find_or_register(
        db,
        UserInput {
            name: name.to_string(),
            email: email.to_string(),
            company_name: Some(format!("{} Studio", name)),
            phone: None,
        },
    )
    .await?;
    let user_id = user.id;

    let mut customer_ids = Vec::new();
    for (name, email, address) in [
        ("Acme Corporation", "billing@acme.example", Some("1 Road Runner Way")),
        ("Globex", "ap@globex.example", None),
    ] {
        let customer = customers::create(
            db,
            user_id,
            CustomerInput {
                name: name.to_string(),
                email: email.to_string(),
                phone: None,
                address: address.map(str::to_string),
            },
        )
        .await?;
        customer_ids.push(customer.id);
    }

    let supplier = suppliers::create(
        db,
        user_id,
        SupplierInput {
            name: "Paper & Co".to_string(),
            email: "orders@paperco.example".to_string(),
            phone: None,
            address: None,
            contact_person: Some("Pat Paper".to_string()),
        },
    )
    .await?;

    let mut product_ids = Vec::new();
    for (name, sku, price, cost, stock, reorder) in [
        ("Notebook A5", "NB-A5", 6.5, 2.1, 40, 10),
        ("Fountain pen", "PEN-FT", 24.0, 9.0, 3, 5),
    ] {
        // SKUs are unique per tenant; a second run skips them.
        let sku = format!("{}-{}", sku, user_id);
        let product = products::create(
            db,
            user_id,
            ProductInput {
                name: name.to_string(),
                description: None,
                sku,
                price,
                cost,
                stock_quantity: stock,
                reorder_level: reorder,
                supplier_id: Some(supplier.id),
            },
        )
        .await;
        match product {
            Ok(product) => product_ids.push(product.id),
            Err(Error::AlreadyExists(_)) => {}
            Err(e) => return Err(e),
        }
    }

    let service = services::create(
        db,
        user_id,
        ServiceInput {
            name: "Brand consultation".to_string(),
            description: Some("One hour strategy session".to_string()),
            price: 120.0,
            duration_minutes: 60,
        },
    )
    .await?;

    let today = actions::today();
    let invoice = invoices::create(
        db,
        user_id,
        InvoiceInput {
            customer_id: customer_ids[0],
            number: None,
            issue_date: today,
            due_date: today + Duration::days(30),
            status: None,
            discount: Adjustment::percentage(10.0),
            tax: Adjustment::percentage(5.0),
            notes: Some("Thank you for your business.".to_string()),
            items: vec![item("Notebook A5", 2.0, 10.0), item("Gift wrapping", 1.0, 5.0)],
        },
    )
    .await?;

    let quote = quotes::create(
        db,
        user_id,
        QuoteInput {
            customer_id: customer_ids[1],
            number: None,
            issue_date: today,
            valid_until: today + Duration::days(14),
            status: None,
            discount: Adjustment::fixed(50.0),
            tax: Adjustment::percentage(20.0),
            notes: None,
            items: vec![
                item("Brand consultation", 3.0, 120.0),
                item("Logo design", 1.0, 800.0),
            ],
        },
    )
    .await?;

    info!(
        user_id,
        customers = customer_ids.len(),
        products = product_ids.len(),
        invoice = %invoice.invoice.number,
        quote = %quote.quote.number,
        "demo data seeded"
    );

    Ok(SeedReport {
        user_id,
        customer_ids,
        supplier_id: supplier.id,
        product_ids,
        service_id: service.id,
        invoice_number: invoice.invoice.number,
        quote_number: quote.quote.number,
    })
}
