//! Actions run against a throwaway Postgres database per test.
//!
//! `sqlx::test` creates the database from `DATABASE_URL`, applies
//! `migrations/` and drops it afterwards.

use chrono::{NaiveDate, NaiveDateTime};
use sqlx::PgPool;

use ledgerly::actions::{appointments, blogs, customers, invoices, products, quotes, transactions, users};
use ledgerly::db::Database;
use ledgerly::models::{
    AppointmentInput, BlogInput, CustomerInput, InvoiceInput, InvoiceStatus, LineItemInput,
    ProductInput, QuoteInput, QuoteStatus, StockAdjustment, TransactionKind, UserInput,
};
use ledgerly::totals::Adjustment;
use ledgerly::Error;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn at(d: u32, h: u32, min: u32) -> NaiveDateTime {
    date(2024, 9, d).and_hms_opt(h, min, 0).unwrap()
}

fn item(description: &str, quantity: f64, unit_price: f64) -> LineItemInput {
    LineItemInput {
        description: description.to_string(),
        quantity,
        unit_price,
    }
}

async fn tenant(db: &Database, email: &str) -> (i32, i32) {
    let user = users::register(
        db,
        UserInput {
            name: "Owner".into(),
            email: email.into(),
            company_name: None,
            phone: None,
        },
    )
    .await
    .unwrap();
    let customer = customers::create(
        db,
        user.id,
        CustomerInput {
            name: "Acme".into(),
            email: "billing@acme.io".into(),
            phone: None,
            address: None,
        },
    )
    .await
    .unwrap();
    (user.id, customer.id)
}

fn invoice_input(customer_id: i32, due_date: NaiveDate, status: InvoiceStatus) -> InvoiceInput {
    InvoiceInput {
        customer_id,
        number: None,
        issue_date: date(2024, 9, 1),
        due_date,
        status: Some(status),
        discount: Adjustment::none(),
        tax: Adjustment::percentage(10.0),
        notes: None,
        items: vec![item("Design", 2.0, 50.0)],
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn paying_records_a_linked_income_transaction(pool: PgPool) {
    let db = Database::from_pool(pool);
    let (user_id, customer_id) = tenant(&db, "owner@ledgerly.test").await;
    let created = invoices::create(&db, user_id, invoice_input(customer_id, date(2024, 9, 30), InvoiceStatus::Sent))
        .await
        .unwrap();
    let id = created.invoice.id;

    let (invoice, transaction) = invoices::mark_paid(&db, user_id, id, Some(date(2024, 9, 12)))
        .await
        .unwrap();
    assert_eq!(invoice.status, InvoiceStatus::Paid);
    assert_eq!(transaction.kind, TransactionKind::Income);
    assert_eq!(transaction.invoice_id, Some(id));
    assert_eq!(transaction.occurred_on, date(2024, 9, 12));
    assert!((transaction.amount - 110.0).abs() < 1e-9);

    let again = invoices::mark_paid(&db, user_id, id, None).await;
    assert!(matches!(again, Err(Error::Conflict(_))));

    let ledger = transactions::list(&db, user_id, None, None).await.unwrap();
    assert_eq!(ledger.len(), 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn concurrent_payments_book_income_once(pool: PgPool) {
    let db = Database::from_pool(pool);
    let (user_id, customer_id) = tenant(&db, "owner@ledgerly.test").await;
    let id = invoices::create(&db, user_id, invoice_input(customer_id, date(2024, 9, 30), InvoiceStatus::Sent))
        .await
        .unwrap()
        .invoice
        .id;

    let (first, second) = tokio::join!(
        invoices::mark_paid(&db, user_id, id, None),
        invoices::mark_paid(&db, user_id, id, None),
    );
    assert_eq!([first.is_ok(), second.is_ok()].iter().filter(|ok| **ok).count(), 1);
    let failure = if first.is_err() { first } else { second };
    assert!(matches!(failure, Err(Error::Conflict(_))));

    let ledger = transactions::list(&db, user_id, None, None).await.unwrap();
    assert_eq!(ledger.len(), 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn paid_invoices_cannot_be_edited(pool: PgPool) {
    let db = Database::from_pool(pool);
    let (user_id, customer_id) = tenant(&db, "owner@ledgerly.test").await;
    let id = invoices::create(&db, user_id, invoice_input(customer_id, date(2024, 9, 30), InvoiceStatus::Sent))
        .await
        .unwrap()
        .invoice
        .id;

    let mut bigger = invoice_input(customer_id, date(2024, 9, 30), InvoiceStatus::Sent);
    bigger.items.push(item("Hosting", 1.0, 400.0));

    let (updated, paid) = tokio::join!(
        invoices::update(&db, user_id, id, bigger.clone()),
        invoices::mark_paid(&db, user_id, id, None),
    );
    let (invoice, transaction) = paid.unwrap();
    if let Err(err) = updated {
        assert!(matches!(err, Error::Conflict(_)), "unexpected error: {}", err);
    }

    // Whichever write won, the ledger matches what the invoice says was paid.
    let stored = invoices::get(&db, user_id, id).await.unwrap();
    assert_eq!(stored.invoice.status, InvoiceStatus::Paid);
    assert!((stored.invoice.total - transaction.amount).abs() < 1e-9);
    assert!((invoice.total - transaction.amount).abs() < 1e-9);

    let late = invoices::update(&db, user_id, id, bigger).await;
    assert!(matches!(late, Err(Error::Conflict(_))));
}

#[sqlx::test(migrations = "./migrations")]
async fn overdue_sweep_only_moves_sent_invoices(pool: PgPool) {
    let db = Database::from_pool(pool);
    let (user_id, customer_id) = tenant(&db, "owner@ledgerly.test").await;
    let past_due = date(2024, 9, 10);

    let sent = invoices::create(&db, user_id, invoice_input(customer_id, past_due, InvoiceStatus::Sent))
        .await
        .unwrap();
    let draft = invoices::create(&db, user_id, invoice_input(customer_id, past_due, InvoiceStatus::Draft))
        .await
        .unwrap();
    let not_yet_due = invoices::create(&db, user_id, invoice_input(customer_id, date(2024, 9, 20), InvoiceStatus::Sent))
        .await
        .unwrap();

    let flagged = invoices::sweep_overdue(&db, user_id, date(2024, 9, 15)).await.unwrap();
    assert_eq!(flagged.len(), 1);
    assert_eq!(flagged[0].id, sent.invoice.id);
    assert_eq!(flagged[0].status, InvoiceStatus::Overdue);

    let draft = invoices::get(&db, user_id, draft.invoice.id).await.unwrap();
    assert_eq!(draft.invoice.status, InvoiceStatus::Draft);
    let not_yet_due = invoices::get(&db, user_id, not_yet_due.invoice.id).await.unwrap();
    assert_eq!(not_yet_due.invoice.status, InvoiceStatus::Sent);

    let second_run = invoices::sweep_overdue(&db, user_id, date(2024, 9, 15)).await.unwrap();
    assert!(second_run.is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn stock_never_goes_below_zero(pool: PgPool) {
    let db = Database::from_pool(pool);
    let (user_id, _) = tenant(&db, "owner@ledgerly.test").await;
    let product = products::create(
        &db,
        user_id,
        ProductInput {
            name: "Widget".into(),
            description: None,
            sku: "WID-1".into(),
            price: 9.5,
            cost: 4.0,
            stock_quantity: 3,
            reorder_level: 1,
            supplier_id: None,
        },
    )
    .await
    .unwrap();

    let taken = products::adjust_stock(&db, user_id, product.id, StockAdjustment { delta: -3, reason: None })
        .await
        .unwrap();
    assert_eq!(taken.stock_quantity, 0);

    let overdrawn = products::adjust_stock(&db, user_id, product.id, StockAdjustment { delta: -1, reason: None }).await;
    assert!(matches!(overdrawn, Err(Error::Conflict(_))));

    let restocked = products::adjust_stock(&db, user_id, product.id, StockAdjustment { delta: 5, reason: Some("delivery".into()) })
        .await
        .unwrap();
    assert_eq!(restocked.stock_quantity, 5);
}

#[sqlx::test(migrations = "./migrations")]
async fn appointments_overlap_as_half_open_intervals(pool: PgPool) {
    let db = Database::from_pool(pool);
    let (user_id, customer_id) = tenant(&db, "owner@ledgerly.test").await;
    let booking = |title: &str, starts_at, ends_at| AppointmentInput {
        customer_id,
        service_id: None,
        title: title.to_string(),
        starts_at,
        ends_at,
        status: None,
        notes: None,
    };

    appointments::create(&db, user_id, booking("Kickoff", at(2, 9, 0), at(2, 10, 0)))
        .await
        .unwrap();
    appointments::create(&db, user_id, booking("Review", at(2, 10, 0), at(2, 11, 0)))
        .await
        .expect("back-to-back slots do not collide");

    let clash = appointments::create(&db, user_id, booking("Overlap", at(2, 10, 30), at(2, 11, 30))).await;
    assert!(matches!(clash, Err(Error::Conflict(_))));
}

#[sqlx::test(migrations = "./migrations")]
async fn converting_a_quote_copies_items_once(pool: PgPool) {
    let db = Database::from_pool(pool);
    let (user_id, customer_id) = tenant(&db, "owner@ledgerly.test").await;
    let quote = quotes::create(
        &db,
        user_id,
        QuoteInput {
            customer_id,
            number: None,
            issue_date: date(2024, 9, 1),
            valid_until: date(2024, 9, 30),
            status: None,
            discount: Adjustment::fixed(10.0),
            tax: Adjustment::none(),
            notes: None,
            items: vec![item("Audit", 1.0, 300.0), item("Report", 2.0, 25.0)],
        },
    )
    .await
    .unwrap();
    let id = quote.quote.id;

    let early = quotes::convert_to_invoice(&db, user_id, id).await;
    assert!(matches!(early, Err(Error::Conflict(_))));

    quotes::set_status(&db, user_id, id, QuoteStatus::Accepted).await.unwrap();
    let invoice = quotes::convert_to_invoice(&db, user_id, id).await.unwrap();

    assert_eq!(invoice.invoice.status, InvoiceStatus::Draft);
    assert_eq!(invoice.invoice.customer_id, customer_id);
    assert!((invoice.invoice.total - quote.quote.total).abs() < 1e-9);
    let descriptions: Vec<&str> = invoice.items.iter().map(|i| i.description.as_str()).collect();
    assert_eq!(descriptions, ["Audit", "Report"]);

    let converted = quotes::get(&db, user_id, id).await.unwrap();
    assert_eq!(converted.quote.invoice_id, Some(invoice.invoice.id));

    let twice = quotes::convert_to_invoice(&db, user_id, id).await;
    assert!(matches!(twice, Err(Error::Conflict(_))));
}

#[sqlx::test(migrations = "./migrations")]
async fn derived_slugs_are_suffixed_on_collision(pool: PgPool) {
    let db = Database::from_pool(pool);
    let (user_id, _) = tenant(&db, "owner@ledgerly.test").await;
    let post = || BlogInput {
        title: "Spring Sale!".into(),
        slug: None,
        content: "Everything must go.".into(),
        excerpt: None,
        cover_image_url: None,
    };

    let mut slugs = Vec::new();
    for _ in 0..3 {
        slugs.push(blogs::create(&db, user_id, post()).await.unwrap().slug);
    }
    assert_eq!(slugs, ["spring-sale", "spring-sale-2", "spring-sale-3"]);

    let mut taken = post();
    taken.slug = Some("spring-sale".into());
    let duplicate = blogs::create(&db, user_id, taken).await;
    assert!(matches!(duplicate, Err(Error::AlreadyExists(_))));
}

#[sqlx::test(migrations = "./migrations")]
async fn tenants_cannot_reach_each_others_rows(pool: PgPool) {
    let db = Database::from_pool(pool);
    let (owner, customer_id) = tenant(&db, "owner@ledgerly.test").await;
    let (intruder, _) = tenant(&db, "intruder@ledgerly.test").await;
    let id = invoices::create(&db, owner, invoice_input(customer_id, date(2024, 9, 30), InvoiceStatus::Sent))
        .await
        .unwrap()
        .invoice
        .id;

    assert!(matches!(invoices::get(&db, intruder, id).await, Err(Error::NotFound(_))));
    assert!(matches!(invoices::mark_paid(&db, intruder, id, None).await, Err(Error::NotFound(_))));
    assert!(matches!(customers::get(&db, intruder, customer_id).await, Err(Error::NotFound(_))));

    // Borrowing another tenant's customer is reported as a missing reference.
    let borrowed = invoices::create(&db, intruder, invoice_input(customer_id, date(2024, 9, 30), InvoiceStatus::Draft)).await;
    assert!(matches!(borrowed, Err(Error::Validation(_))));

    assert!(invoices::list(&db, intruder, None).await.unwrap().is_empty());
    let still_sent = invoices::get(&db, owner, id).await.unwrap();
    assert_eq!(still_sent.invoice.status, InvoiceStatus::Sent);
}
