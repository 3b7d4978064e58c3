use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tokio::fs;
use tokio::process::Command;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Customer, InvoiceWithItems, LineItem, QuoteWithItems, User};
use crate::totals::{Adjustment, AdjustmentKind, Totals};

/// Which kind of document is being rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Invoice,
    Quote,
}

impl DocumentKind {
    pub fn title(&self) -> &'static str {
        match self {
            DocumentKind::Invoice => "Invoice",
            DocumentKind::Quote => "Quote",
        }
    }

    fn file_stem(&self) -> &'static str {
        match self {
            DocumentKind::Invoice => "invoice",
            DocumentKind::Quote => "quote",
        }
    }
}

/// Everything printed on an invoice or quote.
#[derive(Debug, Clone)]
pub struct DocumentView<'a> {
    pub kind: DocumentKind,
    pub number: &'a str,
    pub issue_date: NaiveDate,
    /// Due date for invoices, validity date for quotes.
    pub until: NaiveDate,
    pub discount: Adjustment,
    pub tax: Adjustment,
    pub totals: Totals,
    pub notes: Option<&'a str>,
    pub items: &'a [LineItem],
    pub seller: &'a User,
    pub customer: &'a Customer,
}

impl<'a> DocumentView<'a> {
    pub fn invoice(doc: &'a InvoiceWithItems, seller: &'a User, customer: &'a Customer) -> Self {
        let invoice = &doc.invoice;
        Self {
            kind: DocumentKind::Invoice,
            number: &invoice.number,
            issue_date: invoice.issue_date,
            until: invoice.due_date,
            discount: invoice.discount(),
            tax: invoice.tax(),
            totals: Totals {
                subtotal: invoice.subtotal,
                discount_amount: invoice.discount_amount,
                taxable_amount: invoice.subtotal - invoice.discount_amount,
                tax_amount: invoice.tax_amount,
                total: invoice.total,
            },
            notes: invoice.notes.as_deref(),
            items: &doc.items,
            seller,
            customer,
        }
    }

    pub fn quote(doc: &'a QuoteWithItems, seller: &'a User, customer: &'a Customer) -> Self {
        let quote = &doc.quote;
        Self {
            kind: DocumentKind::Quote,
            number: &quote.number,
            issue_date: quote.issue_date,
            until: quote.valid_until,
            discount: quote.discount(),
            tax: quote.tax(),
            totals: Totals {
                subtotal: quote.subtotal,
                discount_amount: quote.discount_amount,
                taxable_amount: quote.subtotal - quote.discount_amount,
                tax_amount: quote.tax_amount,
                total: quote.total,
            },
            notes: quote.notes.as_deref(),
            items: &doc.items,
            seller,
            customer,
        }
    }
}

/// A rendered document ready to attach to an e-mail.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
    /// Directory holding this render's files and nothing else.
    pub work_dir: PathBuf,
}

impl RenderedDocument {
    /// Remove the files written while rendering.
    pub async fn cleanup(&self) {
        if let Err(e) = fs::remove_dir_all(&self.work_dir).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %self.work_dir.display(), error = %e, "failed to remove rendered document");
            }
        }
    }
}

/// Renders invoices and quotes to Markdown, and to PDF when pandoc is
/// installed.
///
/// Every render gets its own directory under `output_dir/<tenant>/`, so
/// concurrent renders of equally numbered documents never share files.
#[derive(Debug, Clone)]
pub struct DocumentRenderer {
    output_dir: PathBuf,
}

impl DocumentRenderer {
    pub fn new(output_dir: impl AsRef<Path>) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    pub async fn render(&self, view: &DocumentView<'_>) -> Result<RenderedDocument> {
        let work_dir = self
            .output_dir
            .join(view.seller.id.to_string())
            .join(Uuid::new_v4().to_string());
        fs::create_dir_all(&work_dir).await?;

        let markdown = render_markdown(view);
        let stem = format!("{}_{}", view.kind.file_stem(), sanitize(view.number));
        let md_path = work_dir.join(format!("{}.md", stem));
        let pdf_path = work_dir.join(format!("{}.pdf", stem));

        fs::write(&md_path, markdown.as_bytes()).await?;
        debug!(path = %md_path.display(), "markdown written");

        let pdf = Command::new("pandoc")
            .arg(&md_path)
            .arg("-o")
            .arg(&pdf_path)
            .output()
            .await;

        match pdf {
            Ok(output) if output.status.success() => {
                let bytes = fs::read(&pdf_path).await?;
                Ok(RenderedDocument {
                    file_name: format!("{}.pdf", stem),
                    content_type: "application/pdf",
                    bytes,
                    work_dir,
                })
            }
            other => {
                match other {
                    Ok(output) => warn!(
                        stderr = %String::from_utf8_lossy(&output.stderr),
                        "pandoc failed, sending markdown instead"
                    ),
                    Err(e) => warn!(error = %e, "pandoc unavailable, sending markdown instead"),
                }
                Ok(RenderedDocument {
                    file_name: format!("{}.md", stem),
                    content_type: "text/markdown",
                    bytes: markdown.into_bytes(),
                    work_dir,
                })
            }
        }
    }
}

fn sanitize(number: &str) -> String {
    number
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}

fn adjustment_label(name: &str, adjustment: &Adjustment) -> String {
    match adjustment.kind {
        AdjustmentKind::Percentage => format!("{} ({}%)", name, adjustment.value),
        AdjustmentKind::Fixed => name.to_string(),
    }
}

/// Markdown body of an invoice or quote.
pub fn render_markdown(view: &DocumentView<'_>) -> String {
    let mut content = String::new();
    let seller = view.seller;

    content.push_str(&format!(
        "# {}\n",
        seller.company_name.as_deref().unwrap_or(&seller.name)
    ));
    content.push_str(&format!("{}\n", seller.email));
    if let Some(phone) = &seller.phone {
        content.push_str(&format!("{}\n", phone));
    }
    content.push('\n');

    content.push_str(&format!("## {} {}\n\n", view.kind.title(), view.number));
    content.push_str(&format!("Issued: {}  \n", view.issue_date.format("%Y-%m-%d")));
    let until_label = match view.kind {
        DocumentKind::Invoice => "Due",
        DocumentKind::Quote => "Valid until",
    };
    content.push_str(&format!("{}: {}\n\n", until_label, view.until.format("%Y-%m-%d")));

    content.push_str("**Bill to**  \n");
    content.push_str(&format!("{}  \n", view.customer.name));
    content.push_str(&format!("{}  \n", view.customer.email));
    if let Some(address) = &view.customer.address {
        content.push_str(&format!("{}  \n", address));
    }
    content.push('\n');

    content.push_str("| Description | Qty | Unit price | Amount |\n");
    content.push_str("|---|---:|---:|---:|\n");
    for item in view.items {
        content.push_str(&format!(
            "| {} | {} | {:.2} | {:.2} |\n",
            item.description.replace('|', "\\|"),
            item.quantity,
            item.unit_price,
            item.amount
        ));
    }
    content.push('\n');

    let totals = &view.totals;
    content.push_str(&format!("Subtotal: {:.2}  \n", totals.subtotal));
    if totals.discount_amount != 0.0 {
        content.push_str(&format!(
            "{}: -{:.2}  \n",
            adjustment_label("Discount", &view.discount),
            totals.discount_amount
        ));
    }
    if totals.tax_amount != 0.0 {
        content.push_str(&format!(
            "{}: {:.2}  \n",
            adjustment_label("Tax", &view.tax),
            totals.tax_amount
        ));
    }
    content.push_str(&format!("**Total: {:.2}**\n", totals.total));

    if let Some(notes) = view.notes {
        content.push_str(&format!("\n---\n\n{}\n", notes));
    }

    content
}
