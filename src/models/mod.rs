mod appointment;
mod blog;
mod customer;
mod invoice;
mod line_item;
mod milestone;
mod product;
mod project_submission;
mod quote;
mod service;
mod supplier;
mod transaction;
mod user;

use serde::Deserialize;

pub use appointment::{Appointment, AppointmentInput, AppointmentStatus};
pub use blog::{Blog, BlogInput, BlogStatus};
pub use customer::{Customer, CustomerInput};
pub use invoice::{Invoice, InvoiceInput, InvoiceStatus, InvoiceWithItems};
pub use line_item::{LineItem, LineItemInput};
pub use milestone::{Milestone, MilestoneInput, MilestoneStatus};
pub use product::{Product, ProductInput, StockAdjustment};
pub use project_submission::{ProjectSubmission, ProjectSubmissionInput, SubmissionStatus};
pub use quote::{Quote, QuoteInput, QuoteStatus, QuoteWithItems};
pub use service::{Service, ServiceInput};
pub use supplier::{Supplier, SupplierInput};
pub use transaction::{Transaction, TransactionInput, TransactionKind, TransactionSummary};
pub use user::{User, UserInput};

/// Body of the status dropdown endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusChange<S> {
    pub status: S,
}
