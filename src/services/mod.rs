pub mod documents;
pub mod image_host;
pub mod llm;
pub mod mailer;
pub mod milestone_planner;

pub use documents::{DocumentKind, DocumentRenderer, DocumentView, RenderedDocument};
pub use image_host::{ImageHost, ImageUpload};
pub use llm::LlmClient;
pub use mailer::{Mailer, OutgoingMail};
pub use milestone_planner::MilestonePlanner;
