//! Turns a project submission into a milestone plan via the LLM.

use chrono::{Days, NaiveDate};
use serde::Deserialize;
use serde_json::Value;

use super::llm::{extract_json, LlmClient};
use crate::db::MilestoneDraft;
use crate::error::{Error, Result};
use crate::models::ProjectSubmission;

const MAX_MILESTONES: usize = 12;
const MAX_TOKENS: u32 = 1500;

const SYSTEM_PROMPT: &str = "You are a project manager for a small agency. \
Split client projects into concrete, billable milestones. \
Answer with JSON only.";

#[derive(Debug, Deserialize)]
struct RawMilestone {
    title: Option<String>,
    description: Option<String>,
    due_in_days: Option<i64>,
    due_date: Option<NaiveDate>,
    amount: Option<f64>,
}

#[derive(Clone)]
pub struct MilestonePlanner {
    llm: LlmClient,
}

impl MilestonePlanner {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }

    pub fn is_configured(&self) -> bool {
        self.llm.is_configured()
    }

    /// Ask the model for milestones for `submission`, anchored at `today`.
    pub async fn plan(&self, submission: &ProjectSubmission, today: NaiveDate) -> Result<Vec<MilestoneDraft>> {
        let prompt = build_prompt(submission, today);
        let completion = self.llm.complete(SYSTEM_PROMPT, &prompt, MAX_TOKENS).await?;
        parse_milestones(&completion, today)
    }
}

pub fn build_prompt(submission: &ProjectSubmission, today: NaiveDate) -> String {
    let mut prompt = format!(
        "Project: {}\nClient: {}\nDescription:\n{}\n",
        submission.title, submission.client_name, submission.description
    );
    if let Some(budget) = submission.budget {
        prompt.push_str(&format!("Budget: {:.2}\n", budget));
    }
    if let Some(deadline) = submission.deadline {
        prompt.push_str(&format!(
            "Deadline: {} ({} days from today)\n",
            deadline,
            (deadline - today).num_days()
        ));
    }
    prompt.push_str(&format!(
        "\nReturn a JSON array of 3 to {} milestones in delivery order. Each item has \
\"title\" (string), \"description\" (string), \"due_in_days\" (integer days from today) \
and \"amount\" (number, share of the budget; omit if there is no budget).",
        MAX_MILESTONES
    ));
    prompt
}

/// Parse the model's answer into milestone drafts.
///
/// Accepts a bare array or an object with a `milestones` array. Entries
/// without a title are dropped; negative amounts and offsets are ignored,
/// as are offsets that land outside the calendar.
pub fn parse_milestones(completion: &str, today: NaiveDate) -> Result<Vec<MilestoneDraft>> {
    let value = extract_json(completion)
        .ok_or_else(|| Error::Llm("response did not contain JSON".to_string()))?;

    let entries = match value {
        Value::Array(entries) => entries,
        Value::Object(mut map) => match map.remove("milestones") {
            Some(Value::Array(entries)) => entries,
            _ => return Err(Error::Llm("response has no milestones array".to_string())),
        },
        _ => return Err(Error::Llm("response is not a milestone list".to_string())),
    };

    let drafts: Vec<MilestoneDraft> = entries
        .into_iter()
        .filter_map(|entry| serde_json::from_value::<RawMilestone>(entry).ok())
        .filter_map(|raw| {
            let title = raw.title?.trim().to_string();
            if title.is_empty() {
                return None;
            }
            let due_date = raw.due_date.or_else(|| {
                let days = u64::try_from(raw.due_in_days?).ok()?;
                today.checked_add_days(Days::new(days))
            });
            Some(MilestoneDraft {
                title,
                description: raw
                    .description
                    .map(|d| d.trim().to_string())
                    .filter(|d| !d.is_empty()),
                due_date,
                amount: raw.amount.filter(|a| a.is_finite() && *a >= 0.0),
            })
        })
        .take(MAX_MILESTONES)
        .collect();

    if drafts.is_empty() {
        return Err(Error::Llm("response contained no usable milestones".to_string()));
    }
    Ok(drafts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SubmissionStatus;
    use chrono::Utc;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 9, 1).unwrap()
    }

    fn submission() -> ProjectSubmission {
        ProjectSubmission {
            id: 7,
            user_id: 1,
            title: "Online store".into(),
            description: "Shopify-like storefront with inventory sync".into(),
            client_name: "Ada".into(),
            client_email: "ada@example.com".into(),
            budget: Some(9000.0),
            deadline: Some(NaiveDate::from_ymd_opt(2024, 11, 30).unwrap()),
            status: SubmissionStatus::Approved,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn prompt_mentions_budget_and_deadline() {
        let prompt = build_prompt(&submission(), today());
        assert!(prompt.contains("Online store"));
        assert!(prompt.contains("Budget: 9000.00"));
        assert!(prompt.contains("90 days from today"));
    }

    #[test]
    fn parses_fenced_array() {
        let text = "```json\n[\
            {\"title\":\"Discovery\",\"description\":\"Workshops\",\"due_in_days\":14,\"amount\":1500},\
            {\"title\":\"Build\",\"due_in_days\":60,\"amount\":6000},\
            {\"title\":\"  \",\"due_in_days\":70}\
        ]\n```";
        let drafts = parse_milestones(text, today()).unwrap();

        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0].title, "Discovery");
        assert_eq!(drafts[0].description.as_deref(), Some("Workshops"));
        assert_eq!(drafts[0].due_date, NaiveDate::from_ymd_opt(2024, 9, 15));
        assert_eq!(drafts[1].amount, Some(6000.0));
        assert_eq!(drafts[1].description, None);
    }

    #[test]
    fn parses_wrapped_object_and_explicit_dates() {
        let text = r#"{"milestones":[{"title":"Launch","due_date":"2024-11-30","amount":-5}]}"#;
        let drafts = parse_milestones(text, today()).unwrap();
        assert_eq!(drafts[0].due_date, NaiveDate::from_ymd_opt(2024, 11, 30));
        assert_eq!(drafts[0].amount, None);
    }

    #[test]
    fn out_of_range_offsets_leave_the_date_open() {
        let text = r#"[
            {"title":"Forever","due_in_days":9000000000000000},
            {"title":"Past","due_in_days":-3},
            {"title":"Soon","due_in_days":2}
        ]"#;
        let drafts = parse_milestones(text, today()).unwrap();

        assert_eq!(drafts.len(), 3);
        assert_eq!(drafts[0].due_date, None);
        assert_eq!(drafts[1].due_date, None);
        assert_eq!(drafts[2].due_date, NaiveDate::from_ymd_opt(2024, 9, 3));
    }

    #[test]
    fn rejects_answers_without_milestones() {
        assert!(parse_milestones("I cannot help with that.", today()).is_err());
        assert!(parse_milestones("[]", today()).is_err());
        assert!(parse_milestones(r#"{"plan":"later"}"#, today()).is_err());
    }
}
