use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Customer {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub created_by: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Customer {
    /// "Acme Corp (Jane Doe)" or just the contact name when no company is set.
    pub fn display_name(&self) -> String {
        if self.company.trim().is_empty() {
            self.name.clone()
        } else {
            format!("{} ({})", self.company, self.name)
        }
    }
}

/// Body of both `POST /crm/customers` and `PUT /crm/customers/{id}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CustomerQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interaction {
    pub id: String,
    pub customer_id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(rename = "type", alias = "interaction_type")]
    pub kind: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default, alias = "notes")]
    pub description: String,
    #[serde(default)]
    pub scheduled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Interaction {
    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }
}

/// Body of `POST /crm/customers/{id}/interactions`; the customer comes
/// from the path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateInteractionRequest {
    #[serde(rename = "type")]
    pub kind: String,
    pub subject: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interaction_accepts_both_field_spellings() {
        let current: Interaction = serde_json::from_str(
            r#"{"id":"i1","customer_id":"c1","user_id":"u1","type":"call","subject":"Intro","description":"talked"}"#,
        )
        .expect("Failed to parse interaction");
        assert_eq!(current.kind, "call");
        assert_eq!(current.description, "talked");

        let legacy: Interaction = serde_json::from_str(
            r#"{"id":"i2","customer_id":"c1","interaction_type":"email","notes":"sent deck","completed_at":"2024-05-01T12:00:00Z"}"#,
        )
        .expect("Failed to parse legacy interaction");
        assert_eq!(legacy.kind, "email");
        assert_eq!(legacy.description, "sent deck");
        assert!(legacy.is_completed());
    }

    #[test]
    fn test_create_interaction_uses_type_key() {
        let req = CreateInteractionRequest {
            kind: "meeting".into(),
            subject: "Demo".into(),
            description: String::new(),
            scheduled_at: None,
        };
        let value = serde_json::to_value(&req).expect("serialize");
        assert_eq!(value["type"], "meeting");
        assert!(value.get("description").is_none());
    }

    #[test]
    fn test_customer_display_name() {
        let customer: Customer =
            serde_json::from_str(r#"{"id":"c1","name":"Jane Doe","company":"Acme"}"#)
                .expect("Failed to parse customer");
        assert_eq!(customer.display_name(), "Acme (Jane Doe)");
    }
}
