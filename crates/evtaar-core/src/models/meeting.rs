use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeetingStatus {
    Scheduled,
    Live,
    Ended,
    Cancelled,
    Unknown,
}

impl MeetingStatus {
    pub fn from_api(status: &str) -> Self {
        match status.to_ascii_lowercase().as_str() {
            "scheduled" => MeetingStatus::Scheduled,
            "live" | "active" | "in_progress" => MeetingStatus::Live,
            "ended" | "completed" => MeetingStatus::Ended,
            "cancelled" | "canceled" => MeetingStatus::Cancelled,
            _ => MeetingStatus::Unknown,
        }
    }
}

impl std::fmt::Display for MeetingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            MeetingStatus::Scheduled => "Scheduled",
            MeetingStatus::Live => "Live",
            MeetingStatus::Ended => "Ended",
            MeetingStatus::Cancelled => "Cancelled",
            MeetingStatus::Unknown => "Unknown",
        };
        f.pad(label)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Meeting {
    pub id: String,
    #[serde(default)]
    pub room_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub organizer_id: String,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub jitsi_room_url: Option<String>,
    #[serde(default)]
    pub recording_url: Option<String>,
    #[serde(default)]
    pub max_participants: u32,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Meeting {
    pub fn status(&self) -> MeetingStatus {
        MeetingStatus::from_api(&self.status)
    }

    pub fn formatted_start(&self) -> String {
        self.start_time.format("%b %d, %Y %H:%M").to_string()
    }

    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.start_time > now && self.status() == MeetingStatus::Scheduled
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMeetingRequest {
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub start_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_participants: Option<u32>,
}

/// `data` of `POST /meetings/{id}/join`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinMeeting {
    pub meeting_id: String,
    pub room_url: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub user_email: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct MeetingQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_meeting_parses_and_classifies() {
        let json = r#"{"id":"m1","room_id":"evtaar-abc","title":"Standup","description":"","organizer_id":"u1","start_time":"2030-01-01T09:00:00Z","status":"scheduled","max_participants":10,"created_at":"2029-12-01T09:00:00Z"}"#;
        let meeting: Meeting = serde_json::from_str(json).expect("Failed to parse meeting");
        assert_eq!(meeting.status(), MeetingStatus::Scheduled);
        assert_eq!(meeting.formatted_start(), "Jan 01, 2030 09:00");

        let now = Utc.with_ymd_and_hms(2029, 6, 1, 0, 0, 0).unwrap();
        assert!(meeting.is_upcoming(now));
    }

    #[test]
    fn test_status_from_api_is_lenient() {
        assert_eq!(MeetingStatus::from_api("CANCELED"), MeetingStatus::Cancelled);
        assert_eq!(MeetingStatus::from_api("completed"), MeetingStatus::Ended);
        assert_eq!(MeetingStatus::from_api("weird"), MeetingStatus::Unknown);
    }

    #[test]
    fn test_status_display_honours_width() {
        assert_eq!(format!("{:<10}|", MeetingStatus::Live), "Live      |");
        assert_eq!(format!("{}", MeetingStatus::Cancelled), "Cancelled");
    }
}
