/// Coarse user profile sent with every query so the backend can adjust tone
/// and disclaimers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserProfile {
    #[default]
    General,
    Patient,
    Researcher,
}

/// JSON POST body for one stream attempt.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    /// Free-text user query.
    pub query: String,
    /// Logical session identifier, stable across attempts on one session.
    pub session_id: uuid::Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_id: Option<String>,
    pub profile: UserProfile,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_camel_case_and_skips_absent_ids() {
        let request = ChatRequest {
            query: "hello".into(),
            session_id: uuid::Uuid::nil(),
            user_id: None,
            room_id: Some("room-7".into()),
            profile: UserProfile::Patient,
        };
        let value = serde_json::to_value(&request).expect("serialize");
        assert_eq!(value.get("query"), Some(&serde_json::json!("hello")));
        assert_eq!(value.get("roomId"), Some(&serde_json::json!("room-7")));
        assert_eq!(value.get("profile"), Some(&serde_json::json!("patient")));
        assert!(value.get("userId").is_none());
        assert!(value.get("sessionId").is_some());
    }
}
