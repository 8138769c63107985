use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A guild member as handed over by the chat client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberProfile {
    pub discord_id: i64,
    pub username: String,
    pub display_name: String,
    /// Role names in the order the client reports them
    pub roles: Vec<String>,
    pub email: Option<String>,
    pub is_active: bool,
    pub joined_at: DateTime<FixedOffset>,
}

impl MemberProfile {
    /// Join time with the offset dropped, keeping the wall-clock reading
    pub fn joined_at_naive(&self) -> NaiveDateTime {
        self.joined_at.naive_local()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joined_at_keeps_wall_clock() {
        let member = MemberProfile {
            discord_id: 1,
            username: "ada".to_string(),
            display_name: "Ada".to_string(),
            roles: vec![],
            email: None,
            is_active: true,
            joined_at: DateTime::parse_from_rfc3339("2024-05-01T10:15:00+05:30").unwrap(),
        };
        assert_eq!(member.joined_at_naive().to_string(), "2024-05-01 10:15:00");
    }
}
