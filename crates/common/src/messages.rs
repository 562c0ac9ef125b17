use faststr::FastStr;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Message {
    pub role:    MessageRole,
    pub content: FastStr,
}

impl Message {
    pub fn user(content: FastStr) -> Self {
        Self {
            role: MessageRole::User,
            content,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message() {
        let message = Message::user("hi".into());
        assert_eq!(message.role, MessageRole::User);
        let value = serde_json::to_value(&message).unwrap();
        assert_eq!(value, serde_json::json!({ "role": "user", "content": "hi" }));
    }
}
