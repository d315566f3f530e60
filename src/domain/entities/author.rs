//! Author Entity

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::entities::Entity;
use crate::repositories::Keyed;

/// 저자 엔티티
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    #[validate(range(min = 1, message = "id는 1 이상이어야 합니다"))]
    pub id: i32,

    #[validate(length(min = 2, max = 50, message = "이름은 2-50자 사이여야 합니다"))]
    pub name: String,

    /// 필명 (선택)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 50, message = "필명은 50자 이하여야 합니다"))]
    pub nickname: Option<String>,

    #[validate(range(min = 1, max = 120, message = "나이는 1-120 사이여야 합니다"))]
    pub age: i32,
}

impl Author {
    pub fn new(id: i32, name: impl Into<String>, age: i32) -> Self {
        Self {
            id,
            name: name.into(),
            nickname: None,
            age,
        }
    }

    pub fn with_nickname(mut self, nickname: impl Into<String>) -> Self {
        self.nickname = Some(nickname.into());
        self
    }
}

impl Keyed for Author {
    type Key = i32;

    fn key(&self) -> i32 {
        self.id
    }
}

impl Entity for Author {
    const NAME: &'static str = "authors";
    const CONFIG_KEY: &'static str = "AUTHORS";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nickname_is_optional() {
        let author: Author =
            serde_json::from_str(r#"{"id":1,"name":"Frank Herbert","age":65}"#).unwrap();
        assert_eq!(author.nickname, None);

        let json = serde_json::to_string(&author.with_nickname("FH")).unwrap();
        assert!(json.contains(r#""nickname":"FH""#));
    }

    #[test]
    fn test_age_out_of_range() {
        let errors = Author::new(1, "Frank Herbert", 0).validate().unwrap_err();
        assert!(errors.field_errors().contains_key("age"));
    }
}
