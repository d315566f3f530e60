//! Employee Entity

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::entities::Entity;
use crate::repositories::Keyed;

/// 직원 엔티티
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    #[validate(range(min = 1, message = "id는 1 이상이어야 합니다"))]
    pub id: i32,

    #[validate(length(min = 1, max = 100, message = "이름은 1-100자 사이여야 합니다"))]
    pub name: String,

    #[validate(length(min = 1, max = 100, message = "직책은 1-100자 사이여야 합니다"))]
    pub position: String,

    #[validate(range(min = 0.0, message = "급여는 음수일 수 없습니다"))]
    pub salary: f64,
}

impl Keyed for Employee {
    type Key = i32;

    fn key(&self) -> i32 {
        self.id
    }
}

impl Entity for Employee {
    const NAME: &'static str = "employees";
    const CONFIG_KEY: &'static str = "EMPLOYEES";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_salary_rejected() {
        let employee = Employee {
            id: 3,
            name: "Ada".into(),
            position: "Engineer".into(),
            salary: -1.0,
        };
        assert!(employee.validate().unwrap_err().field_errors().contains_key("salary"));
    }
}
