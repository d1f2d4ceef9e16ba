use crate::db::models::users::UserDBResponse;

/// Admit a new project iff the owner is below their quota.
pub fn can_create_project(user: &UserDBResponse, current_project_count: i64) -> bool {
    current_project_count < i64::from(user.projects_quota)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Locale;
    use chrono::Utc;

    fn user_with_quota(quota: i32) -> UserDBResponse {
        UserDBResponse {
            id: 1,
            email: "a@x.com".to_string(),
            password_hash: String::new(),
            locale: Locale::En,
            plan: "free".to_string(),
            projects_quota: quota,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_boundary() {
        let user = user_with_quota(3);
        assert!(can_create_project(&user, 0));
        assert!(can_create_project(&user, 2));
        assert!(!can_create_project(&user, 3));
        assert!(!can_create_project(&user, 4));
    }

    #[test]
    fn test_zero_quota_admits_nothing() {
        assert!(!can_create_project(&user_with_quota(0), 0));
    }
}
