use serde::{Deserialize, Serialize};

pub type UserId = i64;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

impl User {
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.email
        } else {
            &self.name
        }
    }
}

/// Name and email, as sent to both `/auth/login` and `/auth/register`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Credentials {
    pub name: String,
    pub email: String,
}

impl Credentials {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

/// What a successful login yields: an optional token and the user record.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionPayload {
    pub token: Option<String>,
    pub user: User,
}

impl SessionPayload {
    /// The server may answer with `{ token, user }` or with the bare user.
    pub fn from_json(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        let token = value
            .get("token")
            .and_then(|t| t.as_str())
            .map(str::to_string);
        let user = match value.get("user") {
            Some(user) if !user.is_null() => serde_json::from_value(user.clone())?,
            _ => serde_json::from_value(value)?,
        };
        Ok(Self { token, user })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bare_user_login_response() {
        let payload =
            SessionPayload::from_json(json!({ "id": 1, "name": "Ada", "email": "ada@x.io", "projectDTO": null }))
                .unwrap();
        assert_eq!(payload.token, None);
        assert_eq!(payload.user.name, "Ada");
    }

    #[test]
    fn wrapped_login_response() {
        let payload = SessionPayload::from_json(json!({
            "token": "abc",
            "user": { "id": 2, "name": "Bob", "email": "bob@x.io" }
        }))
        .unwrap();
        assert_eq!(payload.token.as_deref(), Some("abc"));
        assert_eq!(payload.user.id, 2);
    }

    #[test]
    fn display_name_falls_back_to_email() {
        let user = User { id: 1, name: String::new(), email: "e@x.io".into() };
        assert_eq!(user.display_name(), "e@x.io");
    }
}
