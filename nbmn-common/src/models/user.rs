//! Site users (logins, not attendees)

use super::attendee::title_case;
use super::now_field;
use crate::db::{Document, Store};
use crate::Result;
use serde::{Deserialize, Serialize};
use tracing::info;

pub const EMAIL_INDEX: &str = "email";
pub const ADMIN_UTYPE: &str = "admin";
pub const ANONYMOUS_PHOTO: &str = "/static/anonymous_person.png";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub utype: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub photo: String,
    /// Timestamps of each login
    #[serde(default)]
    pub logins: Vec<String>,
}

impl User {
    pub fn is_anon(&self) -> bool {
        self.name.is_empty()
    }

    pub fn is_admin(&self) -> bool {
        self.utype == ADMIN_UTYPE
    }

    /// "first.last@example.com" -> "First Last"
    pub fn name_from_email(email: &str) -> String {
        let local = email.split('@').next().unwrap_or_default();
        title_case(&local.split('.').collect::<Vec<_>>().join(" "))
    }

    /// Record a login for `email`, creating the user on first sight
    ///
    /// Admin status is recomputed from `admins` (case-insensitive) on every
    /// login.
    pub async fn login<S: Store>(store: &S, email: &str, admins: &[String]) -> Result<Self> {
        let email = email.trim();
        let mut user = store
            .find_by_index::<Self>(EMAIL_INDEX, email)
            .await?
            .into_iter()
            .next()
            .unwrap_or_else(|| Self {
                email: email.to_string(),
                ..Self::default()
            });

        if user.name.is_empty() {
            user.name = Self::name_from_email(email);
        }
        if user.photo.is_empty() {
            user.photo = ANONYMOUS_PHOTO.to_string();
        }
        user.utype = if admins.iter().any(|a| a.trim().eq_ignore_ascii_case(email)) {
            ADMIN_UTYPE.to_string()
        } else {
            String::new()
        };
        user.logins.push(now_field());

        let created = user.id.is_none();
        store.save(&mut user).await?;
        if created {
            info!(email = %user.email, admin = user.is_admin(), "Created user");
        }
        Ok(user)
    }
}

impl Document for User {
    const TABLE: &'static str = "users";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }

    fn indexes(&self) -> Vec<(&'static str, String)> {
        vec![(EMAIL_INDEX, self.email.clone())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::SqliteStore;

    #[test]
    fn test_name_from_email() {
        assert_eq!(User::name_from_email("jane.doe@example.com"), "Jane Doe");
        assert_eq!(User::name_from_email("bob"), "Bob");
    }

    #[test]
    fn test_anon() {
        assert!(User::default().is_anon());
        assert!(!User::default().is_admin());
    }

    #[tokio::test]
    async fn test_login_creates_then_updates() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        store.ensure_table::<User>().await.unwrap();
        let admins = vec!["Jane.Doe@Example.com".to_string()];

        let first = User::login(&store, "jane.doe@example.com", &admins).await.unwrap();
        assert!(first.is_admin());
        assert_eq!(first.name, "Jane Doe");
        assert_eq!(first.photo, ANONYMOUS_PHOTO);

        let second = User::login(&store, "jane.doe@example.com", &[]).await.unwrap();
        assert_eq!(second.id, first.id);
        assert!(!second.is_admin());
        assert_eq!(second.logins.len(), 2);

        let all: Vec<User> = store.find_all().await.unwrap();
        assert_eq!(all.len(), 1);
    }
}
