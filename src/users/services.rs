use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use crate::storage::NutritionStore;
use crate::users::repo_types::User;

pub(crate) fn is_valid_username(username: &str) -> bool {
    lazy_static! {
        static ref USERNAME_RE: Regex = Regex::new(r"^[A-Za-z0-9_.-]{1,100}$").unwrap();
    }
    USERNAME_RE.is_match(username)
}

/// Get-or-create the user the services act on. Run once at startup.
pub async fn provision_user(store: &dyn NutritionStore, username: &str) -> anyhow::Result<User> {
    let username = username.trim();
    if !is_valid_username(username) {
        warn!(%username, "invalid username");
        anyhow::bail!("invalid username '{username}'");
    }
    let user = store.upsert_user(username).await?;
    info!(user_id = %user.id, username = %user.username, "user provisioned");
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryStore;

    #[test]
    fn username_rules() {
        assert!(is_valid_username("demo_user"));
        assert!(is_valid_username("a.b-c"));
        assert!(!is_valid_username(""));
        assert!(!is_valid_username("has space"));
        assert!(!is_valid_username(&"x".repeat(101)));
    }

    #[tokio::test]
    async fn provisioning_is_idempotent() {
        let store = MemoryStore::new();
        let first = provision_user(&store, "demo_user").await.unwrap();
        let second = provision_user(&store, " demo_user ").await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(first.calorie_goal, 2000.0);
        assert_eq!(first.fats_goal, 65.0);
    }

    #[tokio::test]
    async fn provisioning_rejects_bad_names() {
        let store = MemoryStore::new();
        assert!(provision_user(&store, "no spaces allowed").await.is_err());
    }
}
