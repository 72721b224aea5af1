use futures::TryStreamExt;
use sqlx::SqlitePool;

use crate::db::Database;
use crate::user::{Error, NewUser, User};

/// Maps user operations onto statements against the `users` table.
#[derive(Debug, Clone)]
pub struct UserService {
    pool: SqlitePool,
}

impl UserService {
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }

    pub async fn list_users(&self) -> Result<Vec<User>, Error> {
        log::debug!("listing users");
        let users: Vec<User> = sqlx::query_as("SELECT id, name, email, createdAt FROM users")
            .fetch(&self.pool)
            .try_collect()
            .await?;
        Ok(users)
    }

    pub async fn get_user(&self, id: i64) -> Result<User, Error> {
        log::debug!("fetching user {id}");
        sqlx::query_as::<_, User>("SELECT id, name, email, createdAt FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(Error::NotFound(id))
    }

    pub async fn create_user(&self, input: &NewUser) -> Result<User, Error> {
        let id = sqlx::query("INSERT INTO users (name, email, createdAt) VALUES (?, ?, ?)")
            .bind(&input.name)
            .bind(&input.email)
            .bind(input.created_at)
            .execute(&self.pool)
            .await?
            .last_insert_rowid();

        log::debug!("created user {id}");
        self.get_user(id).await
    }

    pub async fn update_user(&self, id: i64, input: &NewUser) -> Result<User, Error> {
        let result = sqlx::query("UPDATE users SET name = ?, email = ?, createdAt = ? WHERE id = ?")
            .bind(&input.name)
            .bind(&input.email)
            .bind(input.created_at)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(id));
        }

        log::debug!("updated user {id}");
        self.get_user(id).await
    }

    /// Returns whether a row was removed.
    pub async fn delete_user(&self, id: i64) -> Result<bool, Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        log::debug!("deleted {} row(s) for user {id}", result.rows_affected());
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    async fn service() -> UserService {
        let db = Database::in_memory().await.unwrap();
        UserService::new(&db)
    }

    fn new_user(name: &str, email: &str, created_at: &str) -> NewUser {
        NewUser {
            name: name.into(),
            email: email.into(),
            created_at: NaiveDate::parse_from_str(created_at, "%Y-%m-%d").unwrap(),
        }
    }

    #[tokio::test]
    async fn create_then_get() {
        let service = service().await;
        let input = new_user("A", "a@x.com", "2024-01-01");

        let created = service.create_user(&input).await.unwrap();
        assert_eq!(created.name, "A");
        assert_eq!(created.email, "a@x.com");
        assert_eq!(created.created_at, input.created_at);

        let fetched = service.get_user(created.id).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn create_assigns_fresh_ids() {
        let service = service().await;
        let first = service
            .create_user(&new_user("A", "a@x.com", "2024-01-01"))
            .await
            .unwrap();
        service.delete_user(first.id).await.unwrap();

        let second = service
            .create_user(&new_user("B", "b@x.com", "2024-01-02"))
            .await
            .unwrap();
        assert_ne!(first.id, second.id);
    }

    #[tokio::test]
    async fn create_rejects_oversized_fields() {
        let service = service().await;
        let long_name = "n".repeat(51);
        let long_email = format!("{}@x.com", "e".repeat(30));

        let error = service
            .create_user(&new_user(&long_name, "a@x.com", "2024-01-01"))
            .await
            .unwrap_err();
        assert!(matches!(error, Error::Database(..)), "{error:?}");

        let error = service
            .create_user(&new_user("A", &long_email, "2024-01-01"))
            .await
            .unwrap_err();
        assert!(matches!(error, Error::Database(..)), "{error:?}");

        assert!(service.list_users().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn get_missing_user() {
        let service = service().await;
        let error = service.get_user(42).await.unwrap_err();
        assert!(error.is_not_found(), "{error:?}");
    }

    #[tokio::test]
    async fn list_tracks_creates_and_deletes() {
        let service = service().await;
        assert!(service.list_users().await.unwrap().is_empty());

        let mut ids = Vec::new();
        for i in 0..3 {
            let user = service
                .create_user(&new_user(&format!("user{i}"), "u@x.com", "2024-01-01"))
                .await
                .unwrap();
            ids.push(user.id);
        }
        assert!(service.delete_user(ids[1]).await.unwrap());

        let mut listed: Vec<i64> = service
            .list_users()
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.id)
            .collect();
        listed.sort_unstable();
        assert_eq!(listed, vec![ids[0], ids[2]]);
    }

    #[tokio::test]
    async fn update_keeps_id() {
        let service = service().await;
        let created = service
            .create_user(&new_user("A", "a@x.com", "2024-01-01"))
            .await
            .unwrap();

        let updated = service
            .update_user(created.id, &new_user("B", "b@x.com", "2023-06-15"))
            .await
            .unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.name, "B");
        assert_eq!(updated.email, "b@x.com");
        assert_eq!(updated.created_at.to_string(), "2023-06-15");

        assert_eq!(service.get_user(created.id).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn update_missing_user_changes_nothing() {
        let service = service().await;
        let existing = service
            .create_user(&new_user("A", "a@x.com", "2024-01-01"))
            .await
            .unwrap();

        let error = service
            .update_user(existing.id + 1, &new_user("B", "b@x.com", "2024-01-01"))
            .await
            .unwrap_err();
        assert!(error.is_not_found(), "{error:?}");
        assert_eq!(service.list_users().await.unwrap(), vec![existing]);
    }

    #[tokio::test]
    async fn delete_reports_removal() {
        let service = service().await;
        let keep = service
            .create_user(&new_user("A", "a@x.com", "2024-01-01"))
            .await
            .unwrap();
        let gone = service
            .create_user(&new_user("B", "b@x.com", "2024-01-01"))
            .await
            .unwrap();

        assert!(service.delete_user(gone.id).await.unwrap());
        assert!(!service.delete_user(gone.id).await.unwrap());
        assert!(!service.delete_user(0).await.unwrap());
        assert_eq!(service.list_users().await.unwrap(), vec![keep]);
    }
}
