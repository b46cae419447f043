use super::{Category, EntryStats, Error, Journal, JournalId, NewJournal};
use crate::{dates, summary::DateRange, user_storage::UserId};
use sqlx::SqlitePool;

impl From<sqlx::Error> for Error {
    fn from(other: sqlx::Error) -> Error {
        match other {
            sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                Error::UnknownCategory
            }
            sqlx::Error::RowNotFound => Error::NotFound,
            _ => Error::Generic(other.into()),
        }
    }
}

const SELECT_JOURNAL: &str = "SELECT
        je.id,
        je.title,
        je.content,
        je.category_id,
        c.name AS category,
        je.sentiment,
        je.created_at,
        je.updated_at
    FROM journals je
    JOIN categories c ON je.category_id = c.id";

pub struct SqliteJournals(SqlitePool);

impl SqliteJournals {
    pub fn new(pool: SqlitePool) -> Self {
        Self(pool)
    }
}

#[async_trait::async_trait]
impl super::JournalStorage for SqliteJournals {
    async fn categories(&self) -> Result<Vec<Category>, Error> {
        Ok(
            sqlx::query_as("SELECT id, name, type FROM categories ORDER BY name ASC")
                .fetch_all(&self.0)
                .await?,
        )
    }

    async fn create(&self, user: UserId, entry: &NewJournal) -> Result<JournalId, Error> {
        let at = dates::timestamp(entry.at);
        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO journals(user_id, category_id, title, content, sentiment, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING id",
        )
        .bind(user.0)
        .bind(entry.category_id)
        .bind(&entry.title)
        .bind(&entry.content)
        .bind(&entry.sentiment)
        .bind(&at)
        .bind(&at)
        .fetch_one(&self.0)
        .await?;

        Ok(JournalId(id))
    }

    async fn list(&self, user: UserId) -> Result<Vec<Journal>, Error> {
        let query = format!(
            "{} WHERE je.user_id = ? ORDER BY je.created_at DESC, je.id DESC",
            SELECT_JOURNAL
        );
        Ok(sqlx::query_as(&query)
            .bind(user.0)
            .fetch_all(&self.0)
            .await?)
    }

    async fn get(&self, user: UserId, id: JournalId) -> Result<Journal, Error> {
        let query = format!("{} WHERE je.id = ? AND je.user_id = ?", SELECT_JOURNAL);
        sqlx::query_as(&query)
            .bind(id.0)
            .bind(user.0)
            .fetch_optional(&self.0)
            .await?
            .ok_or(Error::NotFound)
    }

    async fn update(&self, user: UserId, id: JournalId, entry: &NewJournal) -> Result<(), Error> {
        let result = sqlx::query(
            "UPDATE journals
             SET title = ?, content = ?, category_id = ?, sentiment = ?, updated_at = ?
             WHERE id = ? AND user_id = ?",
        )
        .bind(&entry.title)
        .bind(&entry.content)
        .bind(entry.category_id)
        .bind(&entry.sentiment)
        .bind(dates::timestamp(entry.at))
        .bind(id.0)
        .bind(user.0)
        .execute(&self.0)
        .await?;

        if result.rows_affected() == 0 {
            Err(Error::NotFound)
        } else {
            Ok(())
        }
    }

    async fn delete(&self, user: UserId, id: JournalId) -> Result<(), Error> {
        let result = sqlx::query("DELETE FROM journals WHERE id = ? AND user_id = ?")
            .bind(id.0)
            .bind(user.0)
            .execute(&self.0)
            .await?;

        if result.rows_affected() == 0 {
            Err(Error::NotFound)
        } else {
            Ok(())
        }
    }

    async fn entries_between(
        &self,
        user: UserId,
        range: &DateRange,
    ) -> Result<Vec<EntryStats>, Error> {
        Ok(sqlx::query_as(
            "SELECT je.created_at, c.name AS category, je.sentiment, je.content
             FROM journals je
             JOIN categories c ON je.category_id = c.id
             WHERE je.user_id = ? AND je.created_at >= ? AND je.created_at < ?
             ORDER BY je.created_at ASC",
        )
        .bind(user.0)
        .bind(dates::day(range.start))
        .bind(dates::day(range.end))
        .fetch_all(&self.0)
        .await?)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        forms::Register,
        journal_storage::JournalStorage,
        user_storage::{self, UserStorage},
    };
    use time::macros::{date, datetime};

    struct Fixture {
        journals: SqliteJournals,
        alice: UserId,
        bob: UserId,
    }

    async fn fixture() -> Fixture {
        let pool = crate::sqlite::open_in_memory().await.unwrap();
        let users = user_storage::SqliteStorage::new(pool.clone());
        let mut ids = Vec::new();
        for name in &["alice", "bob"] {
            let id = users
                .register(&Register {
                    name: name.to_string(),
                    email: format!("{}@example.com", name),
                    password: "password".to_owned(),
                })
                .await
                .unwrap();
            ids.push(id);
        }

        Fixture {
            journals: SqliteJournals::new(pool),
            alice: ids[0],
            bob: ids[1],
        }
    }

    async fn category(journals: &SqliteJournals, name: &str) -> i64 {
        journals
            .categories()
            .await
            .unwrap()
            .into_iter()
            .find(|c| c.name == name)
            .unwrap()
            .id
    }

    fn entry(title: &str, category_id: i64, at: time::OffsetDateTime) -> NewJournal {
        NewJournal {
            title: title.to_owned(),
            content: format!("{} happened today", title),
            category_id,
            sentiment: Some("joy".to_owned()),
            at,
        }
    }

    #[tokio::test]
    async fn categories_are_seeded_and_sorted() {
        let f = fixture().await;
        let names = f
            .journals
            .categories()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect::<Vec<_>>();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert!(names.contains(&"Work".to_owned()));
    }

    #[tokio::test]
    async fn create_get_list() {
        let f = fixture().await;
        let work = category(&f.journals, "Work").await;
        let first = f
            .journals
            .create(f.alice, &entry("standup", work, datetime!(2024-01-01 09:00 UTC)))
            .await
            .unwrap();
        let second = f
            .journals
            .create(f.alice, &entry("retro", work, datetime!(2024-01-02 09:00 UTC)))
            .await
            .unwrap();

        let journal = f.journals.get(f.alice, first).await.unwrap();
        assert_eq!(journal.title, "standup");
        assert_eq!(journal.category, "Work");
        assert_eq!(journal.created_at, "2024-01-01 09:00:00");

        let listed = f.journals.list(f.alice).await.unwrap();
        assert_eq!(
            listed.iter().map(|j| j.id).collect::<Vec<_>>(),
            vec![second.0, first.0]
        );
    }

    #[tokio::test]
    async fn entries_are_private() {
        let f = fixture().await;
        let work = category(&f.journals, "Work").await;
        let id = f
            .journals
            .create(f.alice, &entry("secret", work, datetime!(2024-01-01 09:00 UTC)))
            .await
            .unwrap();

        assert!(matches!(
            f.journals.get(f.bob, id).await,
            Err(Error::NotFound)
        ));
        assert!(matches!(
            f.journals.delete(f.bob, id).await,
            Err(Error::NotFound)
        ));
        assert!(matches!(
            f.journals
                .update(f.bob, id, &entry("mine now", work, datetime!(2024-01-02 09:00 UTC)))
                .await,
            Err(Error::NotFound)
        ));
        assert!(f.journals.list(f.bob).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_and_delete() {
        let f = fixture().await;
        let work = category(&f.journals, "Work").await;
        let travel = category(&f.journals, "Travel").await;
        let id = f
            .journals
            .create(f.alice, &entry("trip", work, datetime!(2024-01-01 09:00 UTC)))
            .await
            .unwrap();

        f.journals
            .update(f.alice, id, &entry("trip", travel, datetime!(2024-01-05 12:00 UTC)))
            .await
            .unwrap();
        let journal = f.journals.get(f.alice, id).await.unwrap();
        assert_eq!(journal.category, "Travel");
        assert_eq!(journal.created_at, "2024-01-01 09:00:00");
        assert_eq!(journal.updated_at, "2024-01-05 12:00:00");

        f.journals.delete(f.alice, id).await.unwrap();
        assert!(matches!(
            f.journals.get(f.alice, id).await,
            Err(Error::NotFound)
        ));
    }

    #[tokio::test]
    async fn unknown_category() {
        let f = fixture().await;
        assert!(matches!(
            f.journals
                .create(f.alice, &entry("lost", 9999, datetime!(2024-01-01 09:00 UTC)))
                .await,
            Err(Error::UnknownCategory)
        ));
    }

    #[tokio::test]
    async fn range_is_half_open() {
        let f = fixture().await;
        let work = category(&f.journals, "Work").await;
        for at in &[
            datetime!(2023-12-31 23:59:59 UTC),
            datetime!(2024-01-01 00:00 UTC),
            datetime!(2024-01-31 23:59:59 UTC),
            datetime!(2024-02-01 00:00 UTC),
        ] {
            f.journals
                .create(f.alice, &entry("day", work, *at))
                .await
                .unwrap();
        }
        f.journals
            .create(f.bob, &entry("other", work, datetime!(2024-01-10 00:00 UTC)))
            .await
            .unwrap();

        let range = DateRange::new(date!(2024 - 01 - 01), date!(2024 - 02 - 01)).unwrap();
        let rows = f.journals.entries_between(f.alice, &range).await.unwrap();
        assert_eq!(
            rows.iter().map(|r| r.created_at.as_str()).collect::<Vec<_>>(),
            vec!["2024-01-01 00:00:00", "2024-01-31 23:59:59"]
        );
    }
}
