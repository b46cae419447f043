use crate::journal_storage::NewJournal;
use time::OffsetDateTime;

pub const TITLE_MAX_CHARS: usize = 255;
pub const PASSWORD_MIN_CHARS: usize = 8;

#[derive(serde::Deserialize)]
pub struct Login {
    pub email: String,
    pub password: String,
}

#[derive(serde::Deserialize)]
pub struct Register {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(serde::Deserialize)]
pub struct ChangePassword {
    pub current: String,
    pub new: String,
    pub confirm: String,
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct Journal {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, rename = "categoryId")]
    pub category_id: String,
}

#[derive(serde::Deserialize)]
pub struct ProcessSentiment {
    #[serde(rename = "journalEntry", default)]
    pub journal_entry: String,
}

/// Messages for every field that failed, in field order.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Invalid(pub Vec<&'static str>);

impl Invalid {
    fn check(&mut self, ok: bool, msg: &'static str) {
        if !ok {
            self.0.push(msg);
        }
    }

    fn into_result(self) -> Result<(), Invalid> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl Register {
    pub fn validate(&self) -> Result<(), Invalid> {
        let mut invalid = Invalid::default();
        invalid.check(!self.name.trim().is_empty(), "Name is required");
        invalid.check(self.email.contains('@'), "Email is invalid");
        invalid.check(
            self.password.chars().count() >= PASSWORD_MIN_CHARS,
            "Password must be at least 8 characters",
        );
        invalid.into_result()
    }
}

impl ChangePassword {
    pub fn validate(&self) -> Result<(), Invalid> {
        let mut invalid = Invalid::default();
        invalid.check(
            self.new.chars().count() >= PASSWORD_MIN_CHARS,
            "Password must be at least 8 characters",
        );
        invalid.check(self.new == self.confirm, "Passwords don't match");
        invalid.into_result()
    }
}

impl Journal {
    /// Checks the fields and turns them into an entry stamped `at`.
    pub fn validate(&self, at: OffsetDateTime) -> Result<NewJournal, Invalid> {
        let mut invalid = Invalid::default();
        let title = self.title.trim();
        invalid.check(!title.is_empty(), "Title is required");
        invalid.check(
            title.chars().count() <= TITLE_MAX_CHARS,
            "Title is too long",
        );
        invalid.check(!self.content.trim().is_empty(), "Content is required");
        let category_id = self.category_id.trim().parse::<i64>().ok();
        invalid.check(category_id.is_some(), "Category is required");
        invalid.into_result()?;

        Ok(NewJournal {
            title: title.to_owned(),
            content: self.content.clone(),
            category_id: category_id.unwrap_or_default(),
            sentiment: None,
            at,
        })
    }
}

impl From<&crate::journal_storage::Journal> for Journal {
    fn from(other: &crate::journal_storage::Journal) -> Self {
        Self {
            title: other.title.clone(),
            content: other.content.clone(),
            category_id: other.category_id.to_string(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use time::macros::datetime;

    fn journal(title: &str, content: &str, category_id: &str) -> Journal {
        Journal {
            title: title.to_owned(),
            content: content.to_owned(),
            category_id: category_id.to_owned(),
        }
    }

    #[test]
    fn valid_journal() {
        let at = datetime!(2024-01-01 00:00 UTC);
        let entry = journal("  Monday ", "went for a walk", "3")
            .validate(at)
            .unwrap();
        assert_eq!(entry.title, "Monday");
        assert_eq!(entry.category_id, 3);
        assert_eq!(entry.at, at);
    }

    #[test]
    fn invalid_journal() {
        let at = datetime!(2024-01-01 00:00 UTC);
        assert_eq!(
            journal("", " ", "").validate(at).unwrap_err(),
            Invalid(vec![
                "Title is required",
                "Content is required",
                "Category is required"
            ])
        );
        assert_eq!(
            journal(&"x".repeat(256), "c", "1").validate(at).unwrap_err(),
            Invalid(vec!["Title is too long"])
        );
        assert!(journal(&"é".repeat(255), "c", "1").validate(at).is_ok());
    }

    #[test]
    fn registration() {
        let form = Register {
            name: "a".to_owned(),
            email: "a@b".to_owned(),
            password: "12345678".to_owned(),
        };
        assert!(form.validate().is_ok());
        let form = Register {
            name: " ".to_owned(),
            email: "ab".to_owned(),
            password: "short".to_owned(),
        };
        assert_eq!(form.validate().unwrap_err().0.len(), 3);
    }

    #[test]
    fn change_password() {
        let form = ChangePassword {
            current: "old".to_owned(),
            new: "longenough".to_owned(),
            confirm: "longenougH".to_owned(),
        };
        assert_eq!(
            form.validate().unwrap_err(),
            Invalid(vec!["Passwords don't match"])
        );
    }
}
