//! Persist a CatalogIndex back to its data directory.
//!
//! The output round-trips through `CatalogIndex::load_from_dir`. Usernames,
//! emails and completed topics must not contain their file's separators;
//! saving fails on such a value rather than altering it. Newlines in rating
//! feedback are flattened to spaces so every record stays on one line.

use crate::error::{CatalogError, Result};
use crate::index::{COURSES_FILE, ENROLLMENTS_FILE, RATINGS_FILE, USERS_FILE};
use crate::parser::{FIELD_SEPARATOR, TOPIC_SEPARATOR};
use crate::types::*;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

fn single_line(s: &str) -> String {
    s.replace(['\r', '\n'], " ")
}

fn unstorable(field: &str, value: &str) -> CatalogError {
    CatalogError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
    }
}

/// Check that `value` fits in one `::`-separated field of a data file
pub fn check_field(field: &str, value: &str) -> Result<()> {
    if value.contains(FIELD_SEPARATOR) || value.contains(['\r', '\n']) {
        return Err(unstorable(field, value));
    }
    Ok(())
}

/// Check that a completed topic survives the `|`-joined topic list
pub fn check_topic(topic: &str) -> Result<()> {
    if topic.contains([TOPIC_SEPARATOR, '\r', '\n']) {
        return Err(unstorable("topic", topic));
    }
    Ok(())
}

pub fn format_user(user: &User) -> Result<String> {
    check_field("username", &user.username)?;
    check_field("email", &user.email)?;
    Ok(format!("{}::{}::{}", user.id, user.username, user.email))
}

pub fn format_rating(rating: &Rating) -> String {
    format!(
        "{}::{}::{}::{}",
        rating.user_id,
        rating.course_id,
        rating.rating,
        single_line(rating.feedback.as_deref().unwrap_or(""))
    )
}

pub fn format_enrollment(enrollment: &Enrollment) -> Result<String> {
    for topic in &enrollment.completed_topics {
        check_topic(topic)?;
    }
    Ok(format!(
        "{}::{}::{}::{}",
        enrollment.user_id,
        enrollment.course_id,
        enrollment.enrolled_at,
        enrollment.completed_topics.join("|")
    ))
}

fn join_lines<'a, T: 'a>(
    items: impl Iterator<Item = &'a T>,
    format: impl Fn(&T) -> Result<String>,
) -> Result<String> {
    let mut out = String::new();
    for item in items {
        let _ = writeln!(out, "{}", format(item)?);
    }
    Ok(out)
}

impl CatalogIndex {
    /// Write every data file into `data_dir`, creating it if needed.
    ///
    /// All files are rendered before anything touches the disk, then staged
    /// as `*.tmp` siblings and renamed over the originals. A value that
    /// cannot be stored leaves the directory untouched.
    pub fn save_to_dir(&self, data_dir: &Path) -> Result<()> {
        let courses: Vec<&Course> = self.courses().collect();
        let contents = [
            (COURSES_FILE, serde_json::to_string_pretty(&courses)?),
            (USERS_FILE, join_lines(self.users().into_iter(), format_user)?),
            (
                RATINGS_FILE,
                join_lines(self.ratings(), |r: &Rating| Ok(format_rating(r)))?,
            ),
            (
                ENROLLMENTS_FILE,
                join_lines(self.enrollments(), format_enrollment)?,
            ),
        ];

        fs::create_dir_all(data_dir)?;

        let mut staged: Vec<(PathBuf, PathBuf)> = Vec::with_capacity(contents.len());
        for (name, content) in &contents {
            let target = data_dir.join(name);
            let tmp = data_dir.join(format!("{}.tmp", name));
            if let Err(e) = fs::write(&tmp, content) {
                discard(&staged);
                let _ = fs::remove_file(&tmp);
                return Err(e.into());
            }
            staged.push((tmp, target));
        }

        for (tmp, target) in &staged {
            fs::rename(tmp, target)?;
        }
        debug!("Renamed {} staged files into {:?}", staged.len(), data_dir);

        let (users, courses, ratings, enrollments) = self.counts();
        info!(
            "Saved catalog to {:?} ({} users, {} courses, {} ratings, {} enrollments)",
            data_dir, users, courses, ratings, enrollments
        );
        Ok(())
    }
}

fn discard(staged: &[(PathBuf, PathBuf)]) {
    for (tmp, _) in staged {
        let _ = fs::remove_file(tmp);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_rating_flattens_feedback() {
        let rating = Rating::new(1, 2, 4).with_feedback("good\nvery good");
        assert_eq!(format_rating(&rating), "1::2::4::good very good");
        assert_eq!(format_rating(&Rating::new(1, 2, 4)), "1::2::4::");
    }

    #[test]
    fn test_format_user_rejects_separators() {
        let mut user = User {
            id: 3,
            username: "bob::x".to_string(),
            email: "bob@example.com".to_string(),
        };
        assert!(matches!(
            format_user(&user),
            Err(CatalogError::InvalidValue { .. })
        ));

        user.username = "bob".to_string();
        user.email = "bob@\nexample.com".to_string();
        assert!(format_user(&user).is_err());

        user.email = "bob@example.com".to_string();
        assert_eq!(format_user(&user).unwrap(), "3::bob::bob@example.com");
    }

    #[test]
    fn test_format_enrollment_rejects_topic_separator() {
        let mut enrollment = Enrollment {
            user_id: 1,
            course_id: 2,
            enrolled_at: 7,
            completed_topics: vec!["A|B".to_string()],
        };
        assert!(format_enrollment(&enrollment).is_err());

        enrollment.completed_topics = vec!["A".to_string(), "B::C".to_string()];
        assert_eq!(format_enrollment(&enrollment).unwrap(), "1::2::7::A|B::C");
    }

    #[test]
    fn test_save_then_load() {
        let mut index = CatalogIndex::new();
        index.insert_user(User {
            id: 1,
            username: "ada".to_string(),
            email: "ada@example.com".to_string(),
        });
        let mut course = Course::new(1, "Rust Basics").with_syllabus("ownership borrowing");
        course.resources = vec!["https://doc.rust-lang.org/book/".to_string()];
        index.insert_course(course.clone());
        index
            .upsert_rating(Rating::new(1, 1, 5).with_feedback("Loved it"))
            .unwrap();
        index
            .set_completed_topics(1, 1, vec!["Ownership".to_string()], 42)
            .unwrap();

        let dir = std::env::temp_dir().join(format!("catalog-writer-{}", std::process::id()));
        index.save_to_dir(&dir).unwrap();
        assert!(!dir.join(format!("{}.tmp", USERS_FILE)).exists());

        let loaded = CatalogIndex::load_from_dir(&dir).unwrap();
        assert_eq!(loaded.counts(), (1, 1, 1, 1));
        assert_eq!(loaded.get_course(1), Some(&course));
        assert_eq!(
            loaded.get_rating(1, 1).and_then(|r| r.feedback.as_deref()),
            Some("Loved it")
        );
        assert_eq!(
            loaded.get_enrollment(1, 1).map(|e| e.completed_topics.clone()),
            Some(vec!["Ownership".to_string()])
        );
    }

    #[test]
    fn test_unstorable_value_leaves_directory_untouched() {
        let dir = std::env::temp_dir().join(format!("catalog-writer-bad-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);

        let mut index = CatalogIndex::new();
        index.insert_course(Course::new(1, "Rust Basics"));
        index.insert_user(User {
            id: 1,
            username: "ada".to_string(),
            email: "ada@example.com".to_string(),
        });
        index.save_to_dir(&dir).unwrap();
        let before = fs::read_to_string(dir.join(USERS_FILE)).unwrap();

        index
            .set_completed_topics(1, 1, vec!["Ownership|Borrowing".to_string()], 1)
            .unwrap();
        index.insert_course(Course::new(2, "Design Systems"));
        assert!(index.save_to_dir(&dir).is_err());

        assert_eq!(fs::read_to_string(dir.join(USERS_FILE)).unwrap(), before);
        assert_eq!(CatalogIndex::load_from_dir(&dir).unwrap().counts(), (1, 1, 0, 0));
        let _ = fs::remove_dir_all(&dir);
    }
}
