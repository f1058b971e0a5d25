//! Parsers for the catalog data directory.
//!
//! - users.dat: userId::username::email
//! - ratings.dat: userId::courseId::rating::feedback
//! - enrollments.dat: userId::courseId::enrolledAt::topic|topic|...
//! - courses.json: JSON array of courses
//!
//! Feedback and topic lists are the tail of the line, so they may be empty.

use crate::error::{CatalogError, Result};
use crate::types::*;
use std::fs;
use std::path::Path;

pub const FIELD_SEPARATOR: &str = "::";
pub const TOPIC_SEPARATOR: char = '|';

/// Read a file into owned lines, mapping a missing file to `FileNotFound`
fn read_lines(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => CatalogError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => CatalogError::IoError(e),
    })?;
    Ok(content.lines().map(|s| s.to_string()).collect())
}

/// Pull the next field off a `::`-split line
fn next_field<'a>(
    parts: &mut impl Iterator<Item = &'a str>,
    file: &str,
    line: usize,
    name: &str,
) -> Result<&'a str> {
    parts.next().ok_or_else(|| CatalogError::ParseError {
        file: file.to_string(),
        line,
        reason: format!("Missing {}", name),
    })
}

fn parse_number<T>(value: &str, file: &str, line: usize, name: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e| CatalogError::ParseError {
        file: file.to_string(),
        line,
        reason: format!("Invalid {}: {}", name, e),
    })
}

/// Iterate non-empty lines with 1-based line numbers
fn data_lines(lines: &[String]) -> impl Iterator<Item = (usize, &str)> {
    lines
        .iter()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim_end_matches('\r')))
        .filter(|(_, line)| !line.trim().is_empty())
}

/// Parse the users.dat file
pub fn parse_users(path: &Path) -> Result<Vec<User>> {
    let file = "users.dat";
    let lines = read_lines(path)?;
    let mut users = Vec::new();

    for (line_no, line) in data_lines(&lines) {
        let mut parts = line.trim().splitn(3, FIELD_SEPARATOR);

        let user_id = next_field(&mut parts, file, line_no, "userId")?;
        let username = next_field(&mut parts, file, line_no, "username")?;
        let email = next_field(&mut parts, file, line_no, "email")?;

        if username.trim().is_empty() {
            return Err(CatalogError::ParseError {
                file: file.to_string(),
                line: line_no,
                reason: "Empty username".to_string(),
            });
        }

        users.push(User {
            id: parse_number(user_id, file, line_no, "userId")?,
            username: username.trim().to_string(),
            email: email.trim().to_string(),
        });
    }

    Ok(users)
}

/// Parse the ratings.dat file
pub fn parse_ratings(path: &Path) -> Result<Vec<Rating>> {
    let file = "ratings.dat";
    let lines = read_lines(path)?;
    let mut ratings = Vec::new();

    for (line_no, line) in data_lines(&lines) {
        let mut parts = line.splitn(4, FIELD_SEPARATOR);

        let user_id = next_field(&mut parts, file, line_no, "userId")?;
        let course_id = next_field(&mut parts, file, line_no, "courseId")?;
        let rating_value = next_field(&mut parts, file, line_no, "rating")?;
        let feedback = parts.next().unwrap_or("");

        let rating = Rating::new(
            parse_number(user_id, file, line_no, "userId")?,
            parse_number(course_id, file, line_no, "courseId")?,
            parse_number(rating_value, file, line_no, "rating")?,
        )
        .with_feedback(feedback);

        ratings.push(rating);
    }

    Ok(ratings)
}

/// Parse the enrollments.dat file
pub fn parse_enrollments(path: &Path) -> Result<Vec<Enrollment>> {
    let file = "enrollments.dat";
    let lines = read_lines(path)?;
    let mut enrollments = Vec::new();

    for (line_no, line) in data_lines(&lines) {
        let mut parts = line.splitn(4, FIELD_SEPARATOR);

        let user_id = next_field(&mut parts, file, line_no, "userId")?;
        let course_id = next_field(&mut parts, file, line_no, "courseId")?;
        let enrolled_at = next_field(&mut parts, file, line_no, "enrolledAt")?;
        let topics = parts.next().unwrap_or("");

        enrollments.push(Enrollment {
            user_id: parse_number(user_id, file, line_no, "userId")?,
            course_id: parse_number(course_id, file, line_no, "courseId")?,
            enrolled_at: parse_number(enrolled_at, file, line_no, "enrolledAt")?,
            completed_topics: parse_topics(topics),
        });
    }

    Ok(enrollments)
}

/// Parse the courses.json file
pub fn parse_courses(path: &Path) -> Result<Vec<Course>> {
    let content = fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => CatalogError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => CatalogError::IoError(e),
    })?;
    let courses: Vec<Course> = serde_json::from_str(&content)?;
    Ok(courses)
}

fn parse_topics(s: &str) -> Vec<String> {
    s.split(TOPIC_SEPARATOR)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Convert a legacy resource blob into an ordered list of links.
///
/// Surrounding whitespace and quotes are stripped, then entries are split on
/// an escaped `\n` sequence, real newlines or `|`.
///
/// Example: `"\"https://a\\nhttps://b\""` -> `["https://a", "https://b"]`
pub fn parse_resource_list(blob: &str) -> Vec<String> {
    let cleaned = blob.trim().trim_matches('"');
    cleaned
        .split("\\n")
        .flat_map(|chunk| chunk.split(['\n', '|']))
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string)
        .collect()
}
