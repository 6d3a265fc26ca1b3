//! Post form rules, checked before a create or update request is sent.

use std::fmt;

use crate::api::{CreatePost, UpdatePost};

pub const MAX_TITLE_CHARS: usize = 200;
pub const MAX_BODY_CHARS: usize = 10_000;
pub const MAX_TAGS: usize = 10;

/// Words the board does not accept in titles or bodies.
const FORBIDDEN_WORDS: [&str; 4] = ["캄보디아", "프놈펜", "불법체류", "텔레그램"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    EmptyTitle,
    TitleTooLong(usize),
    EmptyBody,
    BodyTooLong(usize),
    ForbiddenWord {
        field: &'static str,
        word: &'static str,
    },
    TooManyTags(usize),
    /// An update with no fields set.
    NoChanges,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyTitle => write!(f, "title is required"),
            ValidationError::TitleTooLong(n) => {
                write!(f, "title is {n} characters, at most {MAX_TITLE_CHARS} allowed")
            }
            ValidationError::EmptyBody => write!(f, "body is required"),
            ValidationError::BodyTooLong(n) => {
                write!(f, "body is {n} characters, at most {MAX_BODY_CHARS} allowed")
            }
            ValidationError::ForbiddenWord { field, word } => {
                write!(f, "{field} contains a forbidden word ({word})")
            }
            ValidationError::TooManyTags(n) => {
                write!(f, "{n} tags given, at most {MAX_TAGS} allowed")
            }
            ValidationError::NoChanges => write!(f, "update must change at least one field"),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Returns the first forbidden word found in `text`.
pub fn find_forbidden_word(text: &str) -> Option<&'static str> {
    FORBIDDEN_WORDS.iter().copied().find(|word| text.contains(word))
}

fn check_title(title: &str) -> Result<(), ValidationError> {
    let len = title.chars().count();
    if title.is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    if len > MAX_TITLE_CHARS {
        return Err(ValidationError::TitleTooLong(len));
    }
    match find_forbidden_word(title) {
        Some(word) => Err(ValidationError::ForbiddenWord {
            field: "title",
            word,
        }),
        None => Ok(()),
    }
}

fn check_body(body: &str) -> Result<(), ValidationError> {
    let len = body.chars().count();
    if body.is_empty() {
        return Err(ValidationError::EmptyBody);
    }
    if len > MAX_BODY_CHARS {
        return Err(ValidationError::BodyTooLong(len));
    }
    match find_forbidden_word(body) {
        Some(word) => Err(ValidationError::ForbiddenWord { field: "body", word }),
        None => Ok(()),
    }
}

fn check_tags(tags: &[String]) -> Result<(), ValidationError> {
    if tags.len() > MAX_TAGS {
        return Err(ValidationError::TooManyTags(tags.len()));
    }
    Ok(())
}

/// Trims tags, drops blanks and duplicates, keeping first-seen order.
pub fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
    }
    out
}

pub fn validate_create(post: &CreatePost) -> Result<(), ValidationError> {
    check_title(&post.title)?;
    check_body(&post.body)?;
    check_tags(&post.tags)
}

pub fn validate_update(post: &UpdatePost) -> Result<(), ValidationError> {
    if post.is_empty() {
        return Err(ValidationError::NoChanges);
    }
    if let Some(title) = &post.title {
        check_title(title)?;
    }
    if let Some(body) = &post.body {
        check_body(body)?;
    }
    if let Some(tags) = &post.tags {
        check_tags(tags)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Category;

    fn draft() -> CreatePost {
        CreatePost {
            title: "Weekly notice".to_string(),
            body: "The office is closed on Friday.".to_string(),
            category: Category::Notice,
            tags: vec!["office".to_string()],
        }
    }

    #[test]
    fn test_valid_draft_passes() {
        assert_eq!(validate_create(&draft()), Ok(()));
    }

    #[test]
    fn test_empty_title_rejected() {
        let post = CreatePost {
            title: String::new(),
            ..draft()
        };
        assert_eq!(validate_create(&post), Err(ValidationError::EmptyTitle));
    }

    #[test]
    fn test_whitespace_counts_as_content() {
        let post = CreatePost {
            title: " ".to_string(),
            body: "\n".to_string(),
            ..draft()
        };
        assert_eq!(validate_create(&post), Ok(()));

        let post = CreatePost {
            body: String::new(),
            ..draft()
        };
        assert_eq!(validate_create(&post), Err(ValidationError::EmptyBody));
    }

    #[test]
    fn test_title_length_counts_characters_not_bytes() {
        let post = CreatePost {
            title: "가".repeat(MAX_TITLE_CHARS),
            ..draft()
        };
        assert_eq!(validate_create(&post), Ok(()));

        let post = CreatePost {
            title: "가".repeat(MAX_TITLE_CHARS + 1),
            ..draft()
        };
        assert_eq!(
            validate_create(&post),
            Err(ValidationError::TitleTooLong(MAX_TITLE_CHARS + 1))
        );
    }

    #[test]
    fn test_body_too_long_rejected() {
        let post = CreatePost {
            body: "a".repeat(MAX_BODY_CHARS + 1),
            ..draft()
        };
        assert_eq!(
            validate_create(&post),
            Err(ValidationError::BodyTooLong(MAX_BODY_CHARS + 1))
        );
    }

    #[test]
    fn test_forbidden_word_in_body_rejected() {
        let post = CreatePost {
            body: "연락은 텔레그램으로".to_string(),
            ..draft()
        };
        assert_eq!(
            validate_create(&post),
            Err(ValidationError::ForbiddenWord {
                field: "body",
                word: "텔레그램"
            })
        );
    }

    #[test]
    fn test_too_many_tags_rejected() {
        let post = CreatePost {
            tags: (0..11).map(|i| format!("t{i}")).collect(),
            ..draft()
        };
        assert_eq!(validate_create(&post), Err(ValidationError::TooManyTags(11)));
    }

    #[test]
    fn test_empty_update_rejected() {
        assert_eq!(
            validate_update(&UpdatePost::default()),
            Err(ValidationError::NoChanges)
        );
    }

    #[test]
    fn test_update_checks_only_present_fields() {
        let update = UpdatePost {
            category: Some(Category::Free),
            ..Default::default()
        };
        assert_eq!(validate_update(&update), Ok(()));

        let update = UpdatePost {
            title: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(validate_update(&update), Err(ValidationError::EmptyTitle));
    }

    #[test]
    fn test_normalize_tags() {
        let tags = vec![
            " rust ".to_string(),
            "".to_string(),
            "rust".to_string(),
            "tui".to_string(),
        ];
        assert_eq!(normalize_tags(tags), vec!["rust".to_string(), "tui".to_string()]);
    }
}
