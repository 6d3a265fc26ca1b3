use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Board a post belongs to. Serialized in upper case on the wire.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Category {
    Notice,
    Qna,
    Free,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Notice, Category::Qna, Category::Free];

    /// Wire value, also used as the `category` query parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Notice => "NOTICE",
            Category::Qna => "QNA",
            Category::Free => "FREE",
        }
    }

    /// Human-readable label for display
    pub fn label(self) -> &'static str {
        match self {
            Category::Notice => "Notice",
            Category::Qna => "Q&A",
            Category::Free => "Free",
        }
    }

    /// Cycles an optional filter: all → NOTICE → QNA → FREE → all.
    pub fn cycle(current: Option<Category>) -> Option<Category> {
        match current {
            None => Some(Category::Notice),
            Some(Category::Notice) => Some(Category::Qna),
            Some(Category::Qna) => Some(Category::Free),
            Some(Category::Free) => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NOTICE" => Ok(Category::Notice),
            "QNA" => Ok(Category::Qna),
            "FREE" => Ok(Category::Free),
            other => Err(format!("unknown category '{other}' (expected NOTICE, QNA or FREE)")),
        }
    }
}

/// A post as returned by the API. Read-only to the client.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub body: String,
    pub category: Category,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// One page of the post listing.
///
/// Items keep the server's order. An absent cursor means there is no page in
/// that direction.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListPage {
    pub items: Vec<Post>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_cursor: Option<String>,
}

impl ListPage {
    pub fn has_next(&self) -> bool {
        self.next_cursor.is_some()
    }

    pub fn has_prev(&self) -> bool {
        self.prev_cursor.is_some()
    }
}

/// Body of `POST /posts`.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct CreatePost {
    pub title: String,
    pub body: String,
    pub category: Category,
    pub tags: Vec<String>,
}

/// Body of `PATCH /posts/:id`. Unset fields are left untouched by the server.
#[derive(Serialize, Debug, Clone, PartialEq, Default)]
pub struct UpdatePost {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl UpdatePost {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.body.is_none() && self.category.is_none() && self.tags.is_none()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DeletePostResponse {
    pub ok: bool,
    pub deleted: u32,
}

#[derive(Serialize, Debug, Clone)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct User {
    pub id: String,
    pub email: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}
