//! Sample posts for filling an empty board.
//!
//! Posts are built round-robin from fixed pools, so `count` posts always cover
//! every category and the generated titles are numbered `#1..=#count`.

use std::time::Duration;

use log::info;

use crate::api::{Category, CreatePost, FetchError, Post};
use crate::core::fetcher::ListDataFetcher;

pub const DEFAULT_SEED_COUNT: usize = 25;

/// Pause between create requests so the API's rate limit is not tripped.
pub const DEFAULT_SEED_PACE: Duration = Duration::from_millis(100);

const CATEGORIES: [Category; 3] = [Category::Notice, Category::Qna, Category::Free];

const TITLES: [&str; 20] = [
    "Release notes for the spring update",
    "How do I invalidate a cached query?",
    "Where should we go for lunch today?",
    "What is new in the latest compiler",
    "Comparing two CSS frameworks",
    "We are hiring frontend engineers",
    "When to reach for a reducer",
    "Stuck on a build error, any ideas?",
    "Plans for the weekend?",
    "Setting environment variables on deploy",
    "Notes on concurrent rendering",
    "Sharing our lint configuration",
    "Code review request",
    "Lunch hour is moving",
    "Which branching strategy do you use?",
    "Editor extensions worth installing",
    "Mentoring sign-up for new developers",
    "Speeding up slow API responses",
    "Weekly meeting schedule",
    "Writing better unit tests",
];

const BODIES: [&str; 5] = [
    "Details are in the post body. Feedback is welcome.",
    "I could not figure this part out. Can anyone help?",
    "I would like to hear what everyone thinks!",
    "Links and example code are attached below.",
    "Posting this so we can discuss it together.",
];

const TAGS: [&[&str]; 8] = [
    &["react", "nextjs"],
    &["typescript", "javascript"],
    &["css", "styling"],
    &["backend", "api"],
    &["git", "github"],
    &["testing", "jest"],
    &["performance", "optimization"],
    &["free-talk"],
];

/// Builds `count` sample posts.
pub fn sample_posts(count: usize) -> Vec<CreatePost> {
    (0..count)
        .map(|i| CreatePost {
            title: format!("{} #{}", TITLES[i % TITLES.len()], i + 1),
            body: BODIES[i % BODIES.len()].to_string(),
            category: CATEGORIES[i % CATEGORIES.len()],
            tags: TAGS[i % TAGS.len()].iter().map(|t| t.to_string()).collect(),
        })
        .collect()
}

/// Creates `count` sample posts one after another, waiting `pace` between
/// requests. Stops at the first failure.
pub async fn seed_posts(
    fetcher: &ListDataFetcher,
    count: usize,
    pace: Duration,
) -> Result<Vec<Post>, FetchError> {
    info!("Seeding {} sample posts", count);
    let mut created = Vec::with_capacity(count);
    for (i, post) in sample_posts(count).into_iter().enumerate() {
        if i > 0 && !pace.is_zero() {
            tokio::time::sleep(pace).await;
        }
        created.push(fetcher.create_post(post).await?);
    }
    info!("Seeded {} posts", created.len());
    Ok(created)
}
