use std::error::Error;
use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use log::{info, warn};
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

use postboard::api::{
    Category, CreatePost, HttpTransport, Post, PostsApi, SessionStore, StaticSession, UpdatePost,
};
use postboard::core::config::{self, CliOverrides, ResolvedConfig};
use postboard::core::controller::{PageControls, QueryStateController};
use postboard::core::fetcher::{ListDataFetcher, login};
use postboard::core::query::SortField;
use postboard::core::seed::{DEFAULT_SEED_COUNT, DEFAULT_SEED_PACE, seed_posts};
use postboard::core::session::{FileSessionStore, default_session_path};
use postboard::core::validation::normalize_tags;
use postboard::tui;

#[derive(Parser)]
#[command(name = "postboard", about = "Browse and manage board posts from the terminal")]
struct Args {
    /// API base URL (overrides config and POSTBOARD_BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Posts per page, 1-100
    #[arg(long, global = true)]
    limit: Option<i64>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in and remember the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Print one page of posts without opening the UI
    List {
        #[arg(long)]
        category: Option<Category>,
        #[arg(long)]
        search: Option<String>,
        /// Sort column; repeat the flag to flip to descending
        #[arg(long, value_enum)]
        sort: Vec<SortColumn>,
        /// Earliest creation date (YYYY-MM-DD or RFC 3339)
        #[arg(long)]
        from: Option<String>,
        #[arg(long)]
        to: Option<String>,
        /// Cursor from a previous `list` run
        #[arg(long, conflicts_with = "before")]
        after: Option<String>,
        #[arg(long)]
        before: Option<String>,
    },
    /// Print one post
    Show { id: String },
    /// Create a post
    New {
        #[arg(long)]
        title: String,
        #[arg(long)]
        body: String,
        #[arg(long)]
        category: Category,
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    /// Change fields of a post
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        body: Option<String>,
        #[arg(long)]
        category: Option<Category>,
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    /// Delete a post
    Delete { id: String },
    /// Fill the board with sample posts
    Seed {
        #[arg(long, default_value_t = DEFAULT_SEED_COUNT)]
        count: usize,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SortColumn {
    Title,
    CreatedAt,
}

impl From<SortColumn> for SortField {
    fn from(column: SortColumn) -> Self {
        match column {
            SortColumn::Title => SortField::Title,
            SortColumn::CreatedAt => SortField::CreatedAt,
        }
    }
}

fn init_logging() {
    // File logger in the working directory; stdout belongs to the UI
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();

    if let Ok(log_file) = File::create("postboard.log") {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }
}

fn open_file_session() -> FileSessionStore {
    let path = default_session_path().unwrap_or_else(|| {
        warn!("Could not determine home directory, keeping session in working directory");
        PathBuf::from(".postboard").join("session.json")
    });
    FileSessionStore::open(path)
}

fn print_post(post: &Post) {
    println!("{}  [{}]", post.title, post.category.label());
    println!("id: {}  created: {}", post.id, post.created_at.format("%Y-%m-%d %H:%M"));
    if !post.tags.is_empty() {
        println!("tags: {}", post.tags.join(", "));
    }
    println!();
    println!("{}", post.body);
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    dotenv::dotenv().ok();
    init_logging();

    let file_config = config::load_config()?;
    let resolved: ResolvedConfig = config::resolve(
        &file_config,
        &CliOverrides {
            base_url: args.base_url,
            page_limit: args.limit,
        },
    )?;
    info!(
        "Postboard starting up against {} (limit {})",
        resolved.base_url,
        resolved.page_limit.get()
    );

    // A configured token wins over the login stored on disk
    let file_session = Arc::new(open_file_session());
    let (session, user) = match &resolved.token {
        Some(token) => {
            let session: Arc<dyn SessionStore> = Arc::new(StaticSession::new(Some(token.clone())));
            (session, None)
        }
        None => {
            let session: Arc<dyn SessionStore> = file_session.clone();
            (session, file_session.user().map(|u| u.email))
        }
    };

    let transport: Arc<dyn PostsApi> = Arc::new(HttpTransport::new(
        resolved.base_url.clone(),
        session.clone(),
        resolved.request_timeout,
    )?);
    let fetcher = Arc::new(ListDataFetcher::new(transport.clone(), resolved.cache));

    match args.command {
        None => tui::run(fetcher, resolved.page_limit, user)?,
        Some(Command::Login { email, password }) => {
            let user =
                login(transport.as_ref(), file_session.as_ref(), &email, &password).await?;
            println!("Logged in as {}", user.email);
            if resolved.token.is_some() {
                println!("Note: POSTBOARD_TOKEN / config token still takes precedence.");
            }
        }
        Some(Command::Logout) => {
            file_session.clear();
            println!("Logged out");
        }
        Some(Command::List {
            category,
            search,
            sort,
            from,
            to,
            after,
            before,
        }) => {
            let mut controller = QueryStateController::with_limit(resolved.page_limit);
            for column in sort {
                controller.set_sort(column.into());
            }
            controller.set_category(category);
            if let Some(search) = search {
                controller.set_search_term(search);
                controller.commit_search();
            }
            controller.set_date_range(from, to)?;
            controller.go_to_next_page(after.as_deref());
            controller.go_to_prev_page(before.as_deref());

            let page = fetcher.fetch(controller.params()).await?;
            println!("{}", controller.current().describe());
            for post in &page.items {
                println!(
                    "{}  {:<6}  {}  ({})",
                    post.created_at.format("%Y-%m-%d"),
                    post.category.as_str(),
                    post.title,
                    post.id
                );
            }
            let controls = PageControls::for_page(&page);
            if controls.prev_enabled
                && let Some(cursor) = &page.prev_cursor
            {
                println!("previous page: --before {}", cursor);
            }
            if controls.next_enabled
                && let Some(cursor) = &page.next_cursor
            {
                println!("next page: --after {}", cursor);
            }
        }
        Some(Command::Show { id }) => {
            let post = fetcher.fetch_post(&id).await?;
            print_post(&post);
        }
        Some(Command::New {
            title,
            body,
            category,
            tags,
        }) => {
            let post = fetcher
                .create_post(CreatePost {
                    title,
                    body,
                    category,
                    tags: normalize_tags(tags),
                })
                .await?;
            println!("Created {}", post.id);
        }
        Some(Command::Edit {
            id,
            title,
            body,
            category,
            tags,
        }) => {
            let tags = (!tags.is_empty()).then(|| normalize_tags(tags));
            let post = fetcher
                .update_post(
                    &id,
                    UpdatePost {
                        title,
                        body,
                        category,
                        tags,
                    },
                )
                .await?;
            print_post(&post);
        }
        Some(Command::Delete { id }) => {
            fetcher.delete_post(&id).await?;
            println!("Deleted {}", id);
        }
        Some(Command::Seed { count }) => {
            let created = seed_posts(&fetcher, count, DEFAULT_SEED_PACE).await?;
            println!("Created {} sample posts", created.len());
        }
    }

    Ok(())
}
