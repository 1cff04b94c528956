//! blogsync CLI
//!
//! Browse the blog, like and comment on posts, and submit site forms from
//! the terminal.

use std::path::PathBuf;
use std::sync::Arc;

use blogsync::{
    error::{AppError, Result},
    models::{Config, ContactForm},
    pipeline::{self, CommentTarget, Context, NewsletterAction},
    services::{FormOutcome, PostFilter, identity},
    storage::LocalStorage,
};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};

/// blogsync - Blog client for the content site
#[derive(Parser, Debug)]
#[command(name = "blogsync", version, about = "Blog, likes, comments and forms client")]
struct Cli {
    /// Path to storage directory holding config.toml and local state
    #[arg(short, long, default_value = "storage")]
    storage_dir: PathBuf,

    /// Override the API base URL from config
    #[arg(long)]
    api_url: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List blog posts
    Posts {
        /// Case-insensitive text search
        #[arg(long)]
        search: Option<String>,

        /// Exact category, or "all"
        #[arg(long)]
        category: Option<String>,

        /// Earliest date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Latest date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,

        /// Only posts from the configured recent window
        #[arg(long)]
        recent: bool,

        #[arg(long, default_value_t = 1)]
        page: usize,
    },

    /// Show one post by id or slug
    Show {
        identifier: String,

        /// Also load the comment thread
        #[arg(long)]
        comments: bool,
    },

    /// Toggle your like on a post
    Like { identifier: String },

    /// Show the comment thread of a post
    Comments { identifier: String },

    /// Comment on a post
    Comment {
        identifier: String,

        text: String,

        /// Reply to this comment id instead
        #[arg(long)]
        reply_to: Option<i64>,
    },

    /// Remember a display name for likes and comments
    Login { name: String },

    /// Forget the remembered name
    Logout,

    /// Show the remembered name
    Whoami,

    /// Send the contact form
    Contact {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        phone: Option<String>,

        #[arg(long)]
        subject: Option<String>,

        #[arg(long)]
        message: String,

        /// Token from a solved captcha challenge
        #[arg(long)]
        captcha_token: Option<String>,
    },

    /// Subscribe to the newsletter
    Subscribe {
        email: String,

        /// Token from a solved captcha challenge
        #[arg(long)]
        captcha_token: Option<String>,
    },

    /// Unsubscribe from the newsletter
    Unsubscribe { email: String },

    /// Like counts for every post
    Likes,

    /// Validate configuration
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn report(outcome: FormOutcome) -> Result<()> {
    match outcome {
        FormOutcome::Sent => println!("Sent."),
        FormOutcome::Simulated => println!("Sent (backend unreachable, delivery simulated)."),
        FormOutcome::CaptchaRequired => {
            return Err(AppError::validation(
                "captcha verification required (--captcha-token)",
            ));
        }
        FormOutcome::Invalid(errors) => {
            for error in &errors {
                println!("  {}: {}", error.field, error.message);
            }
            return Err(AppError::validation("form has invalid fields"));
        }
        FormOutcome::Failed(message) => return Err(AppError::api("form", None, message)),
    }
    Ok(())
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli.storage_dir.join("config.toml");
    let mut config = Config::load_or_default(&config_path);
    if let Some(url) = cli.api_url {
        config.api.base_url = url;
    }
    log::debug!("API base URL: {}", config.api.base_url);

    if let Command::Validate = cli.command {
        log::info!("Validating configuration...");
        if let Err(e) = config.validate() {
            log::error!("Config validation failed: {}", e);
            return Err(e);
        }
        log::info!("✓ Config OK");
        return Ok(());
    }

    let store = Arc::new(LocalStorage::new(&cli.storage_dir));
    let ctx = Context::new(config, store.clone())?;

    match cli.command {
        Command::Posts {
            search,
            category,
            from,
            to,
            recent,
            page,
        } => {
            let filter = PostFilter {
                search,
                category,
                from,
                to,
                recent_days: recent.then_some(ctx.config.blog.recent_days),
            };
            let today = Local::now().date_naive();
            let result = pipeline::run_posts(&ctx, &filter, page, today).await?;
            for post in &result.items {
                println!("{:>5}  {}  [{}]  {}", post.id, post.date, post.category, post.title);
                println!("       {}  ({} likes, {} comments)", post.slug, post.likes_count, post.comments_count);
            }
            println!("Page {}/{} ({} posts)", result.page, result.total_pages, result.total_items);
        }

        Command::Show {
            identifier,
            comments,
        } => {
            let snapshot = pipeline::run_show(&ctx, &identifier, comments).await?;
            if let Some(post) = &snapshot.post {
                println!("{}\n{} | {}\n", post.title, post.date, post.category);
                for section in &post.content {
                    if !section.subtitle.is_empty() {
                        println!("## {}", section.subtitle);
                    }
                    for paragraph in &section.paragraphs {
                        println!("{paragraph}\n");
                    }
                }
                let heart = if snapshot.liked { "♥" } else { "♡" };
                println!("{} {} likes", heart, snapshot.like_count);
            }
            if comments {
                print_comments(&snapshot.comments);
            }
        }

        Command::Like { identifier } => {
            pipeline::require_user(&ctx).await?;
            let result = pipeline::run_like(&ctx, &identifier).await?;
            let state = if result.liked { "liked" } else { "not liked" };
            println!("{} ({} likes)", state, result.like_count);
        }

        Command::Comments { identifier } => {
            let snapshot = pipeline::run_show(&ctx, &identifier, true).await?;
            print_comments(&snapshot.comments);
        }

        Command::Comment {
            identifier,
            text,
            reply_to,
        } => {
            pipeline::require_user(&ctx).await?;
            let target = reply_to.map_or(CommentTarget::Post, CommentTarget::ReplyTo);
            if pipeline::run_comment(&ctx, &identifier, target, &text).await? {
                println!("Comment posted.");
            } else {
                return Err(AppError::api("comment", None, "comment was not saved"));
            }
        }

        Command::Login { name } => {
            let user = identity::remember(&*store, &name).await?;
            println!("Signed in as {} ({})", user.name, user.id);
        }

        Command::Logout => {
            identity::forget(&*store).await?;
            println!("Signed out.");
        }

        Command::Whoami => match ctx.user().await {
            Some(user) => println!("{} ({})", user.name, user.id),
            None => println!("No name remembered. Use `blogsync login <name>`."),
        },

        Command::Contact {
            name,
            email,
            phone,
            subject,
            message,
            captcha_token,
        } => {
            let form = ContactForm {
                name,
                email,
                phone,
                subject,
                message,
            };
            let outcome = pipeline::run_contact(&ctx, &form, captcha_token.as_deref()).await?;
            report(outcome)?;
        }

        Command::Subscribe {
            email,
            captcha_token,
        } => {
            let outcome = pipeline::run_newsletter(
                &ctx,
                &email,
                NewsletterAction::Subscribe,
                captcha_token.as_deref(),
            )
            .await?;
            report(outcome)?;
        }

        Command::Unsubscribe { email } => {
            let outcome = pipeline::run_newsletter(&ctx, &email, NewsletterAction::Unsubscribe, None).await?;
            report(outcome)?;
        }

        Command::Likes => {
            for row in pipeline::run_like_counts(&ctx).await? {
                let mark = match row.liked {
                    Some(true) => "♥",
                    Some(false) => "♡",
                    None => " ",
                };
                println!("{:>5}  {} {:>5}  {}", row.id, mark, row.likes_count, row.slug);
            }
        }

        // Handled before the context is built
        Command::Validate => {}
    }

    ctx.flush().await;
    Ok(())
}

fn print_comments(comments: &[blogsync::models::Comment]) {
    if comments.is_empty() {
        println!("No comments yet.");
        return;
    }
    for comment in comments {
        let heart = if comment.is_liked { "♥" } else { "♡" };
        println!(
            "[{}] {} ({}) {} {}\n    {}",
            comment.id, comment.author.name, comment.date, heart, comment.likes, comment.text
        );
        for reply in &comment.replies {
            println!("    ↳ [{}] {}: {}", reply.id, reply.author.name, reply.text);
        }
    }
}
