// src/bin/portfolio_cli.rs
// DOCUMENTATION: Command-line consumer of the portfolio API
// PURPOSE: Browse projects and posts with the site's search/filter/pagination rules,
// inspect settings and dashboard stats, and hash admin passwords for seeding

use anyhow::{bail, Context, Result};
use dotenv::dotenv;
use portfolio_api::client::PortfolioClient;
use portfolio_api::models::{BlogPostResponse, BlogQuery, ProjectQuery, ProjectResponse};
use portfolio_api::services::hash_password;
use portfolio_api::services::listing::{categories, filter_items, paginate, PageRequest};
use std::env;
use std::time::Instant;

// --- ANSI colours ---
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const DIM: &str = "\x1b[2m";

const CLI_PER_PAGE: i64 = 6;

/// Positional filters shared by `projects` and `blog`
struct ListArgs {
    search: Option<String>,
    category: Option<String>,
    page: i64,
}

impl ListArgs {
    fn parse(args: &[String]) -> Result<Self> {
        let page = match args.get(2) {
            Some(raw) => raw
                .parse::<i64>()
                .with_context(|| format!("page must be a number, got '{}'", raw))?,
            None => 1,
        };
        Ok(Self {
            search: args.first().cloned().filter(|s| !s.is_empty()),
            category: args.get(1).cloned(),
            page,
        })
    }
}

struct Cli {
    client: PortfolioClient,
}

impl Cli {
    async fn health(&self) -> Result<()> {
        println!("{}🔍 Checking service status at {}...{}", CYAN, self.client.base_url(), RESET);
        let started = Instant::now();
        let body = self.client.health().await.context("service unavailable")?;
        println!(
            "{}✅ {} v{} is {} ({}ms){}",
            GREEN,
            body["service"].as_str().unwrap_or("portfolio-api"),
            body["version"].as_str().unwrap_or("?"),
            body["status"].as_str().unwrap_or("unknown"),
            started.elapsed().as_millis(),
            RESET
        );
        Ok(())
    }

    async fn projects(&self, args: ListArgs) -> Result<()> {
        let all = self
            .client
            .all_projects(&ProjectQuery::default())
            .await
            .context("could not load projects")?;

        print_categories(&categories(&all));
        let filtered: Vec<ProjectResponse> = filter_items(&all, args.search.as_deref(), args.category.as_deref())
            .into_iter()
            .cloned()
            .collect();
        let (page, pagination) = paginate(&filtered, PageRequest::new(Some(args.page), Some(CLI_PER_PAGE)));

        if page.is_empty() {
            println!("{}No projects match.{}", YELLOW, RESET);
        }
        for item in &page {
            let star = if item.project.featured { "★" } else { " " };
            println!(
                "{}{} {:<32}{} {:<14} {:<12} {}{}{}",
                BOLD,
                star,
                item.project.title,
                RESET,
                item.project.category,
                item.project.status,
                DIM,
                item.technologies.join(", "),
                RESET
            );
        }
        print_pagination(pagination.page, pagination.total_pages, pagination.total);
        Ok(())
    }

    async fn blog(&self, args: ListArgs) -> Result<()> {
        let all = self
            .client
            .all_blog_posts(&BlogQuery::default())
            .await
            .context("could not load blog posts")?;

        print_categories(&categories(&all));
        let filtered: Vec<BlogPostResponse> = filter_items(&all, args.search.as_deref(), args.category.as_deref())
            .into_iter()
            .cloned()
            .collect();
        let (page, pagination) = paginate(&filtered, PageRequest::new(Some(args.page), Some(CLI_PER_PAGE)));

        if page.is_empty() {
            println!("{}No posts match.{}", YELLOW, RESET);
        }
        for post in &page {
            let published = post
                .published_at
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "unpublished".to_string());
            println!(
                "{}{:<40}{} {:<14} {:>3} min {:>6} views  {}{}{}",
                BOLD, post.title, RESET, post.category, post.read_time, post.views, DIM, published, RESET
            );
        }
        print_pagination(pagination.page, pagination.total_pages, pagination.total);
        Ok(())
    }

    async fn settings(&self) -> Result<()> {
        let settings = self.client.settings().await.context("could not load settings")?;
        println!("{}⚙️  Public settings{}", BOLD, RESET);
        for (key, value) in &settings {
            println!("  {:<28} {}", key, value.as_deref().unwrap_or("-"));
        }
        Ok(())
    }

    async fn stats(&self) -> Result<()> {
        let username = env::var("PORTFOLIO_USERNAME").context("PORTFOLIO_USERNAME must be set")?;
        let password = env::var("PORTFOLIO_PASSWORD").context("PORTFOLIO_PASSWORD must be set")?;

        let user = self
            .client
            .login(&username, &password)
            .await
            .context("login failed")?;
        println!("{}🔐 Logged in as {} ({}){}", GREEN, user.username, user.role, RESET);

        let stats = self.client.dashboard_stats().await;
        if let Err(e) = self.client.logout().await {
            println!("{}⚠️  Logout failed: {}{}", YELLOW, e, RESET);
        }
        let stats = stats.context("could not load dashboard stats")?;

        println!("\n{}📊 Dashboard{}", BOLD, RESET);
        println!("──────────────────────────────────────────");
        println!("  • Projects:        {} ({} featured)", stats.total_projects, stats.featured_projects);
        println!("  • Posts:           {} published, {} drafts", stats.published_posts, stats.draft_posts);
        println!("  • Messages:        {}{}{} new of {}", YELLOW, stats.new_messages, RESET, stats.total_messages);
        println!("  • Visits (30 days): {}", stats.visits_last_30_days);
        Ok(())
    }
}

fn print_categories(categories: &[String]) {
    if !categories.is_empty() {
        println!("{}Categories: all, {}{}\n", DIM, categories.join(", "), RESET);
    }
}

fn print_pagination(page: i64, total_pages: i64, total: i64) {
    println!(
        "\n{}Page {} of {} ({} results){}",
        CYAN,
        page,
        total_pages.max(1),
        total,
        RESET
    );
}

fn print_usage() {
    println!("{}portfolio-cli{} <command> [args]\n", BOLD, RESET);
    println!("  health                               Check the API is up");
    println!("  projects [search] [category] [page]  Browse projects");
    println!("  blog [search] [category] [page]      Browse published posts");
    println!("  settings                             Show public settings");
    println!("  stats                                Dashboard stats (needs PORTFOLIO_USERNAME/PASSWORD)");
    println!("  hash-password <password>             Print an Argon2 hash for admin_users");
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let args: Vec<String> = env::args().skip(1).collect();
    let Some(command) = args.first() else {
        print_usage();
        return Ok(());
    };

    if command == "hash-password" {
        let Some(password) = args.get(1) else {
            bail!("usage: portfolio-cli hash-password <password>");
        };
        println!("{}", hash_password(password)?);
        return Ok(());
    }

    let base_url = env::var("PORTFOLIO_API_URL").unwrap_or_else(|_| "http://localhost:8080".to_string());
    let cli = Cli {
        client: PortfolioClient::new(&base_url)?,
    };

    let result = match command.as_str() {
        "health" => cli.health().await,
        "projects" => cli.projects(ListArgs::parse(&args[1..])?).await,
        "blog" => cli.blog(ListArgs::parse(&args[1..])?).await,
        "settings" => cli.settings().await,
        "stats" => cli.stats().await,
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            print_usage();
            bail!("unknown command '{}'", other)
        }
    };

    if let Err(e) = &result {
        println!("{}❌ {:#}{}", RED, e, RESET);
    }
    result
}
