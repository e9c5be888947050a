use std::fs;
use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use prismweave_core::{
    ApiClient, ArticleFilter, ArticlePatch, ArticleStore, CaptureConfig, CaptureOptions, FallbackStorage, FetchConfig,
    FileStorage, GitHubClient, GitHubConfig, MemoryStorage, Notifier, PatConfig, SettingValue, Settings,
    SettingsManager, StorageProvider, ToastOptions, capture, commit_document, extract_config_from_bookmarklet,
    fetch_file, fetch_stdin, fetch_url, generate_personal_bookmarklet, validate_settings,
};

mod console;
use console::{ConsoleNotifier, print_banner, print_info, print_step, print_success};

pub(crate) const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Capture web pages as markdown and commit them to GitHub
#[derive(Parser, Debug)]
#[command(name = "prismweave")]
#[command(author = "PrismWeave Contributors")]
#[command(version = VERSION)]
#[command(about = "Capture web pages as markdown", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Capture a page and convert it to markdown
    Capture(CaptureArgs),
    /// Generate or decode personal bookmarklets
    #[command(subcommand)]
    Bookmarklet(BookmarkletCommand),
    /// Inspect or reset stored settings
    #[command(subcommand)]
    Settings(SettingsCommand),
    /// Browse and edit the captured article library
    #[command(subcommand)]
    Articles(ArticlesCommand),
}

#[derive(Parser, Debug)]
struct CaptureArgs {
    /// URL to fetch, local HTML file, or "-" for stdin
    #[arg(value_name = "INPUT")]
    input: String,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Commit the capture to the configured GitHub repository
    #[arg(long)]
    commit: bool,

    /// Target repository (owner/repo), overriding settings
    #[arg(long, value_name = "SLUG")]
    repo: Option<String>,

    /// GitHub token, overriding settings and $GITHUB_TOKEN
    #[arg(long, value_name = "TOKEN")]
    token: Option<String>,

    /// Target branch, overriding settings
    #[arg(long, value_name = "BRANCH")]
    branch: Option<String>,

    /// Repository folder for the committed file
    #[arg(long, value_name = "DIR")]
    folder: Option<String>,

    /// Commit message template ({title} and {url} placeholders)
    #[arg(long, value_name = "TEMPLATE")]
    message: Option<String>,

    /// Source URL recorded in metadata for file/stdin input
    #[arg(long, value_name = "URL")]
    source_url: Option<url::Url>,

    /// Skip the metadata frontmatter block
    #[arg(long)]
    no_frontmatter: bool,

    /// Strip images from the capture
    #[arg(long)]
    no_images: bool,

    /// Unwrap links down to their text
    #[arg(long)]
    no_links: bool,

    /// Keep boilerplate (navigation, ads, footers)
    #[arg(long)]
    no_clean: bool,

    /// HTTP timeout in seconds
    #[arg(long, default_value = "30", value_name = "SECS")]
    timeout: u64,

    /// Custom User-Agent for HTTP requests
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// Enable step-by-step progress output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum BookmarkletCommand {
    /// Generate a personal bookmarklet embedding token and repository
    Generate {
        /// GitHub token to embed
        #[arg(long, value_name = "TOKEN")]
        token: String,
        /// Target repository (owner/repo)
        #[arg(long, value_name = "SLUG")]
        repo: String,
        /// Repository folder captures land in
        #[arg(long, value_name = "DIR")]
        folder: Option<String>,
        /// Fixed commit message
        #[arg(long, value_name = "MESSAGE")]
        message: Option<String>,
        /// Output file (default: stdout)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Decode the configuration embedded in a bookmarklet
    Decode {
        /// Bookmarklet text, or a file containing it
        #[arg(value_name = "INPUT")]
        input: String,
    },
}

#[derive(Subcommand, Debug)]
enum SettingsCommand {
    /// Print the effective settings as JSON
    Show,
    /// Store one setting (value parsed as JSON, falling back to string)
    Set {
        #[arg(value_name = "KEY")]
        key: String,
        #[arg(value_name = "VALUE")]
        value: String,
    },
    /// Clear stored settings, returning to defaults
    Reset,
    /// Print the settings file location
    Path,
}

#[derive(Subcommand, Debug)]
enum ArticlesCommand {
    /// List captured articles
    List {
        #[arg(long, value_name = "DOMAIN")]
        domain: Option<String>,
        #[arg(long, value_name = "TAG")]
        tag: Option<String>,
        /// Substring match against title and body
        #[arg(short, long, value_name = "TEXT")]
        query: Option<String>,
        #[arg(long, value_name = "URL")]
        api_url: Option<String>,
    },
    /// Print one article's markdown
    Show {
        #[arg(value_name = "ID")]
        id: String,
        #[arg(long, value_name = "URL")]
        api_url: Option<String>,
    },
    /// Patch an article's title or tags
    Edit {
        #[arg(value_name = "ID")]
        id: String,
        #[arg(long, value_name = "TITLE")]
        title: Option<String>,
        /// Comma-separated tag list, replacing the existing tags
        #[arg(long, value_name = "TAGS")]
        tags: Option<String>,
        #[arg(long, value_name = "URL")]
        api_url: Option<String>,
    },
    /// Delete an article
    Delete {
        #[arg(value_name = "ID")]
        id: String,
        #[arg(long, value_name = "URL")]
        api_url: Option<String>,
    },
    /// Rescan the library directory on the server
    Rebuild {
        #[arg(long, value_name = "URL")]
        api_url: Option<String>,
    },
}

/// Settings backed by the config-dir file with an in-memory fallback.
fn settings_manager() -> SettingsManager<FallbackStorage> {
    let mut providers: Vec<Box<dyn StorageProvider>> = Vec::new();
    if let Ok(file) = FileStorage::default_location() {
        providers.push(Box::new(file));
    }
    providers.push(Box::new(MemoryStorage::new()));
    SettingsManager::new(FallbackStorage::new(providers))
}

fn setting_str(settings: &Settings, key: &str) -> Option<String> {
    settings.get(key).and_then(|v| v.as_str()).filter(|s| !s.is_empty()).map(str::to_string)
}

fn setting_bool(settings: &Settings, key: &str, fallback: bool) -> bool {
    settings.get(key).and_then(|v| v.as_bool()).unwrap_or(fallback)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Capture(args) => run_capture(args).await,
        Command::Bookmarklet(command) => run_bookmarklet(command),
        Command::Settings(command) => run_settings(command),
        Command::Articles(command) => run_articles(command).await,
    }
}

async fn run_capture(args: CaptureArgs) -> anyhow::Result<()> {
    let settings = settings_manager().load();

    if args.verbose {
        print_banner();
    }

    let is_url = args.input.starts_with("http://") || args.input.starts_with("https://");

    let html = if args.input == "-" {
        if args.verbose {
            print_step(1, 4, "Reading from stdin");
        }
        fetch_stdin().context("Failed to read from stdin")?
    } else if is_url {
        if args.verbose {
            print_step(
                1,
                4,
                &format!("Fetching from {}", args.input.bright_white().underline()),
            );
        }

        let config = FetchConfig {
            timeout: args.timeout,
            user_agent: args
                .user_agent
                .clone()
                .or_else(|| setting_str(&settings, "user_agent"))
                .unwrap_or_else(|| FetchConfig::default().user_agent),
        };
        fetch_url(&args.input, &config).await.context("Failed to fetch URL")?
    } else {
        if args.verbose {
            print_step(1, 4, &format!("Reading from file {}", args.input.bright_white()));
        }
        fetch_file(&args.input).with_context(|| format!("Failed to read file: {}", args.input))?
    };

    if args.verbose {
        print_step(2, 4, "Extracting main content");
    }

    let source_url = if is_url { Some(args.input.as_str()) } else { args.source_url.as_ref().map(url::Url::as_str) };

    let config = CaptureConfig {
        options: CaptureOptions {
            include_images: !args.no_images && setting_bool(&settings, "include_images", true),
            include_links: !args.no_links && setting_bool(&settings, "include_links", true),
            clean_html: !args.no_clean && setting_bool(&settings, "clean_html", true),
        },
        include_frontmatter: !args.no_frontmatter && setting_bool(&settings, "markdown_frontmatter", true),
        folder: args
            .folder
            .clone()
            .or_else(|| setting_str(&settings, "default_folder"))
            .unwrap_or_else(|| "captures".to_string()),
    };

    let doc = capture(&html, source_url, &config).context("Failed to convert content")?;

    if args.verbose {
        if let Some(title) = &doc.metadata.title {
            eprintln!("  {} {}", "Title:".dimmed(), title.bright_white());
        }
        eprintln!(
            "  {} {}",
            "Words:".dimmed(),
            doc.metadata.word_count.to_string().bright_white()
        );
        eprintln!();
        print_step(3, 4, "Writing output");
    }

    match &args.output {
        Some(path) => {
            fs::write(path, &doc.markdown).with_context(|| format!("Failed to write to file: {}", path.display()))?;
            print_success(&format!("Output written to {}", path.display().bright_white()));
        }
        None => {
            if !args.commit {
                print!("{}", doc.markdown);
            }
        }
    }

    if args.commit {
        if args.verbose {
            print_step(4, 4, "Committing to GitHub");
        }

        let mut notifier = ConsoleNotifier::new();
        let token = args
            .token
            .clone()
            .or_else(|| setting_str(&settings, "github_token"))
            .or_else(|| std::env::var("GITHUB_TOKEN").ok());
        let Some(token) = token else {
            bail!("No GitHub token: pass --token, set the github_token setting, or export GITHUB_TOKEN");
        };
        let Some(slug) = args.repo.clone().or_else(|| setting_str(&settings, "github_repo")) else {
            bail!("No target repository: pass --repo or set the github_repo setting");
        };
        let branch = args.branch.clone().or_else(|| setting_str(&settings, "github_branch"));

        let github = GitHubConfig::from_slug(&slug, &token, branch)?;
        let client = GitHubClient::new(github)?;
        let template = args
            .message
            .clone()
            .or_else(|| setting_str(&settings, "commit_message_template"))
            .unwrap_or_else(|| "PrismWeave capture: {title}".to_string());

        match commit_document(&client, &doc, &template).await {
            Ok(outcome) => {
                let verb = if outcome.updated { "Updated" } else { "Created" };
                notifier.show(
                    &format!("{} {} in {}", verb, outcome.path, client.slug()),
                    ToastOptions::success(),
                );
                if let Some(url) = outcome.html_url {
                    print_info(&url);
                }
            }
            Err(e) => {
                notifier.show(&format!("Commit failed: {}", e), ToastOptions::error());
                return Err(e.into());
            }
        }
    }

    Ok(())
}

fn run_bookmarklet(command: BookmarkletCommand) -> anyhow::Result<()> {
    match command {
        BookmarkletCommand::Generate { token, repo, folder, message, output } => {
            let config = PatConfig {
                github_token: token,
                github_repo: repo,
                default_folder: folder,
                commit_message: message,
            };

            let script = generate_personal_bookmarklet(&config)?;

            match output {
                Some(path) => {
                    fs::write(&path, &script)
                        .with_context(|| format!("Failed to write to file: {}", path.display()))?;
                    print_success(&format!(
                        "Bookmarklet written to {} ({} chars)",
                        path.display(),
                        script.len()
                    ));
                }
                None => println!("{}", script),
            }
            Ok(())
        }
        BookmarkletCommand::Decode { input } => {
            let text = if PathBuf::from(&input).is_file() {
                fs::read_to_string(&input).with_context(|| format!("Failed to read file: {}", input))?
            } else {
                input
            };

            match extract_config_from_bookmarklet(&text) {
                Some(config) => {
                    println!("{}", serde_json::to_string_pretty(&config)?);
                    Ok(())
                }
                None => bail!("Input does not contain a PrismWeave bookmarklet"),
            }
        }
    }
}

fn run_settings(command: SettingsCommand) -> anyhow::Result<()> {
    let mut manager = settings_manager();

    match command {
        SettingsCommand::Show => {
            let settings = manager.load();
            println!("{}", serde_json::to_string_pretty(&settings)?);
            Ok(())
        }
        SettingsCommand::Set { key, value } => {
            let mut settings = manager.load();
            let parsed = match serde_json::from_str::<SettingValue>(&value) {
                Ok(parsed) => parsed,
                Err(_) => SettingValue::Str(value),
            };
            settings.insert(key.clone(), parsed);

            let validation = validate_settings(&settings);
            if !validation.valid {
                bail!("Invalid setting: {}", validation.errors.join("; "));
            }

            manager.save(&settings)?;
            print_success(&format!("Set {}", key));
            Ok(())
        }
        SettingsCommand::Reset => {
            manager.reset()?;
            print_success("Settings reset to defaults");
            Ok(())
        }
        SettingsCommand::Path => {
            let file = FileStorage::default_location()?;
            println!("{}", file.path().display());
            Ok(())
        }
    }
}

async fn run_articles(command: ArticlesCommand) -> anyhow::Result<()> {
    let settings = settings_manager().load();
    let default_url =
        setting_str(&settings, "api_base_url").unwrap_or_else(|| "http://127.0.0.1:8087".to_string());

    match command {
        ArticlesCommand::List { domain, tag, query, api_url } => {
            let client = ApiClient::new(api_url.as_deref().unwrap_or(&default_url))?;
            let mut store = ArticleStore::new(client);

            store.fetch_articles(&ArticleFilter { domain, tag, query }).await;
            if let Some(error) = &store.error {
                bail!("Failed to list articles: {}", error);
            }

            if store.articles.is_empty() {
                print_info("No articles found");
                return Ok(());
            }

            for article in &store.articles {
                let domain = article.domain.as_deref().unwrap_or("-");
                println!(
                    "{}  {}  {}",
                    article.id.dimmed(),
                    article.title,
                    domain.dimmed()
                );
            }
            Ok(())
        }
        ArticlesCommand::Show { id, api_url } => {
            let client = ApiClient::new(api_url.as_deref().unwrap_or(&default_url))?;
            let mut store = ArticleStore::new(client);

            store.fetch_article(&id).await;
            if let Some(error) = &store.error {
                bail!("Failed to fetch article: {}", error);
            }

            match &store.current {
                Some(detail) => {
                    println!("{}", detail.body);
                    Ok(())
                }
                None => bail!("Article not found: {}", id),
            }
        }
        ArticlesCommand::Edit { id, title, tags, api_url } => {
            let client = ApiClient::new(api_url.as_deref().unwrap_or(&default_url))?;
            let mut store = ArticleStore::new(client);

            let patch = ArticlePatch {
                title,
                tags: tags.map(|t| t.split(',').map(|s| s.trim().to_string()).collect()),
                body: None,
            };

            let detail = store.update_article(&id, &patch).await?;
            print_success(&format!("Updated {}", detail.summary.title));
            Ok(())
        }
        ArticlesCommand::Delete { id, api_url } => {
            let client = ApiClient::new(api_url.as_deref().unwrap_or(&default_url))?;
            let mut store = ArticleStore::new(client);

            store.delete_article(&id).await?;
            print_success(&format!("Deleted {}", id));
            Ok(())
        }
        ArticlesCommand::Rebuild { api_url } => {
            let client = ApiClient::new(api_url.as_deref().unwrap_or(&default_url))?;
            let mut store = ArticleStore::new(client);

            let report = store.rebuild().await?;
            print_success(&format!("Library rebuilt: {} articles", report.articles));
            Ok(())
        }
    }
}
