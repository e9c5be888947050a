pub mod adapter;
#[cfg(feature = "http")]
pub mod api;
pub mod bookmarklet;
pub mod clean;
pub mod document;
pub mod error;
pub mod extract;
#[cfg(feature = "http")]
pub mod fetch;
#[cfg(feature = "http")]
pub mod github;
pub mod markdown;
pub mod notify;
pub mod pipeline;
pub mod settings;
pub mod storage;

pub use adapter::{AdapterState, CaptureAdapter, PageContext};
#[cfg(feature = "http")]
pub use api::{ApiClient, ArticleDetail, ArticleFilter, ArticlePatch, ArticleStore, ArticleSummary};
pub use bookmarklet::{PatConfig, extract_config_from_bookmarklet, generate_personal_bookmarklet, validate_configuration};
pub use document::{CaptureOptions, CapturedDocument, DocumentMetadata, slugify, suggested_path};
pub use error::{PrismError, Result, Validation};
pub use extract::{Extraction, extract, page_info};
#[cfg(feature = "http")]
pub use fetch::{FetchConfig, fetch_file, fetch_stdin, fetch_url};
#[cfg(feature = "http")]
pub use github::{CommitOutcome, GitHubClient, GitHubConfig};
pub use markdown::{Conversion, MarkdownConfig, MarkdownConverter, generate_frontmatter};
pub use notify::{DEFAULT_TOAST_DURATION_MS, Notifier, Toast, ToastHub, ToastKind, ToastOptions};
pub use pipeline::{CaptureConfig, capture, commit_message};
#[cfg(feature = "http")]
pub use pipeline::commit_document;
pub use settings::{
    FieldKind, FieldSpec, SettingValue, Settings, SettingsManager, default_settings, schema, validate_settings,
};
pub use storage::{FallbackStorage, FileStorage, KEY_PREFIX, MemoryStorage, StorageProvider};
