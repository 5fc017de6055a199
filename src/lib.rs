// ABOUTME: Public library API for the octomirror sync engine
// ABOUTME: Re-exports core modules for external use

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod escape;
pub mod filter;
pub mod frontmatter;
pub mod model;
pub mod notice;
pub mod render;
pub mod storage;
pub mod sync;

pub use config::{RepoTracking, Settings, UpdateMode};
pub use error::{Error, Result};
pub use escape::EscapeMode;
pub use model::{Account, ItemKind, RemoteComment, RemoteItem};
pub use notice::{NoticeLevel, NoticeManager, NoticeMode};
