//! Compile log layout strings such as `"%d{%H:%M:%S} %p %c - %m"` into
//! [`Template`]s once, then render log events with them.
//!
//! ```
//! use chrono::Utc;
//! use tracing_log_layout::{compile, LevelNames, LogRecord, Renderer};
//!
//! let template = compile("%c: %p - %m").unwrap();
//! let renderer = Renderer::new(LevelNames::default());
//! let info = renderer.levels().ordinal_of("INFO").unwrap();
//! let event = LogRecord { logger_name: "root".to_string(), timestamp: Utc::now(), level: info, payload: "boot complete" };
//!
//! assert_eq!(renderer.render(&event, &template), "root: INFO - boot complete");
//! ```

pub mod layout;
pub mod level;
pub mod event;
pub mod render;
pub mod config;
pub mod format;

pub use config::{Layout, LayoutConfig};
pub use event::{LogEvent, LogRecord};
pub use format::{EventPayload, LayoutFormat};
pub use layout::{compile, CompileError, LayoutResult, Piece, PieceKind, Template};
pub use level::LevelNames;
pub use render::Renderer;
