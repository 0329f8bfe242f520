pub mod utils;
pub mod config;
pub mod document;
pub mod style;
pub mod hierarchy;
pub mod asset;
pub mod walker;
pub mod extract;
pub mod table;
pub mod host;
pub mod reconcile;

// 重新导出主要结构
pub use asset::{TextAsset, UpdateRequest};
pub use config::{ExtractOptions, ReconcileOptions, SyncConfig, VerifyPolicy};
pub use document::{Document, NodeIndex, NodeKind, VisualNode};
pub use extract::{extract, extract_document, extract_selection, ExtractMode, Extraction};
pub use host::{DocumentHost, HostError, MemoryHost};
pub use reconcile::{ReconcileReport, ReconcileSummary, Reconciler, UpdateFailure, UpdateOutcome};
pub use table::{Table, TableError, TableFormat};
pub use utils::SyncError;
pub use walker::{TreeWalker, WalkStats};

// 常量定义
pub use table::SUPPORTED_TABLE_EXTENSIONS;
/// 没有可导出文本时展示给用户的提示
pub const NO_TEXT_LAYERS_MESSAGE: &str = "no text layers found";
