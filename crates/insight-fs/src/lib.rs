//! File handling for the Insight utility toolkit
//!
//! Scans directory trees into [`FileDescriptor`]s, applies file content to a
//! destination tree with a backup fallback for files in use, and compresses
//! byte buffers for transport. Configuration files, settings and logging
//! setup live here as well.

pub mod compress;
pub mod config;
pub mod error;
pub mod hash;
pub mod io;
pub mod logging;
pub mod notify;
pub mod scan;
pub mod settings;
pub mod sync;
pub mod version;

pub use compress::{compress, decompress};
pub use config::ConfigStore;
pub use error::{Error, Result};
pub use hash::{hash_text, path_id};
pub use io::RobustnessConfig;
pub use notify::{MessageSink, TracingSink};
pub use scan::{ExtensionFilter, FileDescriptor, Scanner, UnreadablePolicy, scan};
pub use settings::{FileSettings, MemorySettings, ServiceInfo, SettingsStore};
pub use sync::{
    DeleteOutcome, FileSync, RemoveAttempt, SyncOutcome, delete_file, stage_temp_file,
    update_file,
};
pub use version::{NoVersion, PeVersionReader, VersionReader};
