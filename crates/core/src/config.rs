//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into list views.
//! Library code never reads process-wide environment variables itself; the helpers
//! below take the raw optional values so the shell decides where they come from.

use crate::constants::{
    DEFAULT_AUDIT_RETENTION_DAYS, DEFAULT_PAGE_SIZE, FIXTURES_FILE, MAX_FIXTURES_BYTES,
};
use crate::reducer::Position;
use crate::validation::validate_page_size;
use crate::{PortalError, PortalResult};
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

/// List-view configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct ViewConfig {
    default_page_size: NonZeroUsize,
    insert_position: Position,
    audit_retention_days: u32,
}

impl ViewConfig {
    /// Create a new `ViewConfig`.
    ///
    /// # Errors
    ///
    /// Returns `PortalError::InvalidInput` if the page size is out of range or the
    /// retention window is zero days.
    pub fn new(
        default_page_size: usize,
        insert_position: Position,
        audit_retention_days: u32,
    ) -> PortalResult<Self> {
        let default_page_size = validate_page_size(default_page_size)?;

        if audit_retention_days == 0 {
            return Err(PortalError::InvalidInput(
                "audit retention must be at least one day".into(),
            ));
        }

        Ok(Self {
            default_page_size,
            insert_position,
            audit_retention_days,
        })
    }

    pub fn default_page_size(&self) -> NonZeroUsize {
        self.default_page_size
    }

    /// Where newly created records are placed in a list.
    pub fn insert_position(&self) -> Position {
        self.insert_position
    }

    pub fn audit_retention_days(&self) -> u32 {
        self.audit_retention_days
    }

    /// Retention window as a duration, for "older than" criteria.
    pub fn audit_retention(&self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.audit_retention_days))
    }
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            default_page_size: NonZeroUsize::new(DEFAULT_PAGE_SIZE)
                .unwrap_or(NonZeroUsize::MIN),
            insert_position: Position::Head,
            audit_retention_days: DEFAULT_AUDIT_RETENTION_DAYS,
        }
    }
}

/// Parse the default page size from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns [`DEFAULT_PAGE_SIZE`].
pub fn page_size_from_env_value(value: Option<String>) -> PortalResult<usize> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    let Some(value) = value else {
        return Ok(DEFAULT_PAGE_SIZE);
    };

    let size = value
        .parse::<usize>()
        .map_err(|_| PortalError::InvalidInput(format!("invalid page size: '{value}'")))?;
    validate_page_size(size)?;
    Ok(size)
}

/// Parse the audit retention window (days) from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns [`DEFAULT_AUDIT_RETENTION_DAYS`].
pub fn retention_days_from_env_value(value: Option<String>) -> PortalResult<u32> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    match value {
        None => Ok(DEFAULT_AUDIT_RETENTION_DAYS),
        Some(v) => v
            .parse::<u32>()
            .map_err(|_| PortalError::InvalidInput(format!("invalid retention days: '{v}'"))),
    }
}

/// Resolve the fixture document without reading environment variables.
///
/// If `override_path` is provided, it must be an existing file. Otherwise this looks for
/// `fixtures/portal.yaml` relative to the current working directory and then walks up
/// from `CARGO_MANIFEST_DIR`.
pub fn resolve_fixtures_path(override_path: Option<PathBuf>) -> PortalResult<PathBuf> {
    if let Some(path) = override_path {
        if path.is_file() {
            return Ok(path);
        }
        return Err(PortalError::InvalidInput(format!(
            "PORTAL_FIXTURES override is not a file: {}",
            path.display()
        )));
    }

    let cwd_relative = PathBuf::from(FIXTURES_FILE);
    if cwd_relative.is_file() {
        return Ok(cwd_relative);
    }

    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    for ancestor in manifest_dir.ancestors() {
        let candidate = ancestor.join(FIXTURES_FILE);
        if candidate.is_file() {
            return Ok(candidate);
        }
    }

    Err(PortalError::InvalidInput(format!(
        "could not locate {FIXTURES_FILE}"
    )))
}

/// Validate that a fixture document is safe to load.
///
/// Rejects symlinks, non-regular files and files above [`MAX_FIXTURES_BYTES`].
pub fn validate_fixtures_file(path: &Path) -> PortalResult<()> {
    let metadata = std::fs::symlink_metadata(path).map_err(PortalError::FileRead)?;
    let file_type = metadata.file_type();

    if file_type.is_symlink() {
        return Err(PortalError::InvalidInput(
            "fixture document must not be a symlink".into(),
        ));
    }

    if !file_type.is_file() {
        return Err(PortalError::InvalidInput(
            "fixture document must be a regular file".into(),
        ));
    }

    if metadata.len() > MAX_FIXTURES_BYTES {
        return Err(PortalError::InvalidInput(
            "fixture document exceeds maximum size".into(),
        ));
    }

    Ok(())
}
