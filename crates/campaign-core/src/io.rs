use crate::error::{CampaignError, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tempfile::NamedTempFile;

/// Maximum time to wait for a lock (ms). Older locks are considered stale.
pub const LOCK_TIMEOUT_MS: u64 = 5000;

/// Sleep interval between lock acquisition attempts (ms).
const LOCK_RETRY_INTERVAL_MS: u64 = 10;

/// Atomically write `data` to `path` using a tempfile in the same directory.
/// Prevents partial writes from corrupting the campaigns file.
pub fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(data)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Create a directory and all parents, idempotent.
pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path)?;
    Ok(())
}

/// Write a file only if it does not already exist. Returns true if written.
pub fn write_if_missing(path: &Path, data: &[u8]) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    atomic_write(path, data)?;
    Ok(true)
}

/// Read a file, treating a missing file as empty.
pub fn read_or_empty(path: &Path) -> Result<String> {
    match fs::read_to_string(path) {
        Ok(s) => Ok(s),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(e.into()),
    }
}

// ---------------------------------------------------------------------------
// FileLock
// ---------------------------------------------------------------------------

/// An advisory lock file, removed when dropped.
///
/// Only processes that take the same lock are excluded; an editor writing
/// the guarded file directly is not.
#[derive(Debug)]
pub struct FileLock {
    path: PathBuf,
}

impl FileLock {
    /// Acquire `path`, retrying every 10ms for up to `LOCK_TIMEOUT_MS`.
    pub fn acquire(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let start = Instant::now();
        loop {
            if try_acquire(path)? {
                tracing::debug!(lock = %path.display(), "lock acquired");
                return Ok(Self {
                    path: path.to_path_buf(),
                });
            }
            if start.elapsed() > Duration::from_millis(LOCK_TIMEOUT_MS) {
                return Err(CampaignError::LockTimeout {
                    path: path.display().to_string(),
                    timeout_ms: LOCK_TIMEOUT_MS,
                });
            }
            thread::sleep(Duration::from_millis(LOCK_RETRY_INTERVAL_MS));
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

fn now_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
}

fn try_acquire(path: &Path) -> Result<bool> {
    if path.exists() {
        if is_stale(path) {
            reclaim_stale(path)?;
        } else {
            return Ok(false);
        }
    }

    match fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
    {
        Ok(mut file) => {
            write!(file, "{}", now_millis())?;
            Ok(true)
        }
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Move a lock judged stale out of the way. The rename is atomic, so of two
/// processes racing here only one gets the file. If what it got turns out to
/// be a fresh lock taken since the staleness check, it is linked back, which
/// never replaces a lock created in the meantime.
fn reclaim_stale(path: &Path) -> Result<()> {
    let mut aside = path.as_os_str().to_owned();
    aside.push(format!(".stale-{}", std::process::id()));
    let aside = PathBuf::from(aside);

    match fs::rename(path, &aside) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e.into()),
    }

    if is_stale(&aside) {
        tracing::warn!(lock = %path.display(), "removed stale lock");
    } else {
        tracing::debug!(lock = %path.display(), "lock was renewed; restoring it");
        let _ = fs::hard_link(&aside, path);
    }
    let _ = fs::remove_file(&aside);
    Ok(())
}

fn is_stale(path: &Path) -> bool {
    match fs::read_to_string(path) {
        Ok(content) => {
            let Ok(stamp) = content.trim().parse::<u128>() else {
                // Possibly mid-write by the holder; let it age out by mtime.
                return modified_ago(path).is_some_and(|age| age > LOCK_TIMEOUT_MS as u128);
            };
            now_millis().saturating_sub(stamp) > LOCK_TIMEOUT_MS as u128
        }
        Err(_) => true,
    }
}

fn modified_ago(path: &Path) -> Option<u128> {
    let modified = fs::metadata(path).ok()?.modified().ok()?;
    Some(SystemTime::now().duration_since(modified).ok()?.as_millis())
}
