//! Identifier generation for planner entities.
//!
//! An identifier is the slugified display text (project name, task title, ...)
//! followed by eight hex characters, e.g. `release-checklist-3fa2c901`. When the
//! text has no ASCII alphanumerics the entity kind is used instead of the slug.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Maximum slug length before the suffix is appended.
const MAX_SLUG_LEN: usize = 40;

static COUNTER: AtomicU64 = AtomicU64::new(0);

static DETERMINISTIC: AtomicBool = AtomicBool::new(false);

/// Switch to counter-based suffixes (`-00000000`, `-00000001`, ...).
///
/// Global state: tests that rely on it should run under `#[serial]`.
pub fn enable_deterministic_ids() {
    DETERMINISTIC.store(true, Ordering::SeqCst);
    COUNTER.store(0, Ordering::SeqCst);
}

/// Switch back to random suffixes.
pub fn disable_deterministic_ids() {
    DETERMINISTIC.store(false, Ordering::SeqCst);
}

/// Lowercase, hyphen-separated ASCII slug of `text`, at most `max_len` bytes.
#[must_use]
pub fn slugify(text: &str, max_len: usize) -> String {
    let mut slug = String::with_capacity(text.len().min(max_len));
    let mut pending_hyphen = false;

    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }

    if slug.len() > max_len {
        slug.truncate(max_len);
        while slug.ends_with('-') {
            slug.pop();
        }
    }

    slug
}

#[allow(clippy::cast_possible_truncation)]
fn suffix() -> String {
    if DETERMINISTIC.load(Ordering::SeqCst) {
        return format!("{:08x}", COUNTER.fetch_add(1, Ordering::SeqCst));
    }

    use std::collections::hash_map::RandomState;
    use std::hash::{BuildHasher, Hasher};

    let mut hasher = RandomState::new().build_hasher();
    hasher.write_u64(COUNTER.fetch_add(1, Ordering::SeqCst));
    hasher.write_u64(
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_or(0, |d| d.as_nanos() as u64),
    );
    format!("{:08x}", hasher.finish() & 0xFFFF_FFFF)
}

/// Generate an identifier for an entity of kind `kind` displayed as `text`.
#[must_use]
pub fn generate_id(kind: &str, text: &str) -> String {
    let slug = slugify(text, MAX_SLUG_LEN);
    let suffix = suffix();
    if slug.is_empty() {
        format!("{kind}-{suffix}")
    } else {
        format!("{slug}-{suffix}")
    }
}
