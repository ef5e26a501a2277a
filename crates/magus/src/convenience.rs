//! Module-level identification helpers.
//!
//! These keep one [`Magic`] per output mode in thread-local storage, created
//! lazily on first use and kept for the life of the thread. Each thread gets
//! its own detectors, so the one-cookie-per-thread contract holds without
//! any locking.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;

use crate::detector::Magic;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum OutputMode {
    Description,
    MimeType,
}

impl OutputMode {
    fn from_mime(mime: bool) -> Self {
        if mime { OutputMode::MimeType } else { OutputMode::Description }
    }
}

thread_local! {
    static DETECTORS: RefCell<HashMap<OutputMode, Magic>> = RefCell::new(HashMap::new());
}

fn with_detector<R>(mode: OutputMode, op: impl FnOnce(&Magic) -> Result<R>) -> Result<R> {
    DETECTORS.with(|cell| {
        let mut map = cell.borrow_mut();
        if !map.contains_key(&mode) {
            let magic = Magic::builder()
                .mime(mode == OutputMode::MimeType)
                .build()?;
            map.insert(mode, magic);
        }
        op(&map[&mode])
    })
}

/// Identify the file at `path`, returning the MIME type when `mime` is set
/// and a human-readable description otherwise.
pub fn from_file(path: impl AsRef<Path>, mime: bool) -> Result<String> {
    with_detector(OutputMode::from_mime(mime), |m| m.file(path.as_ref()))
}

/// Identify the contents of `buf`, returning the MIME type when `mime` is
/// set and a human-readable description otherwise.
pub fn from_buffer(buf: &[u8], mime: bool) -> Result<String> {
    with_detector(OutputMode::from_mime(mime), |m| m.buffer(buf))
}
