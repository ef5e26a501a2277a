//! Configured detector built on top of [`Cookie`].
//!
//! [`Magic`] bundles the common configuration set (MIME type vs. encoding
//! output, keep-going mode, custom database) behind a builder and hands out
//! a cookie that is already loaded and ready to query.

use std::path::{Path, PathBuf};

use magus_core::Flags;

use crate::cookie::Cookie;
use crate::error::Result;

/// A ready-to-query file-type detector.
pub struct Magic {
    cookie: Cookie,
}

impl Magic {
    /// Detector with default settings: textual descriptions, system
    /// database.
    pub fn new() -> Result<Magic> {
        Magic::builder().build()
    }

    /// Start configuring a detector.
    #[must_use]
    pub fn builder() -> MagicBuilder {
        MagicBuilder::default()
    }

    /// Identify the file at `path`.
    pub fn file(&self, path: impl AsRef<Path>) -> Result<String> {
        self.cookie.file(path)
    }

    /// Identify the contents of `buf`.
    pub fn buffer(&self, buf: &[u8]) -> Result<String> {
        self.cookie.buffer(buf)
    }

    /// Current flag bitmask.
    #[must_use]
    pub fn flags(&self) -> Flags {
        self.cookie.flags()
    }

    /// Switch output mode (or any other flag) without reloading the
    /// database.
    pub fn set_flags(&mut self, flags: Flags) -> Result<()> {
        self.cookie.set_flags(flags)
    }

    /// The underlying cookie, for operations the detector does not surface
    /// (database check/compile, explicit close).
    #[must_use]
    pub fn cookie(&self) -> &Cookie {
        &self.cookie
    }
}

/// Builder for [`Magic`].
///
/// `mime` takes precedence over `mime_encoding` when both are requested,
/// matching the constructor contract of the original wrapper.
#[derive(Debug, Clone, Default)]
pub struct MagicBuilder {
    mime: bool,
    mime_encoding: bool,
    keep_going: bool,
    database: Option<PathBuf>,
    extra: Flags,
}

impl MagicBuilder {
    /// Report MIME types instead of textual descriptions.
    #[must_use]
    pub fn mime(mut self, yes: bool) -> Self {
        self.mime = yes;
        self
    }

    /// Report MIME encodings (charset) instead of textual descriptions.
    #[must_use]
    pub fn mime_encoding(mut self, yes: bool) -> Self {
        self.mime_encoding = yes;
        self
    }

    /// Report all matching rules instead of stopping at the first.
    #[must_use]
    pub fn keep_going(mut self, yes: bool) -> Self {
        self.keep_going = yes;
        self
    }

    /// Use a custom database (colon-separated list of files) instead of the
    /// system default.
    #[must_use]
    pub fn database(mut self, path: impl Into<PathBuf>) -> Self {
        self.database = Some(path.into());
        self
    }

    /// Additional raw flags OR-ed on top of the configuration above.
    #[must_use]
    pub fn flags(mut self, flags: Flags) -> Self {
        self.extra = self.extra | flags;
        self
    }

    /// Flag bitmask this configuration resolves to.
    #[must_use]
    pub fn resolved_flags(&self) -> Flags {
        let mut flags = self.extra;
        if self.mime {
            flags |= Flags::MIME_TYPE;
        } else if self.mime_encoding {
            flags |= Flags::MIME_ENCODING;
        }
        if self.keep_going {
            flags |= Flags::CONTINUE;
        }
        flags
    }

    /// Open a cookie and load the configured database.
    pub fn build(self) -> Result<Magic> {
        let mut cookie = Cookie::open(self.resolved_flags())?;
        cookie.load(self.database.as_deref())?;
        Ok(Magic { cookie })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_flag_resolution() {
        assert_eq!(MagicBuilder::default().resolved_flags(), Flags::NONE);
        assert_eq!(
            MagicBuilder::default().mime(true).resolved_flags(),
            Flags::MIME_TYPE
        );
        assert_eq!(
            MagicBuilder::default().mime_encoding(true).resolved_flags(),
            Flags::MIME_ENCODING
        );
        assert_eq!(
            MagicBuilder::default()
                .mime(true)
                .keep_going(true)
                .resolved_flags(),
            Flags::MIME_TYPE | Flags::CONTINUE
        );
    }

    #[test]
    fn test_mime_wins_over_encoding() {
        let flags = MagicBuilder::default()
            .mime(true)
            .mime_encoding(true)
            .resolved_flags();
        assert_eq!(flags, Flags::MIME_TYPE);
    }

    #[test]
    fn test_extra_flags_are_kept() {
        let flags = MagicBuilder::default()
            .mime(true)
            .flags(Flags::SYMLINK | Flags::COMPRESS)
            .resolved_flags();
        assert!(flags.contains(Flags::MIME_TYPE));
        assert!(flags.contains(Flags::SYMLINK));
        assert!(flags.contains(Flags::COMPRESS));
    }
}
