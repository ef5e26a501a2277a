//! libmagic behavior flags.
//!
//! A [`Flags`] value is the bitmask passed to `magic_open`/`magic_setflags`.
//! The constants mirror `<magic.h>`; the `NO_CHECK_*` family disables
//! individual detection passes. Values for `NO_CHECK_TEXT` and later were
//! introduced in libmagic 5.11; older releases used the same bits under the
//! names `NO_CHECK_ASCII`/`NO_CHECK_TROFF`.

use std::ffi::c_int;
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Bitmask controlling detector behavior and output shape.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Flags(c_int);

impl Flags {
    /// No special handling.
    pub const NONE: Flags = Flags(0x0000_0000);
    /// Print debugging messages to stderr.
    pub const DEBUG: Flags = Flags(0x0000_0001);
    /// If the file queried is a symlink, follow it.
    pub const SYMLINK: Flags = Flags(0x0000_0002);
    /// If the file is compressed, unpack it and look at the contents.
    pub const COMPRESS: Flags = Flags(0x0000_0004);
    /// Look at the contents of block/character special devices.
    pub const DEVICES: Flags = Flags(0x0000_0008);
    /// Return a MIME type string instead of a textual description.
    pub const MIME_TYPE: Flags = Flags(0x0000_0010);
    /// Return all matches, not just the first.
    pub const CONTINUE: Flags = Flags(0x0000_0020);
    /// Check the magic database for consistency and print warnings.
    pub const CHECK: Flags = Flags(0x0000_0040);
    /// Attempt to preserve the access time of analyzed files.
    pub const PRESERVE_ATIME: Flags = Flags(0x0000_0080);
    /// Don't translate unprintable characters to octal escapes.
    pub const RAW: Flags = Flags(0x0000_0100);
    /// Treat OS errors while opening files as real errors.
    pub const ERROR: Flags = Flags(0x0000_0200);
    /// Return a MIME encoding instead of a textual description.
    pub const MIME_ENCODING: Flags = Flags(0x0000_0400);
    /// Both MIME type and encoding.
    pub const MIME: Flags = Flags(Self::MIME_TYPE.0 | Self::MIME_ENCODING.0);
    /// Return the Apple creator and type.
    pub const APPLE: Flags = Flags(0x0000_0800);

    /// Don't look for, or inside, compressed files.
    pub const NO_CHECK_COMPRESS: Flags = Flags(0x0000_1000);
    /// Don't examine tar files.
    pub const NO_CHECK_TAR: Flags = Flags(0x0000_2000);
    /// Don't consult magic entries.
    pub const NO_CHECK_SOFT: Flags = Flags(0x0000_4000);
    /// Don't check for EMX application type.
    pub const NO_CHECK_APPTYPE: Flags = Flags(0x0000_8000);
    /// Don't print ELF details.
    pub const NO_CHECK_ELF: Flags = Flags(0x0001_0000);
    /// Don't check for text files.
    pub const NO_CHECK_TEXT: Flags = Flags(0x0002_0000);
    /// Don't check for CDF files.
    pub const NO_CHECK_CDF: Flags = Flags(0x0004_0000);
    /// Don't look for known tokens inside ascii files.
    pub const NO_CHECK_TOKENS: Flags = Flags(0x0010_0000);
    /// Don't check text encodings.
    pub const NO_CHECK_ENCODING: Flags = Flags(0x0020_0000);

    /// Raw bit pattern, as passed across the FFI boundary.
    #[must_use]
    pub const fn bits(self) -> c_int {
        self.0
    }

    /// Reconstruct from a raw bit pattern.
    #[must_use]
    pub const fn from_bits(bits: c_int) -> Self {
        Flags(bits)
    }

    /// Returns `true` if every bit of `other` is set in `self`.
    #[must_use]
    pub const fn contains(self, other: Flags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns `true` if `self` and `other` share any bit.
    #[must_use]
    pub const fn intersects(self, other: Flags) -> bool {
        self.0 & other.0 != 0
    }

    /// Set union.
    #[must_use]
    pub const fn union(self, other: Flags) -> Flags {
        Flags(self.0 | other.0)
    }

    /// `self` with every bit of `other` cleared.
    #[must_use]
    pub const fn without(self, other: Flags) -> Flags {
        Flags(self.0 & !other.0)
    }

    /// Returns `true` if no bits are set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if either MIME output bit is set.
    ///
    /// Queries made in this mode fall under the empty-result compatibility
    /// shim handled by the cookie layer.
    #[must_use]
    pub const fn wants_mime(self) -> bool {
        self.intersects(Self::MIME)
    }
}

impl BitOr for Flags {
    type Output = Flags;

    fn bitor(self, rhs: Flags) -> Flags {
        self.union(rhs)
    }
}

impl BitOrAssign for Flags {
    fn bitor_assign(&mut self, rhs: Flags) {
        self.0 |= rhs.0;
    }
}

/// Names for the single-bit constants, in bit order.
const NAMES: &[(Flags, &str)] = &[
    (Flags::DEBUG, "DEBUG"),
    (Flags::SYMLINK, "SYMLINK"),
    (Flags::COMPRESS, "COMPRESS"),
    (Flags::DEVICES, "DEVICES"),
    (Flags::MIME_TYPE, "MIME_TYPE"),
    (Flags::CONTINUE, "CONTINUE"),
    (Flags::CHECK, "CHECK"),
    (Flags::PRESERVE_ATIME, "PRESERVE_ATIME"),
    (Flags::RAW, "RAW"),
    (Flags::ERROR, "ERROR"),
    (Flags::MIME_ENCODING, "MIME_ENCODING"),
    (Flags::APPLE, "APPLE"),
    (Flags::NO_CHECK_COMPRESS, "NO_CHECK_COMPRESS"),
    (Flags::NO_CHECK_TAR, "NO_CHECK_TAR"),
    (Flags::NO_CHECK_SOFT, "NO_CHECK_SOFT"),
    (Flags::NO_CHECK_APPTYPE, "NO_CHECK_APPTYPE"),
    (Flags::NO_CHECK_ELF, "NO_CHECK_ELF"),
    (Flags::NO_CHECK_TEXT, "NO_CHECK_TEXT"),
    (Flags::NO_CHECK_CDF, "NO_CHECK_CDF"),
    (Flags::NO_CHECK_TOKENS, "NO_CHECK_TOKENS"),
    (Flags::NO_CHECK_ENCODING, "NO_CHECK_ENCODING"),
];

impl fmt::Debug for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("NONE");
        }
        let mut rest = self.0;
        let mut first = true;
        for &(bit, name) in NAMES {
            if self.contains(bit) {
                if !first {
                    f.write_str(" | ")?;
                }
                f.write_str(name)?;
                first = false;
                rest &= !bit.0;
            }
        }
        if rest != 0 {
            if !first {
                f.write_str(" | ")?;
            }
            write!(f, "{rest:#x}")?;
        }
        Ok(())
    }
}
