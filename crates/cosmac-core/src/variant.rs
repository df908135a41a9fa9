//! Runtime-selected hardware variant descriptors.
//!
//! The three supported machines share one execution core but differ in
//! memory decoding, port wiring and keyboard-latch shape. A [`Variant`] is
//! built once at startup and injected into the engine; nothing here is
//! selected at compile time.

use thiserror::Error;

/// Required size in bytes of the COSMAC VIP monitor ROM image.
pub const MONITOR_ROM_BYTES: usize = 512;

/// Required size in bytes of the Studio II ROM image (BIOS plus resident
/// games).
pub const STUDIO2_ROM_BYTES: usize = 2048;

/// Error raised while validating a caller-supplied ROM image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RomImageError {
    /// The supplied image does not match the fixed size of the ROM window.
    #[error("rom image is {actual} bytes, expected exactly {expected}")]
    Size {
        /// Size the variant's ROM window requires.
        expected: usize,
        /// Size the caller actually supplied.
        actual: usize,
    },
}

/// A validated read-only overlay image.
///
/// The core never ships ROM dumps; callers supply the image bytes and the
/// constructor checks them against the variant's fixed window size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RomImage {
    bytes: Box<[u8]>,
}

impl RomImage {
    fn with_expected_len(bytes: &[u8], expected: usize) -> Result<Self, RomImageError> {
        if bytes.len() == expected {
            Ok(Self {
                bytes: bytes.into(),
            })
        } else {
            Err(RomImageError::Size {
                expected,
                actual: bytes.len(),
            })
        }
    }

    /// Read view of the image bytes.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Image length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` when the image holds no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Discriminant of the three supported machines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum VariantKind {
    /// RCA COSMAC VIP: RAM from address 0, monitor ROM at 0x8000.
    CosmacVip,
    /// Netronics Elf II: RAM only, addresses folded through a
    /// power-of-two mask.
    Elf2,
    /// RCA Studio II: 12-bit address window, ROM low, 512 bytes of RAM
    /// at 0x800.
    Studio2,
}

impl VariantKind {
    /// Byte returned by reads that hit no mapped window.
    #[must_use]
    pub const fn open_bus(self) -> u8 {
        match self {
            Self::CosmacVip | Self::Elf2 => 0x00,
            Self::Studio2 => 0xFF,
        }
    }

    /// Offset subtracted from the captured screen page to turn it into a
    /// RAM byte offset. Non-zero only where the RAM window does not start
    /// at address 0.
    #[must_use]
    pub const fn screen_page_offset(self) -> u16 {
        match self {
            Self::CosmacVip | Self::Elf2 => 0x0000,
            Self::Studio2 => 0x0800,
        }
    }
}

/// Full hardware descriptor for one machine variant, including any ROM
/// overlay image it maps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Variant {
    /// COSMAC VIP with its 512-byte monitor ROM.
    CosmacVip {
        /// Monitor ROM image mapped read-only at 0x8000.
        monitor: RomImage,
        /// Forces the monitor's keypad probe to succeed during boot so the
        /// monitor runs whether or not C is held. Compatibility patch, off
        /// by default.
        force_monitor_boot: bool,
    },
    /// Netronics Elf II. No ROM overlay.
    Elf2,
    /// RCA Studio II with its 2 KiB ROM.
    Studio2 {
        /// ROM image mapped read-only at the bottom of the 12-bit window.
        rom: RomImage,
    },
}

impl Variant {
    /// Builds the COSMAC VIP descriptor from a monitor ROM image.
    ///
    /// # Errors
    ///
    /// Returns [`RomImageError::Size`] when `monitor` is not exactly
    /// [`MONITOR_ROM_BYTES`] long.
    pub fn cosmac_vip(monitor: &[u8]) -> Result<Self, RomImageError> {
        Ok(Self::CosmacVip {
            monitor: RomImage::with_expected_len(monitor, MONITOR_ROM_BYTES)?,
            force_monitor_boot: false,
        })
    }

    /// Builds the COSMAC VIP descriptor with the monitor-boot patch
    /// enabled.
    ///
    /// # Errors
    ///
    /// Returns [`RomImageError::Size`] when `monitor` is not exactly
    /// [`MONITOR_ROM_BYTES`] long.
    pub fn cosmac_vip_with_monitor_boot(monitor: &[u8]) -> Result<Self, RomImageError> {
        Ok(Self::CosmacVip {
            monitor: RomImage::with_expected_len(monitor, MONITOR_ROM_BYTES)?,
            force_monitor_boot: true,
        })
    }

    /// Builds the Elf II descriptor.
    #[must_use]
    pub const fn elf2() -> Self {
        Self::Elf2
    }

    /// Builds the Studio II descriptor from its ROM image.
    ///
    /// # Errors
    ///
    /// Returns [`RomImageError::Size`] when `rom` is not exactly
    /// [`STUDIO2_ROM_BYTES`] long.
    pub fn studio2(rom: &[u8]) -> Result<Self, RomImageError> {
        Ok(Self::Studio2 {
            rom: RomImage::with_expected_len(rom, STUDIO2_ROM_BYTES)?,
        })
    }

    /// Returns the discriminant for this descriptor.
    #[must_use]
    pub const fn kind(&self) -> VariantKind {
        match self {
            Self::CosmacVip { .. } => VariantKind::CosmacVip,
            Self::Elf2 => VariantKind::Elf2,
            Self::Studio2 { .. } => VariantKind::Studio2,
        }
    }
}
