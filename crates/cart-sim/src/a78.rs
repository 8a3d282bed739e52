//! ROM image loading
//!
//! Accepts either a raw cartridge image or an `.a78` file (128-byte header
//! followed by the image). The image is placed so that it ends at `$FFFF`:
//! 48K at `$4000`, 32K at `$8000`, 16K at `$C000`.

use crate::error::{Result, SimError};
use bitflags::bitflags;
use std::fmt;
use std::path::Path;

/// Size of the `.a78` header
pub const HEADER_LEN: usize = 128;

/// Magic string at byte 1 of an `.a78` header, also the cartridge signature
pub const MAGIC: &[u8; 9] = b"ATARI7800";

/// Largest supported image (no bank switching)
pub const MAX_ROM_LEN: usize = 48 * 1024;

/// Address of the cartridge signature
pub const SIGNATURE_ADDR: u16 = 0xFF7C;

/// Address of the cartridge control byte
pub const CONTROL_ADDR: u16 = 0xFF7B;

/// Address of the 6502 reset vector
pub const RESET_VECTOR_ADDR: u16 = 0xFFFC;

const TITLE: std::ops::Range<usize> = 0x11..0x31;
const CART_TYPE: usize = 53;
const CONTROLLER_1: usize = 54;
const CONTROLLER_2: usize = 55;
const TV_FORMAT: usize = 58;
const SAVE_DEVICE: usize = 63;

/// Cartridge hardware declared in the header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartType {
    /// Flat 16K/32K/48K image
    Standard,
    /// Bank-switched SuperGame
    SuperGame,
    /// SuperGame with on-cart RAM
    SuperGameRam,
    /// Absolute (F-18 Hornet)
    Absolute,
    /// Activision
    Activision,
    /// Unrecognised type byte
    Unknown(u8),
}

impl CartType {
    /// Decode the header type byte
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            0 => CartType::Standard,
            1 => CartType::SuperGame,
            2 => CartType::SuperGameRam,
            3 => CartType::Absolute,
            4 => CartType::Activision,
            other => CartType::Unknown(other),
        }
    }
}

impl fmt::Display for CartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CartType::Standard => f.write_str("Standard 7800"),
            CartType::SuperGame => f.write_str("SuperGame (bank-switched)"),
            CartType::SuperGameRam => f.write_str("SuperGame with RAM"),
            CartType::Absolute => f.write_str("Absolute"),
            CartType::Activision => f.write_str("Activision"),
            CartType::Unknown(b) => write!(f, "Unknown (0x{b:02X})"),
        }
    }
}

/// Video standard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TvFormat {
    /// 60 Hz
    Ntsc,
    /// 50 Hz
    Pal,
}

impl fmt::Display for TvFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TvFormat::Ntsc => "NTSC",
            TvFormat::Pal => "PAL",
        })
    }
}

/// Parsed `.a78` header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct A78Header {
    /// Game title, NUL padding stripped
    pub title: String,
    /// Declared cartridge hardware
    pub cart_type: CartType,
    /// Controller type bytes for ports 1 and 2
    pub controllers: [u8; 2],
    /// Declared video standard
    pub tv: TvFormat,
    /// Save device byte
    pub save_device: u8,
}

impl A78Header {
    /// Parse a header from the start of `bytes`
    ///
    /// Returns `None` when the magic is absent, i.e. the file is a raw image.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        let header = bytes.get(..HEADER_LEN)?;
        if &header[1..1 + MAGIC.len()] != MAGIC {
            return None;
        }

        let title = String::from_utf8_lossy(&header[TITLE])
            .trim_end_matches('\0')
            .trim()
            .to_string();

        Some(Self {
            title,
            cart_type: CartType::from_byte(header[CART_TYPE]),
            controllers: [header[CONTROLLER_1], header[CONTROLLER_2]],
            tv: if header[TV_FORMAT] == 1 {
                TvFormat::Pal
            } else {
                TvFormat::Ntsc
            },
            save_device: header[SAVE_DEVICE],
        })
    }
}

bitflags! {
    /// Control byte at `$FF7B`
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ControlByte: u8 {
        /// PAL console
        const PAL = 0x01;
        /// POKEY mapped at $4000
        const POKEY_4000 = 0x02;
    }
}

/// A cartridge image placed in the 6502 address space
#[derive(Debug, Clone)]
pub struct LoadedRom {
    /// Header, when the file carried one
    pub header: Option<A78Header>,
    /// First mapped address
    pub base: u16,
    /// Image bytes
    pub data: Vec<u8>,
}

impl LoadedRom {
    /// Load from the contents of a raw or `.a78` file
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let header = A78Header::parse(bytes);
        let image = if header.is_some() {
            &bytes[HEADER_LEN..]
        } else {
            bytes
        };

        if image.is_empty() {
            return Err(SimError::RomFormat("empty image".into()));
        }
        if image.len() > MAX_ROM_LEN {
            return Err(SimError::RomFormat(format!(
                "{} bytes exceeds the {} byte limit (bank switching is not supported)",
                image.len(),
                MAX_ROM_LEN
            )));
        }

        Ok(Self {
            header,
            base: placement(image.len()),
            data: image.to_vec(),
        })
    }

    /// Load a file from disk
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    /// Image offset of `addr`, if mapped
    fn offset_of(&self, addr: u16) -> Option<usize> {
        let offset = addr.checked_sub(self.base)? as usize;
        (offset < self.data.len()).then_some(offset)
    }

    /// Byte mapped at `addr`, if any
    pub fn read(&self, addr: u16) -> Option<u8> {
        self.offset_of(addr).map(|offset| self.data[offset])
    }

    /// Stamp the control byte and the `ATARI7800` signature
    ///
    /// The BIOS boots in 7800 mode only when the control byte is non-zero.
    pub fn sign(&mut self, control: ControlByte) -> Result<()> {
        if control.bits() == 0 {
            return Err(SimError::RomFormat(
                "control byte 0x00 selects 2600 mode".into(),
            ));
        }
        let (Some(ctrl), Some(sig)) = (
            self.offset_of(CONTROL_ADDR),
            self.offset_of(SIGNATURE_ADDR),
        ) else {
            return Err(SimError::RomFormat(format!(
                "${CONTROL_ADDR:04X} is not mapped by a {} byte image",
                self.data.len()
            )));
        };

        self.data[ctrl] = control.bits();
        self.data[sig..sig + MAGIC.len()].copy_from_slice(MAGIC);
        Ok(())
    }

    /// Write the raw image (no `.a78` header)
    pub fn write_image<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, &self.data)?;
        Ok(())
    }

    /// Whether the cartridge signature sits at `$FF7C`
    pub fn has_signature(&self) -> bool {
        (0..MAGIC.len() as u16)
            .map(|i| self.read(SIGNATURE_ADDR + i))
            .eq(MAGIC.iter().map(|&b| Some(b)))
    }

    /// Control byte at `$FF7B`, if mapped
    pub fn control_byte(&self) -> Option<ControlByte> {
        self.read(CONTROL_ADDR).map(ControlByte::from_bits_retain)
    }

    /// Reset vector, if mapped
    pub fn reset_vector(&self) -> Option<u16> {
        let lo = self.read(RESET_VECTOR_ADDR)?;
        let hi = self.read(RESET_VECTOR_ADDR + 1)?;
        Some(u16::from_le_bytes([lo, hi]))
    }

    /// Last mapped address
    pub fn end(&self) -> u16 {
        (self.base as usize + self.data.len() - 1) as u16
    }
}

/// Base address for an image of `len` bytes (1..=48K), ending at `$FFFF`
pub fn placement(len: usize) -> u16 {
    (0x10000 - len.clamp(1, MAX_ROM_LEN)) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image_48k() -> Vec<u8> {
        let mut rom = vec![0u8; MAX_ROM_LEN];
        let sig = (SIGNATURE_ADDR - 0x4000) as usize;
        rom[sig..sig + 9].copy_from_slice(MAGIC);
        rom[(CONTROL_ADDR - 0x4000) as usize] = 0x02;
        rom[(RESET_VECTOR_ADDR - 0x4000) as usize] = 0x00;
        rom[(RESET_VECTOR_ADDR - 0x4000) as usize + 1] = 0x40;
        rom
    }

    fn header(title: &str, cart_type: u8, tv: u8) -> Vec<u8> {
        let mut h = vec![0u8; HEADER_LEN];
        h[0] = 1;
        h[1..10].copy_from_slice(MAGIC);
        h[0x11..0x11 + title.len()].copy_from_slice(title.as_bytes());
        h[CART_TYPE] = cart_type;
        h[CONTROLLER_1] = 1;
        h[CONTROLLER_2] = 1;
        h[TV_FORMAT] = tv;
        h
    }

    #[test]
    fn test_raw_48k() {
        let rom = LoadedRom::from_bytes(&image_48k()).unwrap();
        assert!(rom.header.is_none());
        assert_eq!(rom.base, 0x4000);
        assert_eq!(rom.end(), 0xFFFF);
        assert!(rom.has_signature());
        assert_eq!(rom.control_byte(), Some(ControlByte::POKEY_4000));
        assert_eq!(rom.reset_vector(), Some(0x4000));
    }

    #[test]
    fn test_a78_header_stripped() {
        let mut file = header("Astro Wing", 0, 1);
        file.extend(image_48k());
        let rom = LoadedRom::from_bytes(&file).unwrap();

        let h = rom.header.as_ref().unwrap();
        assert_eq!(h.title, "Astro Wing");
        assert_eq!(h.cart_type, CartType::Standard);
        assert_eq!(h.tv, TvFormat::Pal);
        assert_eq!(h.controllers, [1, 1]);
        assert_eq!(rom.data.len(), MAX_ROM_LEN);
        assert!(rom.has_signature());
    }

    #[test]
    fn test_images_end_at_ffff() {
        assert_eq!(placement(48 * 1024), 0x4000);
        assert_eq!(placement(32 * 1024), 0x8000);
        assert_eq!(placement(16 * 1024), 0xC000);

        let mut image = vec![0xEA; 16 * 1024];
        let sig = (SIGNATURE_ADDR - 0xC000) as usize;
        image[sig..sig + 9].copy_from_slice(MAGIC);
        image[(RESET_VECTOR_ADDR - 0xC000) as usize] = 0x00;
        image[(RESET_VECTOR_ADDR - 0xC000) as usize + 1] = 0xC0;

        let rom = LoadedRom::from_bytes(&image).unwrap();
        assert_eq!(rom.base, 0xC000);
        assert_eq!(rom.end(), 0xFFFF);
        assert_eq!(rom.read(0xBFFF), None);
        assert_eq!(rom.read(0xC000), Some(0xEA));
        assert!(rom.has_signature());
        assert_eq!(rom.reset_vector(), Some(0xC000));
    }

    #[test]
    fn test_sign_raw_image() {
        let mut rom = LoadedRom::from_bytes(&[0u8; 32 * 1024]).unwrap();
        assert!(!rom.has_signature());
        assert_eq!(rom.control_byte(), Some(ControlByte::empty()));

        rom.sign(ControlByte::PAL).unwrap();
        assert!(rom.has_signature());
        assert_eq!(rom.control_byte(), Some(ControlByte::PAL));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("signed.bin");
        rom.write_image(&path).unwrap();
        let reloaded = LoadedRom::from_file(&path).unwrap();
        assert!(reloaded.header.is_none());
        assert!(reloaded.has_signature());
        assert_eq!(reloaded.data, rom.data);
    }

    #[test]
    fn test_sign_rejects_2600_mode_and_tiny_images() {
        let mut rom = LoadedRom::from_bytes(&[0u8; 16 * 1024]).unwrap();
        assert!(matches!(
            rom.sign(ControlByte::empty()),
            Err(SimError::RomFormat(_))
        ));

        // Ends at $FFFF but starts above $FF7B
        let mut tiny = LoadedRom::from_bytes(&[0u8; 64]).unwrap();
        assert!(matches!(
            tiny.sign(ControlByte::PAL),
            Err(SimError::RomFormat(_))
        ));
    }

    #[test]
    fn test_rejects_oversized_and_empty() {
        assert!(matches!(
            LoadedRom::from_bytes(&vec![0; MAX_ROM_LEN + 1]),
            Err(SimError::RomFormat(_))
        ));
        assert!(matches!(
            LoadedRom::from_bytes(&[]),
            Err(SimError::RomFormat(_))
        ));
        assert!(matches!(
            LoadedRom::from_bytes(&header("x", 0, 0)),
            Err(SimError::RomFormat(_))
        ));
    }

    #[test]
    fn test_cart_type_decoding() {
        assert_eq!(CartType::from_byte(1), CartType::SuperGame);
        assert_eq!(CartType::from_byte(4), CartType::Activision);
        assert_eq!(CartType::from_byte(9), CartType::Unknown(9));
        assert_eq!(CartType::Unknown(9).to_string(), "Unknown (0x09)");
    }
}
