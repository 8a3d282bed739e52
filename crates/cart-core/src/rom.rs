//! Cartridge ROM image
//!
//! A fixed byte table mapped at a base address. Everything the table does not
//! cover reads back as open bus.

/// Value returned for addresses the image does not cover
pub const OPEN_BUS: u8 = 0xFF;

/// Default 48K image base ($4000-$FFFF)
pub const DEFAULT_ROM_BASE: u16 = 0x4000;

/// Size of a full 48K image
pub const ROM_48K: usize = 48 * 1024;

/// Read-only view of a cartridge image
#[derive(Debug, Clone, Copy)]
pub struct RomImage<'a> {
    base: u16,
    data: &'a [u8],
}

impl<'a> RomImage<'a> {
    /// Map `data` starting at `base`
    pub const fn new(base: u16, data: &'a [u8]) -> Self {
        Self { base, data }
    }

    /// First mapped address
    #[inline]
    pub fn base(&self) -> u16 {
        self.base
    }

    /// Image length in bytes
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True when the image holds no bytes
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// True for every address at or above the base (the ROM region)
    #[inline(always)]
    pub fn in_region(&self, addr: u16) -> bool {
        addr >= self.base
    }

    /// Byte at `addr`, or [`OPEN_BUS`] outside the table
    #[inline(always)]
    pub fn read(&self, addr: u16) -> u8 {
        addr.checked_sub(self.base)
            .and_then(|offset| self.data.get(offset as usize))
            .copied()
            .unwrap_or(OPEN_BUS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i * 7 + (i >> 8)) as u8).collect()
    }

    #[test]
    fn test_full_48k_mapping() {
        let data = pattern(ROM_48K);
        let rom = RomImage::new(DEFAULT_ROM_BASE, &data);

        for addr in [0x4000u16, 0x5000, 0x8000, 0xFF7C, 0xFFFF] {
            assert_eq!(rom.read(addr), data[(addr - 0x4000) as usize]);
            assert!(rom.in_region(addr));
        }
        for addr in [0x0000u16, 0x0450, 0x1800, 0x3FFF] {
            assert_eq!(rom.read(addr), OPEN_BUS);
            assert!(!rom.in_region(addr));
        }
    }

    #[test]
    fn test_short_image_reads_open_bus_past_end() {
        let data = pattern(16);
        let rom = RomImage::new(0x8000, &data);
        assert_eq!(rom.read(0x800F), data[15]);
        assert_eq!(rom.read(0x8010), OPEN_BUS);
        assert_eq!(rom.read(0xFFFF), OPEN_BUS);
        assert!(rom.in_region(0x8010));
        assert_eq!(rom.len(), 16);
    }

    #[test]
    fn test_empty_image() {
        let rom = RomImage::new(0x4000, &[]);
        assert!(rom.is_empty());
        assert_eq!(rom.read(0x4000), OPEN_BUS);
    }
}
