//! Distortion gating
//!
//! The top three bits of AUDCx pick which polynomial counters gate the
//! channel's square wave. The gate is precomputed into an 8x16 table indexed
//! by `(mode, noise_index)` so the synthesis step is a single lookup.

/// Mask bits of [`crate::PolyCounters::noise_index`]
const POLY4: u8 = 0x01;
const POLY5: u8 = 0x02;
const POLY9: u8 = 0x04;
const POLY17: u8 = 0x08;

/// Distortion selector (AUDCx bits 7-5)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DistortionMode {
    /// 5-bit then 17-bit polynomial
    Poly5Poly17 = 0,
    /// 5-bit polynomial
    Poly5 = 1,
    /// 4-bit then 17-bit polynomial
    Poly4Poly17 = 2,
    /// 4-bit polynomial
    Poly4 = 3,
    /// 17-bit polynomial
    Poly17 = 4,
    /// Pure tone
    PureTone = 5,
    /// 9-bit polynomial
    Poly9 = 6,
    /// Pure tone (alternate encoding)
    PureToneAlt = 7,
}

impl DistortionMode {
    /// Decode a 3-bit mode index (upper bits ignored)
    pub fn from_index(index: usize) -> Self {
        match index & 0x07 {
            0 => DistortionMode::Poly5Poly17,
            1 => DistortionMode::Poly5,
            2 => DistortionMode::Poly4Poly17,
            3 => DistortionMode::Poly4,
            4 => DistortionMode::Poly17,
            5 => DistortionMode::PureTone,
            6 => DistortionMode::Poly9,
            _ => DistortionMode::PureToneAlt,
        }
    }

    /// Polynomial bits that must all be high for the gate to open
    const fn required_bits(self) -> u8 {
        match self {
            DistortionMode::Poly5Poly17 => POLY5 | POLY17,
            DistortionMode::Poly5 => POLY5,
            DistortionMode::Poly4Poly17 => POLY4 | POLY17,
            DistortionMode::Poly4 => POLY4,
            DistortionMode::Poly17 => POLY17,
            DistortionMode::PureTone | DistortionMode::PureToneAlt => 0,
            DistortionMode::Poly9 => POLY9,
        }
    }

    /// True for the two modes that never consult the noise counters
    pub fn is_pure(self) -> bool {
        self.required_bits() == 0
    }
}

const MODES: [DistortionMode; 8] = [
    DistortionMode::Poly5Poly17,
    DistortionMode::Poly5,
    DistortionMode::Poly4Poly17,
    DistortionMode::Poly4,
    DistortionMode::Poly17,
    DistortionMode::PureTone,
    DistortionMode::Poly9,
    DistortionMode::PureToneAlt,
];

const fn build_lut() -> [[bool; 16]; 8] {
    let mut lut = [[false; 16]; 8];
    let mut mode = 0;
    while mode < 8 {
        let required = MODES[mode].required_bits();
        let mut noise = 0;
        while noise < 16 {
            lut[mode][noise] = (noise as u8) & required == required;
            noise += 1;
        }
        mode += 1;
    }
    lut
}

/// Gate truth table, `DISTORTION_LUT[mode][noise_index]`
pub static DISTORTION_LUT: [[bool; 16]; 8] = build_lut();

/// Look up the gate for a mode and packed noise index
#[inline]
pub fn gate(mode: usize, noise_index: usize) -> bool {
    DISTORTION_LUT[mode & 0x07][noise_index & 0x0F]
}
