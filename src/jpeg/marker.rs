//! JPEG marker vocabulary and classification
//!
//! Every structural decision the rewriter makes goes through [`classify`]
//! followed by [`MarkerClass::action`], so the transition table lives in one
//! place and can be tested exhaustively over all 256 marker bytes.

pub const MARKER_PREFIX: u8 = 0xFF; // All markers start with this byte

pub const TEM: u8 = 0x01; // Temporary private use, no length
pub const SOF0: u8 = 0xC0; // Start of Frame 0, Baseline DCT
pub const DHT: u8 = 0xC4; // Define Huffman Table
pub const JPG: u8 = 0xC8; // Reserved for JPEG extensions
pub const DAC: u8 = 0xCC; // Define Arithmetic Coding conditioning
pub const SOF15: u8 = 0xCF; // Start of Frame 15, Differential Lossless, Arithmetic
pub const RST0: u8 = 0xD0; // Restart marker 0
pub const RST7: u8 = 0xD7; // Restart marker 7
pub const SOI: u8 = 0xD8; // Start of Image
pub const EOI: u8 = 0xD9; // End of Image
pub const SOS: u8 = 0xDA; // Start of Scan
pub const DQT: u8 = 0xDB; // Define Quantization Table
pub const DNL: u8 = 0xDC; // Define Number of Lines
pub const DRI: u8 = 0xDD; // Define Restart Interval
pub const APP0: u8 = 0xE0; // Application Segment 0, JFIF
pub const APP1: u8 = 0xE1; // Application Segment 1, EXIF / XMP
pub const APP15: u8 = 0xEF; // Application Segment 15
pub const COM: u8 = 0xFE; // Comment

/// Identifier that opens an EXIF payload inside APP1.
pub const EXIF_IDENTIFIER: &[u8] = b"Exif\0\0";
/// Namespace that opens an XMP packet inside APP1.
pub const XMP_IDENTIFIER: &[u8] = b"http://ns.adobe.com/xap/1.0/\0";

/// Start-of-image marker as it appears at offset 0.
pub const SOI_MARKER: [u8; 2] = [MARKER_PREFIX, SOI];

/// Structural category of the byte following a `0xFF`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerClass {
    /// Standalone marker without a length field (SOI, EOI, TEM).
    Structural { end_of_image: bool },
    /// RSTn, only expected inside entropy-coded data.
    Restart(u8),
    /// SOS; everything from here on is opaque scan data.
    ScanStart,
    /// Length-prefixed segment copied verbatim.
    LengthPrefixedKeep,
    /// Length-prefixed segment elided from the output (APP1).
    LengthPrefixedDrop,
    /// `0xFF` fill byte; the real marker code comes after the run.
    Fill,
    /// `FF 00` stuffing; not a marker at all.
    Stuffed,
}

/// What the scanner does when it meets a marker of a given class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanAction {
    /// Copy the two marker bytes and keep scanning.
    CopyMarker,
    /// Fold the fill byte into whichever marker follows it.
    ExtendFill,
    /// Copy everything from the marker to the end of the buffer.
    TailCopy,
    /// Copy marker, length field and payload.
    CopySegment,
    /// Skip marker, length field and payload.
    DropSegment,
}

/// Classifies the code byte of a `0xFF xx` marker.
pub const fn classify(code: u8) -> MarkerClass {
    match code {
        MARKER_PREFIX => MarkerClass::Fill,
        0x00 => MarkerClass::Stuffed,
        SOI | TEM => MarkerClass::Structural { end_of_image: false },
        EOI => MarkerClass::Structural { end_of_image: true },
        RST0..=RST7 => MarkerClass::Restart(code - RST0),
        SOS => MarkerClass::ScanStart,
        APP1 => MarkerClass::LengthPrefixedDrop,
        0x02..=0xBF | SOF0..=SOF15 | DQT..=0xDF | APP0 | 0xE2..=0xFE => {
            MarkerClass::LengthPrefixedKeep
        }
    }
}

impl MarkerClass {
    /// Transition taken by the scanner for this class.
    pub const fn action(self) -> ScanAction {
        match self {
            MarkerClass::Structural { end_of_image: true } => ScanAction::TailCopy,
            MarkerClass::Structural { end_of_image: false } => ScanAction::CopyMarker,
            MarkerClass::Restart(_) | MarkerClass::Stuffed => ScanAction::CopyMarker,
            MarkerClass::ScanStart => ScanAction::TailCopy,
            MarkerClass::LengthPrefixedKeep => ScanAction::CopySegment,
            MarkerClass::LengthPrefixedDrop => ScanAction::DropSegment,
            MarkerClass::Fill => ScanAction::ExtendFill,
        }
    }

    pub const fn has_length(self) -> bool {
        matches!(
            self,
            MarkerClass::LengthPrefixedKeep | MarkerClass::LengthPrefixedDrop
        )
    }
}

/// Short mnemonic for log output.
pub fn marker_name(code: u8) -> &'static str {
    match code {
        TEM => "TEM",
        DHT => "DHT",
        JPG => "JPG",
        DAC => "DAC",
        SOF0..=SOF15 => "SOF",
        RST0..=RST7 => "RST",
        SOI => "SOI",
        EOI => "EOI",
        SOS => "SOS",
        DQT => "DQT",
        DNL => "DNL",
        DRI => "DRI",
        APP0 => "APP0",
        APP1 => "APP1",
        0xE2..=APP15 => "APPn",
        COM => "COM",
        _ => "reserved",
    }
}
