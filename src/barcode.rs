// src/barcode.rs
//! Barcode normalization and classification.
//!
//! A scanned payload becomes a [`NormalizedBarcode`] only after it matches one of
//! the accepted product-code shapes (EAN-8, UPC-A, EAN-13, GTIN-14, ISBN-10,
//! ISBN-13). The camera layer's own "is this a product?" check goes through
//! [`ScannedCode::is_product_code`], which shares the same pattern set.

use once_cell::sync::OnceCell;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Raised when a scanned payload is not a product barcode.
/// This is the only error a lookup ever returns to its caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("not a recognized product code: {normalized:?}")]
pub struct ValidationError {
    pub raw: String,
    pub normalized: String,
}

/// Strip every whitespace and hyphen character.
pub fn normalize(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect()
}

fn product_patterns() -> &'static [Regex] {
    static PATTERNS: OnceCell<Vec<Regex>> = OnceCell::new();
    PATTERNS.get_or_init(|| {
        [
            r"^\d{8}$",        // EAN-8
            r"^\d{12}$",       // UPC-A
            r"^\d{13}$",       // EAN-13
            r"^\d{14}$",       // GTIN-14
            r"^\d{10}$",       // ISBN-10
            r"^97[89]\d{10}$", // ISBN-13
        ]
        .iter()
        .map(|p| Regex::new(p).expect("static barcode pattern"))
        .collect()
    })
}

/// True iff `normalized` matches at least one accepted product-code shape.
/// `\d` is ASCII-only here; full-width digits are rejected.
pub fn is_valid_product_barcode(normalized: &str) -> bool {
    normalized.is_ascii() && product_patterns().iter().any(|re| re.is_match(normalized))
}

/// Digit string that passed [`is_valid_product_barcode`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct NormalizedBarcode(String);

impl NormalizedBarcode {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let normalized = normalize(raw);
        if is_valid_product_barcode(&normalized) {
            Ok(Self(normalized))
        } else {
            Err(ValidationError {
                raw: raw.to_string(),
                normalized,
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First three digits; every accepted shape has at least eight.
    pub fn prefix(&self) -> &str {
        &self.0[..3]
    }
}

impl TryFrom<String> for NormalizedBarcode {
    type Error = ValidationError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw)
    }
}

impl PartialEq<str> for NormalizedBarcode {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for NormalizedBarcode {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl fmt::Display for NormalizedBarcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedBarcode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Encoding standard reported by the camera decoder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Symbology {
    Ean13,
    Ean8,
    UpcA,
    UpcE,
    Code128,
    Code39,
    Code93,
    Codabar,
    Itf14,
    Interleaved2of5,
    Qr,
    Pdf417,
    Aztec,
    DataMatrix,
    Other(String),
}

impl Symbology {
    /// Parse the platform's type identifier (`"ean13"`, `"upc_a"`,
    /// `"org.gs1.EAN-13"`, ...). Unknown names are kept verbatim in `Other`.
    pub fn from_platform(name: &str) -> Self {
        let lower = name.trim().to_ascii_lowercase();
        let key: String = lower
            .strip_prefix("org.gs1.")
            .or_else(|| lower.strip_prefix("org.iso."))
            .unwrap_or(&lower)
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect();
        match key.as_str() {
            "ean13" => Self::Ean13,
            "ean8" => Self::Ean8,
            "upca" => Self::UpcA,
            "upce" => Self::UpcE,
            "code128" => Self::Code128,
            "code39" => Self::Code39,
            "code93" => Self::Code93,
            "codabar" => Self::Codabar,
            "itf14" => Self::Itf14,
            "interleaved2of5" | "i2of5" => Self::Interleaved2of5,
            "qr" | "qrcode" => Self::Qr,
            "pdf417" => Self::Pdf417,
            "aztec" => Self::Aztec,
            "datamatrix" => Self::DataMatrix,
            _ => Self::Other(name.trim().to_string()),
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Self::Ean13 => "EAN-13",
            Self::Ean8 => "EAN-8",
            Self::UpcA => "UPC-A",
            Self::UpcE => "UPC-E",
            Self::Code128 => "Code 128",
            Self::Code39 => "Code 39",
            Self::Code93 => "Code 93",
            Self::Codabar => "Codabar",
            Self::Itf14 => "ITF-14",
            Self::Interleaved2of5 => "Interleaved 2 of 5",
            Self::Qr => "QR Code",
            Self::Pdf417 => "PDF417",
            Self::Aztec => "Aztec",
            Self::DataMatrix => "Data Matrix",
            Self::Other(name) if name.is_empty() => "Unknown",
            Self::Other(name) => name,
        }
    }

    /// Symbologies that in practice only carry retail product codes.
    pub fn is_product_symbology(&self) -> bool {
        matches!(
            self,
            Self::Ean13 | Self::Ean8 | Self::UpcA | Self::UpcE | Self::Code128 | Self::Code39
        )
    }
}

/// Decoded symbol handed over by the camera layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScannedCode {
    pub raw_payload: String,
    pub symbology: Symbology,
}

impl ScannedCode {
    pub fn new(symbology: Symbology, raw_payload: impl Into<String>) -> Self {
        Self {
            raw_payload: raw_payload.into(),
            symbology,
        }
    }

    /// Whether the scan should be offered for a product lookup.
    pub fn is_product_code(&self) -> bool {
        if self.raw_payload.is_empty() {
            return false;
        }
        is_valid_product_barcode(&normalize(&self.raw_payload))
            || self.symbology.is_product_symbology()
    }
}
