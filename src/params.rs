//! Generation parameters understood by the renderer.
//!
//! These mirror the string vocabulary the renderer accepts on the wire
//! (`"ja"`, `"png"`, `"Normal"`, ...). `as_str` always returns the exact wire
//! literal so requests can be built without re-formatting.

use std::fmt::{self, Display};
use std::str::FromStr;

use crate::Error;

/// Language used for text on the generated card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lang {
    En,
    #[default]
    Ja,
}

impl Lang {
    pub fn as_str(&self) -> &'static str {
        match self {
            Lang::En => "en",
            Lang::Ja => "ja",
        }
    }
}

impl Display for Lang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses the renderer's language tags. Unknown tags fall back to Japanese,
/// the renderer's home locale.
impl From<&str> for Lang {
    fn from(s: &str) -> Self {
        match s {
            "en" | "en-US" | "en-GB" => Lang::En,
            _ => Lang::Ja,
        }
    }
}

/// Encoding of the returned image bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageFormat {
    #[default]
    Png,
    Jpeg,
    /// Raw RGBA pixel buffer, no container
    Pixel,
}

impl ImageFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Pixel => "pixel",
        }
    }

    /// MIME type the HTTP API labels this format with
    pub fn mime(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Pixel => "image/raw",
        }
    }
}

impl Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses the renderer's `image_format` wire strings
impl FromStr for ImageFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "png" => Ok(ImageFormat::Png),
            "jpeg" => Ok(ImageFormat::Jpeg),
            "pixel" => Ok(ImageFormat::Pixel),
            _ => Err(Error::InvalidParameter(format!("{} is not ImageFormat", s))),
        }
    }
}

/// Render mode: which stat the artifact score is weighted towards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScoreCounter {
    #[default]
    Normal,
    Hp,
    Def,
    ElementalMastery,
    ChargeEfficiency,
}

impl ScoreCounter {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreCounter::Normal => "Normal",
            ScoreCounter::Hp => "Hp",
            ScoreCounter::Def => "Def",
            ScoreCounter::ElementalMastery => "ElementalMastery",
            ScoreCounter::ChargeEfficiency => "ChargeEfficiency",
        }
    }
}

impl Display for ScoreCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses the renderer's `counter` wire strings
impl FromStr for ScoreCounter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Normal" => Ok(ScoreCounter::Normal),
            "Hp" => Ok(ScoreCounter::Hp),
            "Def" => Ok(ScoreCounter::Def),
            "ElementalMastery" => Ok(ScoreCounter::ElementalMastery),
            "ChargeEfficiency" => Ok(ScoreCounter::ChargeEfficiency),
            _ => Err(Error::InvalidParameter(format!("{} is not ScoreCounter", s))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lang_falls_back_to_japanese() {
        assert_eq!(Lang::from("en-GB"), Lang::En);
        assert_eq!(Lang::from("en"), Lang::En);
        assert_eq!(Lang::from("ja"), Lang::Ja);
        assert_eq!(Lang::from("fr"), Lang::Ja);
        assert_eq!(Lang::default().as_str(), "ja");
    }

    #[test]
    fn image_format_is_strict() {
        assert_eq!("jpeg".parse::<ImageFormat>().unwrap(), ImageFormat::Jpeg);
        assert_eq!(ImageFormat::Pixel.mime(), "image/raw");
        let err = "PNG".parse::<ImageFormat>().unwrap_err();
        assert_eq!(err.to_string(), "Invalid parameter: PNG is not ImageFormat");
    }

    #[test]
    fn score_counter_names() {
        assert_eq!(
            "ElementalMastery".parse::<ScoreCounter>().unwrap(),
            ScoreCounter::ElementalMastery
        );
        assert_eq!(ScoreCounter::default().to_string(), "Normal");
        assert!("normal".parse::<ScoreCounter>().is_err());
    }
}
