//! Parsing of user-entered `WIDTHxHEIGHT` dimensions

use crate::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const DELIMITERS: &[char] = &['x', 'X', '×', '*'];

/// Positive pixel dimensions entered by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Result<Self, AppError> {
        if width == 0 || height == 0 {
            return Err(AppError::InvalidDimensionInput(format!("{}x{}", width, height)));
        }
        Ok(Self { width, height })
    }

    pub fn as_tuple(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for Dimensions {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_dimensions(s)
    }
}

/// Parse `"800x600"` (also `X`, `×`, `*`) into positive dimensions
pub fn parse_dimensions(input: &str) -> Result<Dimensions, AppError> {
    let invalid = || AppError::InvalidDimensionInput(input.to_string());

    let mut parts = input.trim().split(DELIMITERS);
    let (Some(w), Some(h), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(invalid());
    };

    let width: u32 = w.trim().parse().map_err(|_| invalid())?;
    let height: u32 = h.trim().parse().map_err(|_| invalid())?;

    Dimensions::new(width, height).map_err(|_| invalid())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        assert_eq!(parse_dimensions("800x600").unwrap(), Dimensions { width: 800, height: 600 });
        assert_eq!(parse_dimensions(" 900 X 900 ").unwrap().as_tuple(), (900, 900));
        assert_eq!(parse_dimensions("1920×1080").unwrap().as_tuple(), (1920, 1080));
        assert_eq!("640*480".parse::<Dimensions>().unwrap().as_tuple(), (640, 480));
    }

    #[test]
    fn test_parse_invalid() {
        for input in ["", "800", "800x", "x600", "0x600", "800x0", "-1x5", "8x6x4", "abcxdef", "800,600"] {
            assert!(
                matches!(parse_dimensions(input), Err(AppError::InvalidDimensionInput(_))),
                "accepted {:?}",
                input
            );
        }
    }

    #[test]
    fn test_display_round_trip() {
        let dims = Dimensions::new(900, 900).unwrap();
        assert_eq!(dims.to_string(), "900x900");
    }
}
