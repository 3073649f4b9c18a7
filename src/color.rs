// src/color.rs

//! Defines the `Rgb` colour triple and the eight SGR foreground colours
//! (`NamedColor`) with their normal and bold palettes.

use serde::{Deserialize, Serialize};

/// An RGB true colour, with each component from 0 to 255.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb(r, g, b)
    }
}

// SGR foreground colour range (30-37).
const SGR_FG_OFFSET: u16 = 30;
const SGR_FG_END: u16 = 37;

/// Standard ANSI foreground colours selected by SGR codes 30-37.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum NamedColor {
    Black = 0,
    Red = 1,
    Green = 2,
    Yellow = 3,
    Blue = 4,
    Magenta = 5,
    Cyan = 6,
    White = 7, // Also known as Grey
}

impl NamedColor {
    const ALL: [NamedColor; 8] = [
        NamedColor::Black,
        NamedColor::Red,
        NamedColor::Green,
        NamedColor::Yellow,
        NamedColor::Blue,
        NamedColor::Magenta,
        NamedColor::Cyan,
        NamedColor::White,
    ];

    /// Maps an SGR foreground code (30-37) to its `NamedColor`.
    /// Returns `None` for any other code.
    pub fn from_sgr_code(code: u16) -> Option<Self> {
        if !(SGR_FG_OFFSET..=SGR_FG_END).contains(&code) {
            return None;
        }
        Some(Self::ALL[(code - SGR_FG_OFFSET) as usize])
    }

    /// Returns the SGR foreground code (30-37) for this colour.
    pub fn sgr_code(self) -> u16 {
        SGR_FG_OFFSET + self as u16
    }

    /// Colour used for `ESC[<code>m`.
    pub fn normal_rgb(self) -> Rgb {
        match self {
            NamedColor::Black => Rgb(0, 0, 0),
            NamedColor::Red => Rgb(170, 0, 0),
            NamedColor::Green => Rgb(0, 170, 0),
            NamedColor::Yellow => Rgb(170, 85, 0),
            NamedColor::Blue => Rgb(0, 0, 170),
            NamedColor::Magenta => Rgb(170, 0, 170),
            NamedColor::Cyan => Rgb(0, 170, 170),
            NamedColor::White => Rgb(170, 170, 170),
        }
    }

    /// Colour used for `ESC[<code>;1m`.
    pub fn bold_rgb(self) -> Rgb {
        match self {
            NamedColor::Black => Rgb(85, 85, 85),
            NamedColor::Red => Rgb(255, 85, 85),
            NamedColor::Green => Rgb(85, 255, 85),
            NamedColor::Yellow => Rgb(255, 255, 85),
            // Not a typo: blue's bold variant keeps a 225 blue channel.
            NamedColor::Blue => Rgb(85, 85, 225),
            NamedColor::Magenta => Rgb(255, 85, 255),
            NamedColor::Cyan => Rgb(85, 255, 255),
            NamedColor::White => Rgb(255, 255, 255),
        }
    }
}
