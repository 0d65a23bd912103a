//! Color themes for the HUD core.
//!
//! The outer frame rings stay cyan no matter what; a theme only swaps the
//! quiet/loud endpoint pair the inner elements blend between.

/// Constant frame color, never affected by theme selection.
pub const FRAME_CYAN: Rgb = Rgb::new(0, 220, 255);
/// Softer frame variant used for the glow ring, ticks, and pulse fade-out.
pub const FRAME_CYAN_SOFT: Rgb = Rgb::new(0, 170, 220);

/// 24-bit color with linear blending helpers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Linear interpolation toward `other` by `t` in [0,1].
    pub fn mix(self, other: Rgb, t: f64) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let lerp = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * t) as u8;
        Rgb::new(lerp(self.r, other.r), lerp(self.g, other.g), lerp(self.b, other.b))
    }

    /// Scale all channels by `factor`, clamped to the channel range.
    pub fn scale(self, factor: f64) -> Rgb {
        let mul = |c: u8| (f64::from(c) * factor).clamp(0.0, 255.0) as u8;
        Rgb::new(mul(self.r), mul(self.g), mul(self.b))
    }

    /// Blend toward white; used for the sweep beam and orbit dot highlights.
    pub fn brighten(self, t: f64) -> Rgb {
        self.mix(Rgb::new(255, 255, 255), t)
    }
}

impl From<Rgb> for ratatui::style::Color {
    fn from(c: Rgb) -> Self {
        ratatui::style::Color::Rgb(c.r, c.g, c.b)
    }
}

/// Quiet/loud color pair plus display name for one theme slot.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub name: &'static str,
    pub quiet: Rgb,
    pub loud: Rgb,
}

pub const PALETTE_ORANGE_GOLD: Palette = Palette {
    name: "Orange / Gold",
    quiet: Rgb::new(230, 120, 20),
    loud: Rgb::new(255, 230, 80),
};

pub const PALETTE_NEON_PURPLE: Palette = Palette {
    name: "Neon Purple",
    quiet: Rgb::new(160, 80, 255),
    loud: Rgb::new(255, 140, 255),
};

pub const PALETTE_BATTLE_RED: Palette = Palette {
    name: "Battle Red",
    quiet: Rgb::new(230, 230, 230),
    loud: Rgb::new(255, 80, 80),
};

pub const PALETTE_BIO_SCANNER: Palette = Palette {
    name: "Bio Scanner",
    quiet: Rgb::new(40, 200, 80),
    loud: Rgb::new(220, 255, 140),
};

/// The fixed theme table, selected by the number keys 1-4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeId {
    #[default]
    OrangeGold,
    NeonPurple,
    BattleRed,
    BioScanner,
}

impl ThemeId {
    /// Map a number-key digit to a theme slot.
    pub fn from_key(key: u8) -> Option<Self> {
        match key {
            1 => Some(Self::OrangeGold),
            2 => Some(Self::NeonPurple),
            3 => Some(Self::BattleRed),
            4 => Some(Self::BioScanner),
            _ => None,
        }
    }

    pub fn palette(&self) -> Palette {
        match self {
            Self::OrangeGold => PALETTE_ORANGE_GOLD,
            Self::NeonPurple => PALETTE_NEON_PURPLE,
            Self::BattleRed => PALETTE_BATTLE_RED,
            Self::BioScanner => PALETTE_BIO_SCANNER,
        }
    }

    pub fn name(&self) -> &'static str {
        self.palette().name
    }

    /// Inner HUD color for the current loudness blend factor.
    pub fn inner_color(&self, blend: f64) -> Rgb {
        let palette = self.palette();
        palette.quiet.mix(palette.loud, blend)
    }
}

impl std::fmt::Display for ThemeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_key_covers_the_table() {
        assert_eq!(ThemeId::from_key(1), Some(ThemeId::OrangeGold));
        assert_eq!(ThemeId::from_key(2), Some(ThemeId::NeonPurple));
        assert_eq!(ThemeId::from_key(3), Some(ThemeId::BattleRed));
        assert_eq!(ThemeId::from_key(4), Some(ThemeId::BioScanner));
        assert_eq!(ThemeId::from_key(0), None);
        assert_eq!(ThemeId::from_key(5), None);
    }

    #[test]
    fn mix_endpoints_and_midpoint() {
        let a = Rgb::new(0, 0, 0);
        let b = Rgb::new(255, 215, 0);
        assert_eq!(a.mix(b, 0.0), a);
        assert_eq!(a.mix(b, 1.0), b);
        let mid = a.mix(b, 0.5);
        assert_eq!(mid.r, 127);
        assert_eq!(mid.g, 107);
        assert_eq!(mid.b, 0);
    }

    #[test]
    fn mix_clamps_blend_factor() {
        let a = Rgb::new(10, 10, 10);
        let b = Rgb::new(200, 200, 200);
        assert_eq!(a.mix(b, -3.0), a);
        assert_eq!(a.mix(b, 7.0), b);
    }

    #[test]
    fn inner_color_blends_quiet_to_loud() {
        let theme = ThemeId::OrangeGold;
        assert_eq!(theme.inner_color(0.0), PALETTE_ORANGE_GOLD.quiet);
        assert_eq!(theme.inner_color(1.0), PALETTE_ORANGE_GOLD.loud);
    }

    #[test]
    fn frame_color_is_theme_independent() {
        // Switching themes must never touch the frame constants.
        for key in 1..=4 {
            let theme = ThemeId::from_key(key).unwrap();
            let _ = theme.palette();
            assert_eq!(FRAME_CYAN, Rgb::new(0, 220, 255));
            assert_eq!(FRAME_CYAN_SOFT, Rgb::new(0, 170, 220));
        }
    }

    #[test]
    fn display_names_are_stable() {
        assert_eq!(ThemeId::OrangeGold.name(), "Orange / Gold");
        assert_eq!(ThemeId::NeonPurple.name(), "Neon Purple");
        assert_eq!(ThemeId::BattleRed.name(), "Battle Red");
        assert_eq!(ThemeId::BioScanner.name(), "Bio Scanner");
    }
}
