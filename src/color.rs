use eframe::egui::Color32;
use plotters::style::RGBColor;

// ---------------------------------------------------------------------------
// Figure colours
// ---------------------------------------------------------------------------

/// A backend-neutral sRGB colour, convertible for both renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const BLUE: Rgb = Rgb(0, 0, 255);
    pub const RED: Rgb = Rgb(255, 0, 0);
    pub const LIME: Rgb = Rgb(0, 255, 0);
    /// First colour of the default publication cycle.
    pub const CYCLE_BLUE: Rgb = Rgb(0x1f, 0x77, 0xb4);
    /// Second colour of the default publication cycle.
    pub const CYCLE_ORANGE: Rgb = Rgb(0xff, 0x7f, 0x0e);

    /// Colour `i` of the default cycle used for otherwise unstyled series.
    pub fn cycle(i: usize) -> Rgb {
        const CYCLE: [Rgb; 4] = [
            Rgb::CYCLE_BLUE,
            Rgb::CYCLE_ORANGE,
            Rgb(0x2c, 0xa0, 0x2c),
            Rgb(0xd6, 0x27, 0x28),
        ];
        CYCLE[i % CYCLE.len()]
    }

    pub fn to_plotters(self) -> RGBColor {
        RGBColor(self.0, self.1, self.2)
    }

    pub fn to_egui(self) -> Color32 {
        Color32::from_rgb(self.0, self.1, self.2)
    }
}

impl From<Rgb> for RGBColor {
    fn from(c: Rgb) -> Self {
        c.to_plotters()
    }
}

impl From<Rgb> for Color32 {
    fn from(c: Rgb) -> Self {
        c.to_egui()
    }
}
