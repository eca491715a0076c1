use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

/// 8-bit RGB, written as `#rrggbb` in config files and the DOM.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(pub [u8; 3]);

impl Color {
    pub const WHITE: Color = Color([0xff, 0xff, 0xff]);
    pub const BLACK: Color = Color([0x00, 0x00, 0x00]);
    pub const RED: Color = Color([0xff, 0x00, 0x00]);
    pub const BLUE: Color = Color([0x00, 0x00, 0xff]);
    pub const GREEN: Color = Color([0x00, 0x80, 0x00]);
    pub const YELLOW: Color = Color([0xff, 0xff, 0x00]);
    pub const ORANGE: Color = Color([0xff, 0xa5, 0x00]);
    pub const PURPLE: Color = Color([0x80, 0x00, 0x80]);
    pub const BROWN: Color = Color([0xa5, 0x2a, 0x2a]);

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0[0], self.0[1], self.0[2])
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseColorError(String);

impl Display for ParseColorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid color {:?}, expected #rrggbb or #rgb", self.0)
    }
}

impl std::error::Error for ParseColorError {}

impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseColorError(s.to_string());
        let hex = s.trim().strip_prefix('#').ok_or_else(err)?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(err());
        }

        let channel = |digits: &str| u8::from_str_radix(digits, 16).map_err(|_| err());

        match hex.len() {
            6 => Ok(Color([
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            ])),

            // #abc is shorthand for #aabbcc
            3 => Ok(Color([
                channel(&hex[0..1])? * 0x11,
                channel(&hex[1..2])? * 0x11,
                channel(&hex[2..3])? * 0x11,
            ])),

            _ => Err(err()),
        }
    }
}

impl TryFrom<String> for Color {
    type Error = ParseColorError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> String {
        color.to_hex()
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

macro_rules! coordinate_types {
    ($($Coord:ident),*) => {$(
        #[derive(Default, Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
        pub struct $Coord {
            pub x: f32,
            pub y: f32,
        }

        impl Display for $Coord {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{:.02},{:.02}", self.x, self.y)
            }
        }
    )*};
}

// PixelPos is in viewport (client) space, SurfacePos in the logical pixel buffer
coordinate_types!(PixelPos, SurfacePos);

#[derive(Default, Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Size {
        Size { width, height }
    }

    pub fn is_empty(&self) -> bool {
        !(self.width > 0. && self.height > 0.)
    }
}

impl Display for Size {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.02}x{:.02}", self.width, self.height)
    }
}

#[derive(Default, Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Rect {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    pub fn origin(&self) -> PixelPos {
        PixelPos {
            x: self.x,
            y: self.y,
        }
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.size().is_empty()
    }
}

impl Display for Rect {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}+{}", self.origin(), self.size())
    }
}

/// Largest rectangle with the aspect ratio of `image` that fits inside
/// `surface`, centered. Empty if either size is degenerate.
pub fn fit_rect(image: Size, surface: Size) -> Rect {
    if image.is_empty() || surface.is_empty() {
        return Rect::default();
    }

    let h_ratio = surface.width / image.width;
    let v_ratio = surface.height / image.height;
    let ratio = h_ratio.min(v_ratio);

    let width = image.width * ratio;
    let height = image.height * ratio;

    Rect {
        x: (surface.width - width) / 2.,
        y: (surface.height - height) / 2.,
        width,
        height,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const EPSILON: f32 = 1e-3;

    fn touches_one_bound(rect: Rect, surface: Size) -> bool {
        (rect.width - surface.width).abs() < EPSILON
            || (rect.height - surface.height).abs() < EPSILON
    }

    #[test]
    fn parse_colors() {
        assert_eq!("#000000".parse::<Color>(), Ok(Color::BLACK));
        assert_eq!("#FF0000".parse::<Color>(), Ok(Color::RED));
        assert_eq!("#00f".parse::<Color>(), Ok(Color::BLUE));
        assert!("000000".parse::<Color>().is_err());
        assert!("#12345".parse::<Color>().is_err());
        assert!("#gg0000".parse::<Color>().is_err());
        assert_eq!(Color::ORANGE.to_string(), "#ffa500");
    }

    #[test]
    fn wide_image_fills_width() {
        let surface = Size::new(600., 400.);
        let rect = fit_rect(Size::new(1200., 400.), surface);
        assert_eq!(rect, Rect::new(0., 100., 600., 200.));
    }

    #[test]
    fn tall_image_fills_height() {
        let surface = Size::new(600., 400.);
        let rect = fit_rect(Size::new(100., 200.), surface);
        assert_eq!(rect, Rect::new(200., 0., 200., 400.));
    }

    #[test]
    fn fit_stays_inside_and_touches_a_bound() {
        let surfaces = [
            Size::new(600., 400.),
            Size::new(480., 288.),
            Size::new(1., 1000.),
            Size::new(333., 333.),
        ];
        let images = [
            Size::new(512., 512.),
            Size::new(13., 7.),
            Size::new(800., 1200.),
            Size::new(4000., 10.),
        ];

        for surface in surfaces {
            for image in images {
                let rect = fit_rect(image, surface);
                assert!(rect.width <= surface.width + EPSILON, "{rect} in {surface}");
                assert!(rect.height <= surface.height + EPSILON, "{rect} in {surface}");
                assert!(rect.x >= -EPSILON && rect.y >= -EPSILON, "{rect} in {surface}");
                assert!(touches_one_bound(rect, surface), "{rect} in {surface}");
            }
        }
    }

    #[test]
    fn degenerate_fit_is_empty() {
        assert!(fit_rect(Size::new(0., 10.), Size::new(10., 10.)).is_empty());
        assert!(fit_rect(Size::new(10., 10.), Size::new(10., 0.)).is_empty());
    }
}
