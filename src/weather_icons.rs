use embedded_graphics::{
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::{Circle, Line, PrimitiveStyle, Rectangle, RoundedRectangle, Triangle},
};

/// Weather icon identifiers mapped to OpenWeatherMap condition codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum WeatherIcon {
    Clear = 0,
    FewClouds = 1,
    ScatteredClouds = 2,
    BrokenClouds = 3,
    Overcast = 4,
    ShowerRain = 5,
    Rain = 6,
    Drizzle = 7,
    Thunderstorm = 8,
    Snow = 9,
    Atmosphere = 10,
    Mist = 11,
    Fog = 12,
    /// No data yet.
    #[default]
    Unknown = 13,
}

/// Icons are designed on a 16x16 grid and scaled to the requested size.
const GRID: f32 = 16.0;

struct Canvas {
    origin: Point,
    scale: f32,
}

impl Canvas {
    fn p(&self, x: f32, y: f32) -> Point {
        self.origin
            + Point::new((x * self.scale).round() as i32, (y * self.scale).round() as i32)
    }

    fn len(&self, v: f32) -> u32 {
        ((v * self.scale).round() as u32).max(1)
    }

    fn stroke(&self) -> PrimitiveStyle<BinaryColor> {
        PrimitiveStyle::with_stroke(BinaryColor::On, self.len(1.0).min(2))
    }

    fn fill(&self) -> PrimitiveStyle<BinaryColor> {
        PrimitiveStyle::with_fill(BinaryColor::On)
    }

    fn line<D>(&self, target: &mut D, from: (f32, f32), to: (f32, f32))
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        Line::new(self.p(from.0, from.1), self.p(to.0, to.1))
            .into_styled(self.stroke())
            .draw(target)
            .ok();
    }

    /// Sun disc with eight rays, mirror-symmetric about its centre pixel.
    fn sun<D>(&self, target: &mut D, cx: f32, cy: f32, r: f32)
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        let center = self.p(cx, cy);
        // Odd diameter keeps the disc centred on a pixel.
        Circle::with_center(center, self.len(r * 2.0) | 1)
            .into_styled(self.fill())
            .draw(target)
            .ok();

        let ray_in = (r + 1.5) * self.scale;
        let ray_out = (r + 3.0) * self.scale;
        let ray = PrimitiveStyle::with_stroke(BinaryColor::On, 1);
        for (dx, dy) in [
            (1.0, 0.0),
            (-1.0, 0.0),
            (0.0, 1.0),
            (0.0, -1.0),
            (0.7, 0.7),
            (-0.7, 0.7),
            (0.7, -0.7),
            (-0.7, -0.7),
        ] {
            let at = |d: f32| {
                center + Point::new((dx * d).round() as i32, (dy * d).round() as i32)
            };
            Line::new(at(ray_in), at(ray_out))
                .into_styled(ray)
                .draw(target)
                .ok();
        }
    }

    /// Solid cloud with its flat bottom at `base`.
    fn cloud<D>(&self, target: &mut D, x: f32, base: f32, w: f32, outline_only: bool)
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        let style = if outline_only { self.stroke() } else { self.fill() };
        let h = w * 0.45;
        RoundedRectangle::with_equal_corners(
            Rectangle::new(self.p(x, base - h), Size::new(self.len(w), self.len(h))),
            Size::new(self.len(h / 2.0), self.len(h / 2.0)),
        )
        .into_styled(style)
        .draw(target)
        .ok();
        Circle::with_center(self.p(x + w * 0.35, base - h), self.len(w * 0.45))
            .into_styled(style)
            .draw(target)
            .ok();
        Circle::with_center(self.p(x + w * 0.62, base - h * 1.1), self.len(w * 0.55))
            .into_styled(style)
            .draw(target)
            .ok();
    }

    fn drops<D>(&self, target: &mut D, xs: &[f32], top: f32, length: f32)
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        for &x in xs {
            self.line(target, (x, top), (x - 1.0, top + length));
        }
    }

    fn flakes<D>(&self, target: &mut D, points: &[(f32, f32)])
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        for &(x, y) in points {
            Circle::with_center(self.p(x, y), self.len(2.0))
                .into_styled(self.fill())
                .draw(target)
                .ok();
        }
    }

    fn bands<D>(&self, target: &mut D, rows: &[(f32, f32, f32)])
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        for &(x0, x1, y) in rows {
            self.line(target, (x0, y), (x1, y));
        }
    }
}

impl WeatherIcon {
    /// Short text label for fallback display.
    pub fn label(self) -> &'static str {
        match self {
            Self::Clear => "Clear",
            Self::FewClouds => "Few Clouds",
            Self::ScatteredClouds => "Scattered",
            Self::BrokenClouds => "Cloudy",
            Self::Overcast => "Overcast",
            Self::ShowerRain => "Showers",
            Self::Rain => "Rain",
            Self::Drizzle => "Drizzle",
            Self::Thunderstorm => "Storm",
            Self::Snow => "Snow",
            Self::Atmosphere => "Haze",
            Self::Mist => "Mist",
            Self::Fog => "Fog",
            Self::Unknown => "--",
        }
    }

    /// Draw the icon into a `size`x`size` box at `top_left`.
    pub fn draw<D>(self, target: &mut D, top_left: Point, size: u32)
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        let c = Canvas {
            origin: top_left,
            scale: size as f32 / GRID,
        };
        match self {
            Self::Clear => c.sun(target, 8.0, 8.0, 3.5),
            Self::FewClouds => {
                c.sun(target, 5.5, 5.5, 2.5);
                c.cloud(target, 4.0, 14.0, 11.0, false);
            }
            Self::ScatteredClouds => c.cloud(target, 2.0, 12.0, 12.0, true),
            Self::BrokenClouds => c.cloud(target, 2.0, 12.0, 12.0, false),
            Self::Overcast => {
                c.cloud(target, 5.0, 8.0, 10.0, true);
                c.cloud(target, 1.0, 14.0, 12.0, false);
            }
            Self::ShowerRain => {
                c.cloud(target, 2.0, 9.0, 12.0, false);
                c.drops(target, &[5.0, 8.0, 11.0], 11.0, 4.0);
            }
            Self::Rain => {
                c.cloud(target, 2.0, 9.0, 12.0, false);
                c.drops(target, &[4.0, 6.5, 9.0, 11.5], 11.0, 4.0);
            }
            Self::Drizzle => {
                c.cloud(target, 2.0, 9.0, 12.0, false);
                c.drops(target, &[5.5, 10.5], 11.5, 2.0);
            }
            Self::Thunderstorm => {
                c.cloud(target, 2.0, 9.0, 12.0, false);
                Triangle::new(c.p(9.0, 9.0), c.p(5.5, 13.0), c.p(8.0, 13.0))
                    .into_styled(c.fill())
                    .draw(target)
                    .ok();
                Triangle::new(c.p(8.0, 12.0), c.p(10.5, 12.0), c.p(6.5, 16.0))
                    .into_styled(c.fill())
                    .draw(target)
                    .ok();
            }
            Self::Snow => {
                c.cloud(target, 2.0, 9.0, 12.0, true);
                c.flakes(target, &[(5.0, 12.0), (8.0, 14.5), (11.0, 12.0)]);
            }
            Self::Atmosphere => c.bands(
                target,
                &[(2.0, 14.0, 5.0), (1.0, 11.0, 8.0), (4.0, 15.0, 11.0)],
            ),
            Self::Mist => c.bands(target, &[(2.0, 14.0, 6.0), (2.0, 14.0, 10.0)]),
            Self::Fog => {
                c.cloud(target, 2.0, 9.0, 12.0, true);
                c.bands(target, &[(1.0, 15.0, 11.5), (2.0, 14.0, 14.5)]);
            }
            Self::Unknown => {
                Rectangle::new(c.p(3.0, 3.0), Size::new(c.len(10.0), c.len(10.0)))
                    .into_styled(c.stroke())
                    .draw(target)
                    .ok();
            }
        }
    }

    /// Draw centred horizontally on `center_x`, top edge at `top`.
    pub fn draw_centered<D>(self, target: &mut D, center_x: i32, top: i32, size: u32)
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        self.draw(target, Point::new(center_x - size as i32 / 2, top), size);
    }
}
