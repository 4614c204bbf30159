use core::fmt::Write;
use serde::{Deserialize, Serialize};

use crate::ViewConfig;

/// Mean Earth radius in meters used for surface distances.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Below this absolute signed area a ring is treated as degenerate.
const DEGENERATE_AREA_EPSILON: f64 = 1e-12;

/// Point in source coordinate units; for geographic data `x` is longitude and `y` latitude.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub const fn lon(self) -> f64 {
        self.x
    }

    pub const fn lat(self) -> f64 {
        self.y
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn union(self, other: Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Grows each axis by `ratio` of its extent on both sides.
    pub fn padded(self, ratio: f64) -> Self {
        let pad_x = self.width() * ratio;
        let pad_y = self.height() * ratio;
        Self {
            min_x: self.min_x - pad_x,
            min_y: self.min_y - pad_y,
            max_x: self.max_x + pad_x,
            max_y: self.max_y + pad_y,
        }
    }
}

/// Bounding box of a ring, `None` when the ring has no points.
pub fn bounding_box(ring: &[Point]) -> Option<BoundingBox> {
    let (first, rest) = ring.split_first()?;
    let init = BoundingBox {
        min_x: first.x,
        min_y: first.y,
        max_x: first.x,
        max_y: first.y,
    };
    Some(rest.iter().fold(init, |bbox, p| BoundingBox {
        min_x: bbox.min_x.min(p.x),
        min_y: bbox.min_y.min(p.y),
        max_x: bbox.max_x.max(p.x),
        max_y: bbox.max_y.max(p.y),
    }))
}

/// Signed shoelace area of a ring; closed and open rings give the same result.
pub fn signed_area(ring: &[Point]) -> f64 {
    let n = ring.len();
    if n < 3 {
        return 0.0;
    }
    let mut area = 0.0;
    for i in 0..n {
        let (a, b) = (ring[i], ring[(i + 1) % n]);
        area += a.x * b.y - b.x * a.y;
    }
    area * 0.5
}

/// Area-weighted centroid of a ring.
///
/// Zero-area rings fall back to the arithmetic mean of their vertices.
/// Returns `None` only for an empty ring.
pub fn centroid(ring: &[Point]) -> Option<Point> {
    if ring.is_empty() {
        return None;
    }

    let n = ring.len();
    let mut area = 0.0;
    let mut cx = 0.0;
    let mut cy = 0.0;
    for i in 0..n {
        let (a, b) = (ring[i], ring[(i + 1) % n]);
        let cross = a.x * b.y - b.x * a.y;
        area += cross;
        cx += (a.x + b.x) * cross;
        cy += (a.y + b.y) * cross;
    }
    area *= 0.5;

    if area.abs() < DEGENERATE_AREA_EPSILON {
        log::warn!("degenerate ring with {n} vertices, using vertex mean as centroid");
        let (sx, sy) = ring
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        let len = n as f64;
        return Some(Point::new(sx / len, sy / len));
    }

    Some(Point::new(cx / (6.0 * area), cy / (6.0 * area)))
}

/// Haversine surface distance in meters between two lon/lat points in degrees.
pub fn great_circle_distance(a: Point, b: Point) -> f64 {
    let d_lat = (b.lat() - a.lat()).to_radians();
    let d_lon = (b.lon() - a.lon()).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat().to_radians().cos() * b.lat().to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Linear map from source coordinates into a fixed-width output frame with
/// the y axis flipped, so that north stays up on screen.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    min_x: f64,
    max_y: f64,
    scale_x: f64,
    scale_y: f64,
    width: f64,
    height: f64,
}

impl ViewTransform {
    /// Fits the padded union of `bounds` into a frame `config.width` wide.
    pub fn fit(bounds: BoundingBox, config: &ViewConfig) -> Self {
        // a zero extent would make the frame or the scale non-finite
        let bounds = match (bounds.width() > 0.0, bounds.height() > 0.0) {
            (true, true) => bounds,
            (true, false) => expand_y(bounds, bounds.width()),
            (false, true) => expand_x(bounds, bounds.height()),
            (false, false) => expand_y(expand_x(bounds, 1.0), 1.0),
        };
        let bounds = bounds.padded(config.padding);

        let width = config.width;
        let height = width * bounds.height() / bounds.width();
        Self {
            min_x: bounds.min_x,
            max_y: bounds.max_y,
            scale_x: width / bounds.width(),
            scale_y: height / bounds.height(),
            width,
            height,
        }
    }

    /// Fits the union bounding box of all rings. `None` if no ring has points.
    pub fn fit_rings<'a>(
        rings: impl IntoIterator<Item = &'a [Point]>,
        config: &ViewConfig,
    ) -> Option<Self> {
        let bounds = rings
            .into_iter()
            .filter_map(bounding_box)
            .reduce(BoundingBox::union)?;
        Some(Self::fit(bounds, config))
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn apply(&self, p: Point) -> Point {
        Point::new(
            (p.x - self.min_x) * self.scale_x,
            (self.max_y - p.y) * self.scale_y,
        )
    }

    /// SVG-style path data (`M x y L x y ... Z`) for a ring.
    pub fn path_data(&self, ring: &[Point]) -> String {
        let mut path = String::with_capacity(ring.len() * 24);
        for (i, &p) in ring.iter().enumerate() {
            let p = self.apply(p);
            let cmd = if i == 0 { 'M' } else { 'L' };
            let _ = write!(path, "{cmd}{} {} ", p.x, p.y);
        }
        path.push('Z');
        path
    }
}

fn expand_x(bounds: BoundingBox, extent: f64) -> BoundingBox {
    BoundingBox {
        min_x: bounds.min_x - extent / 2.0,
        max_x: bounds.max_x + extent / 2.0,
        ..bounds
    }
}

fn expand_y(bounds: BoundingBox, extent: f64) -> BoundingBox {
    BoundingBox {
        min_y: bounds.min_y - extent / 2.0,
        max_y: bounds.max_y + extent / 2.0,
        ..bounds
    }
}
