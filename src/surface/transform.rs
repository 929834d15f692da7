use std::ops::{Add, Mul, Sub};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn lerp(self, other: Point, t: f64) -> Point {
        self + (other - self) * t
    }

    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;
    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

/// One entry of an element's `transform` attribute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransformOp {
    Translate { x: f64, y: f64 },
    /// Degrees, clockwise in screen space, about `(cx, cy)`.
    Rotate { degrees: f64, cx: f64, cy: f64 },
}

impl TransformOp {
    #[must_use]
    pub fn to_affine(self) -> Affine {
        match self {
            TransformOp::Translate { x, y } => Affine::translate(x, y),
            TransformOp::Rotate { degrees, cx, cy } => Affine::translate(cx, cy)
                .then_before(Affine::rotate(degrees))
                .then_before(Affine::translate(-cx, -cy)),
        }
    }
}

/// Ops apply like an SVG transform list: the first op is the outermost.
#[must_use]
pub fn compose(ops: &[TransformOp]) -> Affine {
    ops.iter()
        .fold(Affine::IDENTITY, |acc, op| acc.then_before(op.to_affine()))
}

/// 2D affine matrix `[a c e; b d f; 0 0 1]`, SVG layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Default for Affine {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Affine {
    pub const IDENTITY: Affine = Affine {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    #[must_use]
    pub const fn translate(x: f64, y: f64) -> Self {
        Affine {
            e: x,
            f: y,
            ..Self::IDENTITY
        }
    }

    #[must_use]
    pub const fn scale(sx: f64, sy: f64) -> Self {
        Affine {
            a: sx,
            d: sy,
            ..Self::IDENTITY
        }
    }

    #[must_use]
    pub fn rotate(degrees: f64) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Affine {
            a: cos,
            b: sin,
            c: -sin,
            d: cos,
            e: 0.0,
            f: 0.0,
        }
    }

    /// `self * inner`: `inner` is applied to points first.
    #[must_use]
    pub fn then_before(self, inner: Affine) -> Affine {
        Affine {
            a: self.a * inner.a + self.c * inner.b,
            b: self.b * inner.a + self.d * inner.b,
            c: self.a * inner.c + self.c * inner.d,
            d: self.b * inner.c + self.d * inner.d,
            e: self.a * inner.e + self.c * inner.f + self.e,
            f: self.b * inner.e + self.d * inner.f + self.f,
        }
    }

    #[must_use]
    pub fn apply(self, p: Point) -> Point {
        Point::new(
            self.a * p.x + self.c * p.y + self.e,
            self.b * p.x + self.d * p.y + self.f,
        )
    }

    #[must_use]
    pub fn determinant(self) -> f64 {
        self.a * self.d - self.b * self.c
    }

    /// `None` for singular matrices.
    #[must_use]
    pub fn inverse(self) -> Option<Affine> {
        let det = self.determinant();
        if det.abs() < f64::EPSILON {
            return None;
        }
        let inv = 1.0 / det;
        Some(Affine {
            a: self.d * inv,
            b: -self.b * inv,
            c: -self.c * inv,
            d: self.a * inv,
            e: (self.c * self.f - self.d * self.e) * inv,
            f: (self.b * self.e - self.a * self.f) * inv,
        })
    }

    /// Mean scale factor, used to turn stroke widths into device units.
    #[must_use]
    pub fn mean_scale(self) -> f64 {
        self.determinant().abs().sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: Point, b: Point) {
        assert!(
            (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9,
            "{a:?} != {b:?}"
        );
    }

    #[test]
    fn rotate_about_center_keeps_center_fixed() {
        let op = TransformOp::Rotate {
            degrees: 37.0,
            cx: 10.0,
            cy: -4.0,
        };
        assert_close(op.to_affine().apply(Point::new(10.0, -4.0)), Point::new(10.0, -4.0));
    }

    #[test]
    fn quarter_turn_maps_down_to_left() {
        let m = Affine::rotate(90.0);
        assert_close(m.apply(Point::new(0.0, 1.0)), Point::new(-1.0, 0.0));
    }

    #[test]
    fn inverse_round_trips() {
        let m = Affine::translate(5.0, 3.0)
            .then_before(Affine::scale(2.0, 0.5))
            .then_before(Affine::rotate(20.0));
        let inv = m.inverse().expect("invertible");
        let p = Point::new(12.5, -7.0);
        assert_close(inv.apply(m.apply(p)), p);
    }

    #[test]
    fn singular_has_no_inverse() {
        assert!(Affine::scale(0.0, 1.0).inverse().is_none());
    }

    #[test]
    fn compose_applies_last_op_first() {
        let ops = [
            TransformOp::Translate { x: 100.0, y: 0.0 },
            TransformOp::Rotate {
                degrees: 90.0,
                cx: 0.0,
                cy: 0.0,
            },
        ];
        assert_close(compose(&ops).apply(Point::new(1.0, 0.0)), Point::new(100.0, 1.0));
    }
}
