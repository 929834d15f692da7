use super::transform::{Affine, Point};

const CUBIC_STEPS: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo(Point),
    LineTo(Point),
    CubicTo { c1: Point, c2: Point, to: Point },
    Close,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PathData {
    pub commands: Vec<PathCommand>,
}

impl PathData {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(&mut self, p: Point) -> &mut Self {
        self.commands.push(PathCommand::MoveTo(p));
        self
    }

    pub fn line_to(&mut self, p: Point) -> &mut Self {
        self.commands.push(PathCommand::LineTo(p));
        self
    }

    pub fn cubic_to(&mut self, c1: Point, c2: Point, to: Point) -> &mut Self {
        self.commands.push(PathCommand::CubicTo { c1, c2, to });
        self
    }

    pub fn close(&mut self) -> &mut Self {
        self.commands.push(PathCommand::Close);
        self
    }

    /// Straight-segment polygons, one per subpath, mapped through `m`.
    #[must_use]
    pub fn flatten(&self, m: Affine) -> Vec<Vec<Point>> {
        let mut polygons = Vec::new();
        let mut current: Vec<Point> = Vec::new();
        let mut cursor = Point::default();
        for command in &self.commands {
            match *command {
                PathCommand::MoveTo(p) => {
                    if current.len() > 1 {
                        polygons.push(std::mem::take(&mut current));
                    }
                    current.clear();
                    current.push(m.apply(p));
                    cursor = p;
                }
                PathCommand::LineTo(p) => {
                    current.push(m.apply(p));
                    cursor = p;
                }
                PathCommand::CubicTo { c1, c2, to } => {
                    for step in 1..=CUBIC_STEPS {
                        let t = step as f64 / CUBIC_STEPS as f64;
                        current.push(m.apply(cubic_point(cursor, c1, c2, to, t)));
                    }
                    cursor = to;
                }
                PathCommand::Close => {
                    if current.len() > 1 {
                        polygons.push(std::mem::take(&mut current));
                    }
                }
            }
        }
        if current.len() > 1 {
            polygons.push(current);
        }
        polygons
    }

    /// Points the path passes through, ignoring curve control points.
    #[must_use]
    pub fn anchors(&self) -> Vec<Point> {
        self.commands
            .iter()
            .filter_map(|command| match *command {
                PathCommand::MoveTo(p) | PathCommand::LineTo(p) => Some(p),
                PathCommand::CubicTo { to, .. } => Some(to),
                PathCommand::Close => None,
            })
            .collect()
    }
}

fn cubic_point(p0: Point, p1: Point, p2: Point, p3: Point, t: f64) -> Point {
    let mt = 1.0 - t;
    p0 * (mt * mt * mt) + p1 * (3.0 * mt * mt * t) + p2 * (3.0 * mt * t * t) + p3 * (t * t * t)
}

/// Smooth curve through `points` (Catmull-Rom converted to cubic Béziers).
///
/// `curve_factor` scales the tangents; `0.0` yields straight segments.
#[must_use]
pub fn curve_through(points: &[Point], curve_factor: f64) -> PathData {
    let mut path = PathData::new();
    let Some(first) = points.first() else {
        return path;
    };
    path.move_to(*first);
    for i in 0..points.len().saturating_sub(1) {
        let p0 = points[i.saturating_sub(1)];
        let p1 = points[i];
        let p2 = points[i + 1];
        let p3 = points.get(i + 2).copied().unwrap_or(p2);
        let c1 = p1 + (p2 - p0) * (curve_factor / 6.0);
        let c2 = p2 - (p3 - p1) * (curve_factor / 6.0);
        path.cubic_to(c1, c2, p2);
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curve_passes_through_every_point() {
        let points = [
            Point::new(0.0, 10.0),
            Point::new(5.0, 0.0),
            Point::new(10.0, 10.0),
        ];
        let path = curve_through(&points, 1.0);
        assert_eq!(path.anchors(), points.to_vec());
        assert_eq!(path.commands.len(), 3);
    }

    #[test]
    fn zero_factor_gives_straight_controls() {
        let points = [Point::new(0.0, 0.0), Point::new(6.0, 6.0)];
        let path = curve_through(&points, 0.0);
        assert_eq!(
            path.commands[1],
            PathCommand::CubicTo {
                c1: points[0],
                c2: points[1],
                to: points[1],
            }
        );
    }

    #[test]
    fn flatten_closes_subpaths() {
        let mut path = PathData::new();
        path.move_to(Point::new(0.0, 0.0))
            .line_to(Point::new(4.0, 0.0))
            .line_to(Point::new(4.0, 4.0))
            .close();
        let polygons = path.flatten(Affine::scale(2.0, 2.0));
        assert_eq!(polygons.len(), 1);
        assert_eq!(polygons[0][2], Point::new(8.0, 8.0));
    }

    #[test]
    fn empty_input_gives_empty_path() {
        assert!(curve_through(&[], 1.0).commands.is_empty());
    }
}
