use kurbo::{Affine, BezPath, Point};

/// Collects ttf-parser outline callbacks into a [`BezPath`], mapping every
/// point through `transform` as it arrives.
pub(crate) struct PathSink {
    path: BezPath,
    transform: Affine,
}

impl PathSink {
    pub(crate) fn new(transform: Affine) -> Self {
        Self { path: BezPath::new(), transform }
    }

    #[inline]
    fn map(&self, x: f32, y: f32) -> Point {
        self.transform * Point::new(x as f64, y as f64)
    }

    pub(crate) fn finish(self) -> BezPath {
        self.path
    }
}

impl ttf_parser::OutlineBuilder for PathSink {
    fn move_to(&mut self, x: f32, y: f32) {
        let p = self.map(x, y);
        self.path.move_to(p);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let p = self.map(x, y);
        self.path.line_to(p);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (p1, p) = (self.map(x1, y1), self.map(x, y));
        self.path.quad_to(p1, p);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (p1, p2, p) = (self.map(x1, y1), self.map(x2, y2), self.map(x, y));
        self.path.curve_to(p1, p2, p);
    }

    fn close(&mut self) {
        self.path.close_path();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ttf_parser::OutlineBuilder;

    #[test]
    fn test_sink_applies_transform() {
        let mut sink = PathSink::new(Affine::translate((10.0, 0.0)) * Affine::scale(2.0));
        sink.move_to(0.0, 0.0);
        sink.line_to(1.0, 0.0);
        sink.close();
        let path = sink.finish();
        let points: Vec<Point> = path.elements().iter().filter_map(|el| el.end_point()).collect();
        assert_eq!(points, vec![Point::new(10.0, 0.0), Point::new(12.0, 0.0)]);
    }
}
