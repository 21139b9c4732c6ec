//! Geometric primitives: bounding boxes and transformation matrices.

/// Bounding box with top-left origin coordinate system.
///
/// Coordinates follow the page-space convention used for reporting spans:
/// - `x0`: left edge
/// - `top`: top edge (distance from top of page)
/// - `x1`: right edge
/// - `bottom`: bottom edge (distance from top of page)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BBox {
    pub x0: f64,
    pub top: f64,
    pub x1: f64,
    pub bottom: f64,
}

impl BBox {
    pub fn new(x0: f64, top: f64, x1: f64, bottom: f64) -> Self {
        Self {
            x0,
            top,
            x1,
            bottom,
        }
    }

    /// Width of the bounding box.
    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    /// Height of the bounding box.
    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// Compute the union of two bounding boxes.
    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            x0: self.x0.min(other.x0),
            top: self.top.min(other.top),
            x1: self.x1.max(other.x1),
            bottom: self.bottom.max(other.bottom),
        }
    }

    /// Smallest box containing all the given points, already in top-left space.
    pub fn from_points(points: &[(f64, f64)]) -> Option<BBox> {
        let (first, rest) = points.split_first()?;
        let mut bbox = BBox::new(first.0, first.1, first.0, first.1);
        for &(x, y) in rest {
            bbox.x0 = bbox.x0.min(x);
            bbox.x1 = bbox.x1.max(x);
            bbox.top = bbox.top.min(y);
            bbox.bottom = bbox.bottom.max(y);
        }
        Some(bbox)
    }
}

/// A PDF affine transformation matrix `[a b c d e f]`.
///
/// Represents the matrix
/// ```text
/// | a b 0 |
/// | c d 0 |
/// | e f 1 |
/// ```
/// Points are row vectors: `[x y 1] × M`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ctm {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl Default for Ctm {
    fn default() -> Self {
        Self::identity()
    }
}

impl Ctm {
    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// The identity matrix.
    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    /// Build from the six operands of a `cm` or `Tm` operator.
    pub fn from_array(m: [f64; 6]) -> Self {
        Self::new(m[0], m[1], m[2], m[3], m[4], m[5])
    }

    /// The matrix as `[a, b, c, d, e, f]`.
    pub fn to_array(&self) -> [f64; 6] {
        [self.a, self.b, self.c, self.d, self.e, self.f]
    }

    /// Matrix product `self × other`.
    ///
    /// With row-vector points this applies `self` first, then `other`.
    pub fn concat(&self, other: &Ctm) -> Ctm {
        Ctm {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    /// Transform a point.
    pub fn transform_point(&self, x: f64, y: f64) -> (f64, f64) {
        (
            x * self.a + y * self.c + self.e,
            x * self.b + y * self.d + self.f,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-10,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_bbox_dimensions() {
        let bbox = BBox::new(10.0, 20.0, 50.0, 60.0);
        assert_eq!(bbox.width(), 40.0);
        assert_eq!(bbox.height(), 40.0);
    }

    #[test]
    fn test_bbox_union() {
        let a = BBox::new(10.0, 20.0, 30.0, 40.0);
        let b = BBox::new(5.0, 25.0, 35.0, 45.0);
        let u = a.union(&b);
        assert_eq!(u, BBox::new(5.0, 20.0, 35.0, 45.0));
    }

    #[test]
    fn test_bbox_from_points() {
        let bbox = BBox::from_points(&[(3.0, 9.0), (1.0, 4.0), (7.0, 5.0)]).unwrap();
        assert_eq!(bbox, BBox::new(1.0, 4.0, 7.0, 9.0));
        assert!(BBox::from_points(&[]).is_none());
    }

    #[test]
    fn test_identity_transform() {
        let m = Ctm::identity();
        assert_eq!(m.transform_point(12.5, -3.0), (12.5, -3.0));
    }

    #[test]
    fn test_translation_then_scale() {
        let translate = Ctm::new(1.0, 0.0, 0.0, 1.0, 10.0, 20.0);
        let scale = Ctm::new(2.0, 0.0, 0.0, 2.0, 0.0, 0.0);
        // translate first, then scale
        let m = translate.concat(&scale);
        let (x, y) = m.transform_point(1.0, 1.0);
        assert_approx(x, 22.0);
        assert_approx(y, 42.0);
    }

    #[test]
    fn test_concat_with_identity_is_noop() {
        let m = Ctm::new(2.0, 0.5, -0.5, 3.0, 7.0, 11.0);
        assert_eq!(m.concat(&Ctm::identity()), m);
        assert_eq!(Ctm::identity().concat(&m), m);
    }

    #[test]
    fn test_array_roundtrip() {
        let m = Ctm::from_array([1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(m.to_array(), [1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }
}
