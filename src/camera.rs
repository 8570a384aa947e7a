use nalgebra::{Matrix3, Matrix4, Point2, Point3};

/// Image dimensions in pixels. The valid pixel domain is `[0,width) x [0,height)`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub fn new(width: u32, height: u32) -> ImageSize {
        ImageSize { width, height }
    }

    pub fn contains(&self, p: &Point2<f64>) -> bool {
        p.x >= 0.0 && p.y >= 0.0 && p.x < self.width as f64 && p.y < self.height as f64
    }
}

/// Pinhole intrinsics in pixels.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Intrinsics {
    pub fx: f64,
    pub fy: f64,
    pub cx: f64,
    pub cy: f64,
}

impl Intrinsics {
    pub fn new(fx: f64, fy: f64, cx: f64, cy: f64) -> Intrinsics {
        Intrinsics { fx, fy, cx, cy }
    }

    /// Reads fx, fy, cx, cy from a 3x3 intrinsic matrix. Skew is ignored.
    pub fn from_matrix(k: &Matrix3<f64>) -> Intrinsics {
        Intrinsics {
            fx: k[(0, 0)],
            fy: k[(1, 1)],
            cx: k[(0, 2)],
            cy: k[(1, 2)],
        }
    }

    pub fn intrinsic_matrix(&self) -> Matrix3<f64> {
        Matrix3::new(self.fx, 0.0, self.cx, 0.0, self.fy, self.cy, 0.0, 0.0, 1.0)
    }

    pub fn principal_point(&self) -> Point2<f64> {
        Point2::new(self.cx, self.cy)
    }

    /// Clip-space matrix for an image of `size`.
    ///
    /// For a local point `p` the result has `w = p.z` and
    /// `(x/w * 0.5 + 0.5) * width == fx * p.x / p.z + cx` (same for y),
    /// so the usual NDC-to-viewport mapping lands on the pinhole pixel.
    #[rustfmt::skip]
    pub fn clip_matrix(&self, size: ImageSize) -> Matrix4<f64> {
        let w = size.width as f64;
        let h = size.height as f64;
        Matrix4::new(
            2.0 * self.fx / w, 0.0, 2.0 * self.cx / w - 1.0, 0.0,
            0.0, 2.0 * self.fy / h, 2.0 * self.cy / h - 1.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
        )
    }

    // coordinate transform functions
    pub fn camera_to_pixel(&self, p_c: &Point3<f64>) -> Option<Point2<f64>> {
        if p_c.z == 0.0 {
            return None;
        }
        Some(Point2::new(
            self.fx * p_c.x / p_c.z + self.cx,
            self.fy * p_c.y / p_c.z + self.cy,
        ))
    }

    pub fn pixel_to_camera(&self, p_p: &Point2<f64>, depth: f64) -> Point3<f64> {
        Point3::new(
            (p_p.x - self.cx) * depth / self.fx,
            (p_p.y - self.cy) * depth / self.fy,
            depth,
        )
    }

    pub fn normalized_to_pixel(&self, n: &Point2<f64>) -> Point2<f64> {
        Point2::new(self.fx * n.x + self.cx, self.fy * n.y + self.cy)
    }
}
