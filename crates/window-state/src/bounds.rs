use serde::Serialize;

/// A rectangle in physical screen coordinates, edge-based like the Win32 `RECT`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Rect {
    pub(crate) left: i32,
    pub(crate) top: i32,
    pub(crate) right: i32,
    pub(crate) bottom: i32,
}

impl Rect {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn from_origin_size(origin: Point, size: Size) -> Self {
        Self::new(
            origin.x,
            origin.y,
            origin.x + size.width,
            origin.y + size.height,
        )
    }

    /// `None` when an edge would overflow.
    pub fn checked_from_origin_size(origin: Point, size: Size) -> Option<Self> {
        Some(Self::new(
            origin.x,
            origin.y,
            origin.x.checked_add(size.width)?,
            origin.y.checked_add(size.height)?,
        ))
    }

    pub fn left(&self) -> i32 {
        self.left
    }

    pub fn top(&self) -> i32 {
        self.top
    }

    pub fn right(&self) -> i32 {
        self.right
    }

    pub fn bottom(&self) -> i32 {
        self.bottom
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    pub fn origin(&self) -> Point {
        Point::new(self.left, self.top)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width(), self.height())
    }

    /// Hidden or not-yet-shown windows report zero-area rects; that's a valid state.
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    pub fn intersection_area(&self, other: &Rect) -> i64 {
        let width = self.right.min(other.right) - self.left.max(other.left);
        let height = self.bottom.min(other.bottom) - self.top.max(other.top);

        if width <= 0 || height <= 0 {
            0
        } else {
            width as i64 * height as i64
        }
    }

    /// Top-left corner that keeps a rect of `size` centred on this rect's centre.
    ///
    /// Uses floor division so odd differences always round towards negative infinity,
    /// including when the new size is larger than the old one.
    pub fn centered_origin(&self, size: Size) -> Option<Point> {
        let dx = self.width().checked_sub(size.width)?.div_euclid(2);
        let dy = self.height().checked_sub(size.height)?.div_euclid(2);
        Some(Point::new(
            self.left.checked_add(dx)?,
            self.top.checked_add(dy)?,
        ))
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({}, {}) {}x{}",
            self.left,
            self.top,
            self.width(),
            self.height()
        )
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Size {
    pub(crate) width: i32,
    pub(crate) height: i32,
}

impl Size {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Windows can't be sized to zero or less in either direction.
    pub fn is_positive(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    pub fn checked_add(self, rhs: Size) -> Option<Size> {
        Some(Size::new(
            self.width.checked_add(rhs.width)?,
            self.height.checked_add(rhs.height)?,
        ))
    }
}


impl std::fmt::Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Point {
    pub(crate) x: i32,
    pub(crate) y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn x(&self) -> i32 {
        self.x
    }

    pub fn y(&self) -> i32 {
        self.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_dimensions() {
        let rect = Rect::new(100, 100, 500, 400);

        assert_eq!(rect.width(), 400);
        assert_eq!(rect.height(), 300);
        assert_eq!(rect.origin(), Point::new(100, 100));
        assert!(!rect.is_empty());
        assert!(Rect::new(10, 10, 10, 40).is_empty());
    }

    #[test]
    fn centering_floors_odd_differences() {
        let rect = Rect::new(100, 100, 500, 400);

        // (400 - 816) / 2 = -208, (300 - 639) / 2 = -169.5 -> -170
        assert_eq!(
            rect.centered_origin(Size::new(816, 639)),
            Some(Point::new(-108, -70))
        );
        // (400 - 201) / 2 = 99.5 -> 99
        assert_eq!(
            rect.centered_origin(Size::new(201, 300)),
            Some(Point::new(199, 100))
        );
    }

    #[test]
    fn intersection_area_of_disjoint_rects_is_zero() {
        let a = Rect::new(0, 0, 100, 100);
        let b = Rect::new(100, 0, 200, 100);
        let c = Rect::new(50, 50, 150, 150);

        assert_eq!(a.intersection_area(&b), 0);
        assert_eq!(a.intersection_area(&c), 2500);
    }

    #[test]
    fn overflowing_arithmetic_is_none() {
        let rect = Rect::new(100, 100, 500, 400);

        assert_eq!(rect.centered_origin(Size::new(400, i32::MIN)), None);
        assert_eq!(
            Rect::checked_from_origin_size(Point::new(100, 0), Size::new(i32::MAX, 10)),
            None
        );
        assert_eq!(Size::new(i32::MAX, 600).checked_add(Size::new(16, 39)), None);
        assert_eq!(
            Size::new(800, 600).checked_add(Size::new(16, 39)),
            Some(Size::new(816, 639))
        );
        assert!(!Size::new(-50, 300).is_positive());
        assert!(!Size::new(300, 0).is_positive());
    }
}
