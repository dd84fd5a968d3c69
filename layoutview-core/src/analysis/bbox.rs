use std::fmt;

use glam::IVec2;
use imageproc::rect::Rect;
use serde::{Deserialize, Serialize};

/// A 2D axis-aligned bounding box in source-image pixel coordinates.
///
/// Image coordinates have the origin at the top-left corner with Y increasing
/// downward, so `min` is the top-left corner and `max` the bottom-right one.
/// On the wire a bbox is the four-element array `[x1, y1, x2, y2]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[i32; 4]", into = "[i32; 4]")]
pub struct Bbox {
    /// The top-left corner `(x1, y1)`.
    pub min: IVec2,
    /// The bottom-right corner `(x2, y2)`.
    pub max: IVec2,
}

impl Bbox {
    /// Creates a new bounding box from its top-left and bottom-right corners.
    ///
    /// Corners are stored as given; use [`Bbox::is_ordered`] to check them.
    ///
    /// # Example
    /// ```
    /// use glam::IVec2;
    /// use layoutview_core::analysis::bbox::Bbox;
    /// let bbox = Bbox::new(IVec2::new(0, 0), IVec2::new(10, 5));
    /// assert_eq!(bbox.width(), 10);
    /// ```
    pub fn new(min: IVec2, max: IVec2) -> Self {
        Self { min, max }
    }

    /// Creates a bounding box from `x1, y1, x2, y2`.
    pub fn from_coords(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self::new(IVec2::new(x1, y1), IVec2::new(x2, y2))
    }

    /// Returns the coordinates in `[x1, y1, x2, y2]` order.
    pub fn coords(&self) -> [i32; 4] {
        [self.min.x, self.min.y, self.max.x, self.max.y]
    }

    /// Horizontal extent `x2 - x1`. Negative for an inverted box.
    ///
    /// Computed in `i64`, so any pair of `i32` coordinates is representable.
    pub fn width(&self) -> i64 {
        i64::from(self.max.x) - i64::from(self.min.x)
    }

    /// Vertical extent `y2 - y1`. Negative for an inverted box.
    pub fn height(&self) -> i64 {
        i64::from(self.max.y) - i64::from(self.min.y)
    }

    /// Whether `x1 <= x2` and `y1 <= y2` hold.
    pub fn is_ordered(&self) -> bool {
        self.min.x <= self.max.x && self.min.y <= self.max.y
    }

    /// Returns a copy with each axis swapped as needed so that the box is ordered.
    ///
    /// # Example
    /// ```
    /// use layoutview_core::analysis::bbox::Bbox;
    /// let inverted = Bbox::from_coords(50, 40, 10, 20);
    /// assert_eq!(inverted.normalized(), Bbox::from_coords(10, 20, 50, 40));
    /// ```
    pub fn normalized(&self) -> Self {
        Self {
            min: self.min.min(self.max),
            max: self.min.max(self.max),
        }
    }

    /// Calculates the area of intersection between this bounding box and another.
    ///
    /// Boxes that only touch along an edge have no intersection.
    ///
    /// # Example
    /// ```
    /// use layoutview_core::analysis::bbox::Bbox;
    /// let bbox1 = Bbox::from_coords(0, 0, 4, 4);
    /// let bbox2 = Bbox::from_coords(2, 2, 6, 6);
    /// assert_eq!(bbox1.intersection(&bbox2), 4); // 2x2 intersection area
    /// ```
    pub fn intersection(&self, other: &Self) -> i64 {
        let overlap = Self::new(self.min.max(other.min), self.max.min(other.max));

        if overlap.width() > 0 && overlap.height() > 0 {
            overlap.width() * overlap.height()
        } else {
            0
        }
    }

    /// Moves both corners inside `bounds`.
    ///
    /// Edges already inside `bounds` keep their position; edges beyond it are
    /// pulled onto it. `bounds` must be ordered.
    ///
    /// # Example
    /// ```
    /// use layoutview_core::analysis::bbox::Bbox;
    /// let page = Bbox::from_coords(0, 0, 100, 50);
    /// let wide = Bbox::from_coords(-20, 10, 400, 30);
    /// assert_eq!(wide.clamp(&page), Bbox::from_coords(0, 10, 100, 30));
    /// ```
    pub fn clamp(&self, bounds: &Self) -> Self {
        Self {
            min: self.min.clamp(bounds.min, bounds.max),
            max: self.max.clamp(bounds.min, bounds.max),
        }
    }

    /// Converts the box into an `imageproc` rectangle.
    ///
    /// `imageproc` rejects empty rectangles, so a zero extent is widened to one
    /// pixel. The box must be ordered.
    pub fn to_rect(&self) -> Rect {
        let extent = |len: i64| u32::try_from(len.max(1)).unwrap_or(u32::MAX);
        Rect::at(self.min.x, self.min.y).of_size(extent(self.width()), extent(self.height()))
    }
}

impl From<[i32; 4]> for Bbox {
    fn from([x1, y1, x2, y2]: [i32; 4]) -> Self {
        Self::from_coords(x1, y1, x2, y2)
    }
}

impl From<Bbox> for [i32; 4] {
    fn from(bbox: Bbox) -> Self {
        bbox.coords()
    }
}

impl fmt::Display for Bbox {
    /// Formats as `x1, y1, x2, y2`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [x1, y1, x2, y2] = self.coords();
        write!(f, "{x1}, {y1}, {x2}, {y2}")
    }
}
