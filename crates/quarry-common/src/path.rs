//! Resource path building.
//!
//! Paths are plain slash-separated strings. Joining never inspects what a
//! segment means; it only guarantees that the rendered path has no runs of
//! repeated separators.

use std::fmt;

/// Something that can be appended to a resource path.
///
/// Implemented for strings and for the integer types commonly used as
/// document identifiers, which render as their decimal representation.
pub trait PathSegment {
    fn to_segment(&self) -> String;
}

impl PathSegment for str {
    fn to_segment(&self) -> String {
        self.to_string()
    }
}

impl PathSegment for String {
    fn to_segment(&self) -> String {
        self.clone()
    }
}

impl PathSegment for ResourcePath {
    fn to_segment(&self) -> String {
        self.0.clone()
    }
}

impl<T: PathSegment + ?Sized> PathSegment for &T {
    fn to_segment(&self) -> String {
        (**self).to_segment()
    }
}

macro_rules! integer_segments {
    ($($ty:ty),*) => {
        $(
            impl PathSegment for $ty {
                fn to_segment(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

integer_segments!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize);

/// Joins `segment` onto `base`.
///
/// An empty `base` yields `segment`, an empty `segment` yields `base`, and
/// otherwise the two are joined with `/`. Runs of consecutive slashes in the
/// result are collapsed to one.
///
/// # Example
///
/// ```
/// use quarry_common::join;
///
/// assert_eq!(join("", "idx"), "idx");
/// assert_eq!(join("idx/", "/type"), "idx/type");
/// assert_eq!(join("idx", ""), "idx");
/// ```
pub fn join(base: &str, segment: &str) -> String {
    if segment.is_empty() {
        return collapse_separators(base);
    }
    if base.is_empty() {
        return collapse_separators(segment);
    }
    collapse_separators(&format!("{}/{}", base, segment))
}

fn collapse_separators(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut previous_slash = false;
    for ch in path.chars() {
        if ch == '/' {
            if previous_slash {
                continue;
            }
            previous_slash = true;
        } else {
            previous_slash = false;
        }
        out.push(ch);
    }
    out
}

/// A rendered, normalized resource path such as `idx/type/123/_update`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ResourcePath(String);

impl ResourcePath {
    /// Creates a path from an already-rendered string, normalizing separators.
    pub fn new(path: impl AsRef<str>) -> Self {
        ResourcePath(collapse_separators(path.as_ref()))
    }

    /// The empty (root) path.
    pub fn root() -> Self {
        ResourcePath(String::new())
    }

    /// Returns a new path with `segment` appended.
    pub fn join(&self, segment: impl PathSegment) -> Self {
        ResourcePath(join(&self.0, &segment.to_segment()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Non-empty segments of the path, in order.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }
}

impl fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ResourcePath {
    fn from(path: &str) -> Self {
        ResourcePath::new(path)
    }
}

impl From<String> for ResourcePath {
    fn from(path: String) -> Self {
        ResourcePath::new(path)
    }
}
