use std::cmp::Ordering;

/// A strict total order over `T`.
/// Two values are considered the same set element when `compare` returns `Equal`
pub trait Comparator<T> {
    fn compare(&self, a: &T, b: &T) -> Ordering;
}

/// The order given by `T: Ord`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Natural;

impl<T: Ord> Comparator<T> for Natural {
    fn compare(&self, a: &T, b: &T) -> Ordering {
        a.cmp(b)
    }
}

impl<T, F> Comparator<T> for F
where
    F: Fn(&T, &T) -> Ordering,
{
    fn compare(&self, a: &T, b: &T) -> Ordering {
        self(a, b)
    }
}
