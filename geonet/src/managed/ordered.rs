use core::ops::{Deref, Index};
use core::slice::SliceIndex;

use super::Slice;

/// Maintains an ordered slice.
///
/// The slice is split into an ordered, initialized prefix and a tail of free slots. Lookup is a
/// binary search on the prefix, insertion and removal rotate the elements in between.
#[derive(Debug)]
pub struct Ordered<'a, T> {
    inner: Slice<'a, T>,
    start: usize,
}

impl<'a, T> Ordered<'a, T> {
    /// Create an ordered container that is logically empty.
    pub fn new(slice: Slice<'a, T>) -> Self {
        Ordered {
            inner: slice,
            start: 0,
        }
    }

    /// Get a mutable reference to the element that would be pushed next.
    pub fn init(&mut self) -> Option<&mut T> {
        self.inner.as_mut_slice().get_mut(self.start)
    }

    /// Insert the next element.
    ///
    /// Returns the index at which the element was insert and `None` if there was no element to
    /// insert.
    pub fn push(&mut self) -> Option<usize>
        where T: Ord,
    {
        let next = self.inner.as_slice()
            .get(self.start)?;
        let idx = self.ordered_slice()
            .binary_search(next)
            .unwrap_or_else(|x| x);
        self.start += 1;
        self.inner[idx..self.start]
            .rotate_right(1);
        Some(idx)
    }

    /// Remove the element at the specified index.
    ///
    /// Returns `Some(())` if successful and `None` if the index was not valid.
    pub fn pop(&mut self, idx: usize) -> Option<()> {
        // Find out how many we need to move and check validity.
        let _ = self.start
            .checked_sub(idx)?
            .checked_sub(1)?;
        self.inner[idx..self.start]
            .rotate_left(1);
        self.start -= 1;
        Some(())
    }

    /// Remove all elements for which the predicate returns `false`.
    ///
    /// Order of the remaining elements is preserved.
    pub fn retain(&mut self, mut keep: impl FnMut(&T) -> bool) {
        let mut idx = 0;
        while idx < self.start {
            if keep(&self.inner[idx]) {
                idx += 1;
            } else {
                let _ = self.pop(idx);
            }
        }
    }

    /// The number of ordered elements.
    pub fn len(&self) -> usize {
        self.start
    }

    /// The number of elements that can be held at most.
    pub fn capacity(&self) -> usize {
        self.inner.len()
    }

    /// The ordered region in the slice.
    pub fn ordered_slice(&self) -> &[T] {
        &self.inner.as_slice()[..self.start]
    }

    /// Retrieve part of the ordered range if possible.
    ///
    /// This is a non-panicking variant of index access.
    pub fn get<I>(&self, idx: I) -> Option<&I::Output>
        where I: SliceIndex<[T]>
    {
        self.ordered_slice().get(idx)
    }

    /// Mutably access an element in the ordered range.
    ///
    /// The caller must not modify the element in a way that changes its ordering relative to its
    /// neighbours.
    pub fn get_mut(&mut self, idx: usize) -> Option<&mut T> {
        self.inner.as_mut_slice()[..self.start].get_mut(idx)
    }

    /// Mutably iterate the ordered range, with the same restriction as `get_mut`.
    pub fn iter_mut(&mut self) -> core::slice::IterMut<'_, T> {
        self.inner.as_mut_slice()[..self.start].iter_mut()
    }
}

impl<'a, C, T> From<C> for Ordered<'a, T>
    where Slice<'a, T>: From<C>
{
    fn from(collection: C) -> Self {
        Self::new(collection.into())
    }
}

impl<T, I: SliceIndex<[T]>> Index<I> for Ordered<'_, T> {
    type Output = I::Output;

    fn index(&self, idx: I) -> &I::Output {
        self.ordered_slice().index(idx)
    }
}

impl<T> Deref for Ordered<'_, T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.ordered_slice()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_sorted() {
        let mut storage = [0u32; 4];
        let mut ordered = Ordered::new(Slice::Borrowed(&mut storage[..]));

        for &value in &[7, 3, 5] {
            *ordered.init().unwrap() = value;
            ordered.push().unwrap();
        }

        assert_eq!(ordered.ordered_slice(), &[3, 5, 7]);
        assert_eq!(ordered.len(), 3);
        assert_eq!(ordered.capacity(), 4);
    }

    #[test]
    fn pop_and_retain() {
        let mut ordered = Ordered::new(Slice::Many(vec![0u32; 5]));
        for value in 1..=5 {
            *ordered.init().unwrap() = value;
            ordered.push().unwrap();
        }
        assert!(ordered.init().is_none());

        ordered.pop(1).unwrap();
        assert_eq!(ordered.ordered_slice(), &[1, 3, 4, 5]);
        assert!(ordered.pop(4).is_none());

        ordered.retain(|&value| value % 2 == 1);
        assert_eq!(ordered.ordered_slice(), &[1, 3, 5]);
    }
}
