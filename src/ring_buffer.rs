use std::iter;

/// Global, monotonically increasing bar index. `-1` means "no bar yet".
pub type BarIndex = isize;

/// Fixed-capacity ring buffer addressed by a global [`BarIndex`].
///
/// Holds the last `window` values ever added. Appending past the window
/// silently evicts the oldest value; only indices inside
/// `[begin_index, end_index]` are addressable. Backing storage is sized once
/// to the next power of two so that index-to-slot mapping is a bitmask.
///
/// The same buffer stores bars in a [`BarSeries`] and values in every
/// indicator cache.
///
/// # Panics
///
/// Reading or writing an index outside the retained window is a caller bug
/// and panics.
///
/// [`BarSeries`]: crate::BarSeries
#[derive(Clone, Debug)]
pub struct BoundedIndexedBuffer<T> {
    slots: Vec<Option<T>>,
    mask: usize,
    window: usize,
    write_index: usize,
    count: usize,
    begin_index: BarIndex,
    end_index: BarIndex,
}

/// Smallest power of two greater than or equal to `requested`.
///
/// # Panics
///
/// Panics if `requested` is zero.
#[inline]
#[must_use]
pub fn capacity_for(requested: usize) -> usize {
    assert!(requested > 0, "window size must be positive");
    requested.next_power_of_two()
}

impl<T> BoundedIndexedBuffer<T> {
    /// Creates an empty buffer retaining at most `window` values.
    ///
    /// # Panics
    ///
    /// Panics if `window` is zero.
    #[must_use]
    pub fn new(window: usize) -> Self {
        let capacity = capacity_for(window);

        Self {
            slots: iter::repeat_with(|| None).take(capacity).collect(),
            mask: capacity - 1,
            window,
            write_index: 0,
            count: 0,
            begin_index: -1,
            end_index: -1,
        }
    }

    /// Appends `value` at `end_index + 1`, evicting the oldest value when the
    /// window is full.
    #[inline]
    pub fn add(&mut self, value: T) {
        self.slots[self.write_index & self.mask] = Some(value);
        self.write_index += 1;
        if self.count < self.window {
            self.count += 1;
        }
        self.end_index += 1;
        self.begin_index = self.end_index + 1 - self.count_as_index();
    }

    /// # Panics
    ///
    /// Panics if `index` is outside `[begin_index, end_index]`.
    #[inline]
    #[must_use]
    pub fn get(&self, index: BarIndex) -> &T {
        let slot = self.slot(index);
        self.slots[slot]
            .as_ref()
            .expect("BoundedIndexedBuffer invariant violation: retained slot is empty")
    }

    /// # Panics
    ///
    /// Panics if `index` is outside `[begin_index, end_index]`.
    #[inline]
    pub fn get_mut(&mut self, index: BarIndex) -> &mut T {
        let slot = self.slot(index);
        self.slots[slot]
            .as_mut()
            .expect("BoundedIndexedBuffer invariant violation: retained slot is empty")
    }

    /// Overwrites the value at `index` in place.
    ///
    /// # Panics
    ///
    /// Panics if `index` is outside `[begin_index, end_index]`.
    #[inline]
    pub fn set(&mut self, index: BarIndex, value: T) {
        let slot = self.slot(index);
        self.slots[slot] = Some(value);
    }

    /// Drops every retained value and repositions the buffer so that the next
    /// [`add`](Self::add) lands at `next_index`.
    ///
    /// # Panics
    ///
    /// Panics if `next_index` is negative.
    pub fn restart_at(&mut self, next_index: BarIndex) {
        self.write_index = usize::try_from(next_index).expect("restart index must not be negative");
        self.count = 0;
        self.end_index = next_index - 1;
        self.begin_index = next_index;
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, index: BarIndex) -> bool {
        self.count > 0 && index >= self.begin_index && index <= self.end_index
    }

    /// Most recently added value.
    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        (self.count > 0).then(|| self.get(self.end_index))
    }

    /// Retained values, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        (self.begin_index..=self.end_index)
            .take(self.count)
            .map(|index| self.get(index))
    }

    /// First retained index, `-1` before the first add.
    #[inline]
    #[must_use]
    pub fn begin_index(&self) -> BarIndex {
        self.begin_index
    }

    /// Last retained index, `-1` before the first add.
    #[inline]
    #[must_use]
    pub fn end_index(&self) -> BarIndex {
        self.end_index
    }

    /// Number of retained values.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Maximum number of retained values.
    #[inline]
    #[must_use]
    pub fn window(&self) -> usize {
        self.window
    }

    /// Size of the backing storage: `window` rounded up to a power of two.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    fn slot(&self, index: BarIndex) -> usize {
        assert!(
            self.contains(index),
            "index {index} outside retained window [{}, {}]",
            self.begin_index,
            self.end_index,
        );

        #[allow(clippy::cast_sign_loss)]
        let index = index as usize;
        index & self.mask
    }

    #[inline]
    #[allow(clippy::cast_possible_wrap)]
    fn count_as_index(&self) -> BarIndex {
        self.count as BarIndex
    }
}
