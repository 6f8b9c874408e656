use bumpalo::Bump;

/// Bump arena for analysis-lifetime allocations.
///
/// Driver records, synthesized expressions (initializer references,
/// modport splices), and joined hierarchical reference paths all land
/// here. Nothing is reclaimed individually; the arena drops as a whole
/// after every structure borrowing from it is gone.
pub struct Arena {
    bump: Bump,
}

impl Arena {
    pub fn new() -> Self {
        Self { bump: Bump::new() }
    }

    /// Pre-size the first chunk. Worker arenas ingesting a batch of
    /// procedures start here instead of growing through the small
    /// initial chunks.
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            bump: Bump::with_capacity(bytes),
        }
    }

    pub fn alloc<T>(&self, val: T) -> &T {
        self.bump.alloc(val)
    }

    /// Slice of `Copy` data, used for concat operand lists.
    pub fn alloc_slice_copy<T: Copy>(&self, src: &[T]) -> &[T] {
        self.bump.alloc_slice_copy(src)
    }

    /// Slice of `Clone` data, used for hierarchical reference paths
    /// whose steps carry name selectors.
    pub fn alloc_slice_clone<T: Clone>(&self, src: &[T]) -> &[T] {
        self.bump.alloc_slice_clone(src)
    }

    /// Bytes consumed so far, padding included. A finished worker's
    /// count makes a capacity hint for the next batch of the same
    /// shape.
    pub fn allocated_bytes(&self) -> usize {
        self.bump.allocated_bytes()
    }
}
