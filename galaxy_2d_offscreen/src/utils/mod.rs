/// Small helpers shared by the offscreen pool

mod index_allocator;

pub(crate) use index_allocator::IndexAllocator;
