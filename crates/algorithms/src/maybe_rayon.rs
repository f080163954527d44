/// Row iteration that is parallel with the `parallel` feature and
/// sequential without it.
///
/// With the feature on this is rayon's prelude. Without it, the shim below
/// maps `into_par_iter()` onto `into_iter()` so the rest of a chain
/// (`.map()`, `.flat_map()`, `.collect()`) resolves to `Iterator`.
#[cfg(feature = "parallel")]
pub use rayon::prelude::*;

#[cfg(not(feature = "parallel"))]
mod sequential {
    pub trait IntoParallelIterator {
        type Iter: Iterator<Item = Self::Item>;
        type Item;
        fn into_par_iter(self) -> Self::Iter;
    }

    impl<I: IntoIterator> IntoParallelIterator for I {
        type Iter = I::IntoIter;
        type Item = I::Item;
        fn into_par_iter(self) -> Self::Iter {
            self.into_iter()
        }
    }
}

#[cfg(not(feature = "parallel"))]
pub use sequential::*;
