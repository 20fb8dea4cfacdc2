//! Generic helpers shared by the metadata entity model.

mod lazylist;

pub use lazylist::{ItemReader, LazyList};
