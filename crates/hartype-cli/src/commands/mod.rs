pub mod check;
pub mod completion;
pub mod format;
pub mod summary;
