//! Internal helpers shared by the scanner and the copier.

pub(crate) mod path;
