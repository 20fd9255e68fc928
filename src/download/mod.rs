//! Downloads: streaming a response body to disk under a collision-safe name.
//!
//! The file name comes from `Content-Disposition`, then the URL path,
//! then a random name. If the name is taken, `(1)`, `(2)`, ... is inserted
//! before the extension until a free name is found.

mod naming;
mod writer;

#[cfg(test)]
mod writer_tests;

pub use naming::{
    candidate_name, filename_from_headers, filename_from_url, random_filename, resolve_filename,
};
pub use writer::{prepare_directory, save};
