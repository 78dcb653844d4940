use std::borrow::Cow;

/// A specialized [`StorageError`] enum of this crate.
#[atelier_derive::app_error]
pub enum StorageError {
    #[error("File not found{}: {message}", fmt_context(context))]
    FileNotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Path traversal security violation{}: {message}", fmt_context(context))]
    PathTraversal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Hardware I/O failure{}: {source}", fmt_context(context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("Decompression failure{}: {source}", fmt_context(context))]
    Decompress { source: lz4_flex::block::DecompressError, context: Option<Cow<'static, str>> },
}
