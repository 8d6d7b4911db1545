/// Errors reported by the URL engine, the percent codec, and the router
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A `%` was followed by fewer than two characters
    MissingPctHexdig,
    /// A `%` escape contained a non-hex digit
    BadPctHexdig,
    /// A literal NUL byte, or a `%00` escape where NUL is disallowed
    IllegalNull,
    /// The destination buffer is too small
    NoSpace,
    /// The input does not match the grammar
    Syntax,
    /// No route matched the request path
    Mismatch,
    /// The base URL has no scheme
    NotABase,
    /// The operation would exceed the maximum URL size
    UrlTooLarge,
    /// An argument is outside the operation's domain
    InvalidArgument,
}

impl Error {
    /// Stable numeric code for the error.
    ///
    /// Codes are part of the public contract and never reassigned.
    pub fn code(self) -> u32 {
        match self {
            Self::MissingPctHexdig => 1,
            Self::BadPctHexdig => 2,
            Self::IllegalNull => 3,
            Self::NoSpace => 4,
            Self::Syntax => 5,
            Self::Mismatch => 6,
            Self::NotABase => 7,
            Self::UrlTooLarge => 8,
            Self::InvalidArgument => 9,
        }
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            Self::MissingPctHexdig => "missing hex digit after '%'",
            Self::BadPctHexdig => "bad hex digit in percent escape",
            Self::IllegalNull => "illegal NUL byte",
            Self::NoSpace => "destination buffer too small",
            Self::Syntax => "syntax error",
            Self::Mismatch => "no route matched",
            Self::NotABase => "base URL has no scheme",
            Self::UrlTooLarge => "maximum URL size exceeded",
            Self::InvalidArgument => "invalid argument",
        };
        f.write_str(msg)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type for URL operations
pub type Result<T> = core::result::Result<T, Error>;
