use core::fmt;

/// The error type for parsing GeoNetworking frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Error {
    /// An incoming packet could not be parsed because it was shorter than assumed.
    ///
    /// The buffer may be shorter than the fixed headers, or the payload length of the common
    /// header may point past the end of the received data.
    Truncated,

    /// An incoming packet could not be recognized and was dropped.
    ///
    /// E.g. an Ethernet frame with an EtherType other than GeoNetworking, or an extended header
    /// type that has no entry in the header registry.
    Unrecognized,

    /// An incoming packet was recognized but was self-contradictory.
    ///
    /// Example: a remaining hop limit larger than the maximum hop limit of the same packet.
    Malformed,

    /// Parsing depends on a feature that is not implemented.
    ///
    /// Similar to `Unrecognized` but in contrast we know that our implementation is incomplete.
    /// A secured packet is the main example, its payload can not be interpreted without the
    /// security layer.
    Unsupported,
}

/// The result type for parsing of wire structures.
pub type Result<T> = core::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Truncated    => write!(f, "truncated packet"),
            Error::Unrecognized => write!(f, "unrecognized packet"),
            Error::Malformed    => write!(f, "malformed packet"),
            Error::Unsupported  => write!(f, "unsupported header"),
        }
    }
}

impl std::error::Error for Error {}
