use core::fmt::{self, Debug, Display, Formatter};

#[derive(Debug)]
pub struct AppError<E> {
    pub message: &'static str,
    pub error: E,
}

impl<E> Display for AppError<E>
where
    E: Debug,
{
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{} {:?}", self.message, self.error)
    }
}

/// Failures reported by the persistence boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    /// No record with that tag has been written.
    NotFound,
    /// A record with that tag exists but failed its integrity checks.
    Corrupt,
    /// The payload does not fit in one flash page.
    RecordTooLarge { size: usize, max: usize },
    /// The caller's buffer is smaller than the stored payload.
    BufferTooSmall { size: usize, needed: usize },
    /// No flash page is reserved for the tag.
    UnknownTag,
    /// The underlying flash device reported an error.
    Device(&'static str),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            StoreError::NotFound => write!(f, "record not found"),
            StoreError::Corrupt => write!(f, "record corrupt"),
            StoreError::RecordTooLarge { size, max } => {
                write!(f, "record of {} bytes exceeds the {} byte page", size, max)
            }
            StoreError::BufferTooSmall { size, needed } => {
                write!(f, "buffer of {} bytes cannot hold {} bytes", size, needed)
            }
            StoreError::UnknownTag => write!(f, "no page reserved for record tag"),
            StoreError::Device(message) => write!(f, "flash device error: {}", message),
        }
    }
}

/// Failures decoding a persisted record payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordError {
    WrongLength { expected: usize, found: usize },
    InvalidValue(&'static str),
}

impl Display for RecordError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            RecordError::WrongLength { expected, found } => {
                write!(f, "expected {} bytes, found {}", expected, found)
            }
            RecordError::InvalidValue(field) => write!(f, "invalid value for {}", field),
        }
    }
}

/// Startup failures. All of them are fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitError {
    OutputInit(&'static str),
}

impl Display for InitError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            InitError::OutputInit(message) => write!(f, "output init failed: {}", message),
        }
    }
}
