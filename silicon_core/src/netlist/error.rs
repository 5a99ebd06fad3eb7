use std::{
    convert::From,
    error::Error,
    fmt::{Debug, Display, Formatter, Result as fmtResult},
    io::Error as ioError,
};

pub enum NetlistError {
    FileError(ioError),
    EmptyNetlist,
}

impl NetlistError {
    fn get_message(&self) -> String {
        match self {
            Self::FileError(err) => format!("FileError: {}", err),
            Self::EmptyNetlist => {
                "The definition files did not contain any transistors".to_owned()
            }
        }
    }
}

impl Error for NetlistError {}

impl Display for NetlistError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmtResult {
        write!(f, "{}", self.get_message())
    }
}

impl Debug for NetlistError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmtResult {
        write!(f, "{}", self.get_message())
    }
}

impl From<ioError> for NetlistError {
    fn from(from: ioError) -> Self {
        Self::FileError(from)
    }
}
