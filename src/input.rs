//! Where the document text comes from.

use std::fmt;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum InputError {
    #[error("Failed to read {path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read standard input: {0}")]
    Stdin(#[source] io::Error),

    #[error("Standard input cannot be reloaded")]
    NotReloadable,
}

/// An input path, or `-` for standard input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Stdin,
    File(PathBuf),
}

impl InputSource {
    pub fn read(&self) -> Result<String, InputError> {
        match self {
            InputSource::Stdin => {
                let mut text = String::new();
                io::stdin()
                    .read_to_string(&mut text)
                    .map_err(InputError::Stdin)?;
                Ok(text)
            }
            InputSource::File(path) => fs::read_to_string(path).map_err(|source| InputError::File {
                path: path.clone(),
                source,
            }),
        }
    }

    /// Re-reads a file. Standard input is consumed by the first read.
    pub fn reload(&self) -> Result<String, InputError> {
        match self {
            InputSource::Stdin => Err(InputError::NotReloadable),
            InputSource::File(_) => self.read(),
        }
    }
}

impl FromStr for InputSource {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(if s == "-" {
            InputSource::Stdin
        } else {
            InputSource::File(PathBuf::from(s))
        })
    }
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputSource::Stdin => write!(f, "<stdin>"),
            InputSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}
