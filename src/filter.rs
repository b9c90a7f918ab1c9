use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One entry of the "Save as type" / "Files of type" list: a display name and
/// a `;` separated list of wildcard patterns.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFilter {
    pub name: String,
    pub spec: String,
}

impl FileFilter {
    pub fn new<N: Into<String>, S: Into<String>>(name: N, spec: S) -> Result<FileFilter> {
        let filter = FileFilter {
            name: name.into(),
            spec: spec.into(),
        };
        filter.validate()?;
        Ok(filter)
    }

    pub fn all_files() -> FileFilter {
        FileFilter {
            name: "All Files".into(),
            spec: "*.*".into(),
        }
    }

    pub fn from_extensions<N, I, E>(name: N, extensions: I) -> Result<FileFilter>
    where
        N: Into<String>,
        I: IntoIterator<Item = E>,
        E: AsRef<str>,
    {
        let spec = extensions
            .into_iter()
            .map(|ext| format!("*.{}", ext.as_ref().trim_start_matches('.')))
            .collect::<Vec<_>>()
            .join(";");
        FileFilter::new(name, spec)
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidFilter(format!("empty name for {:?}", self.spec)));
        }
        if self.patterns().next().is_none() {
            return Err(Error::InvalidFilter(format!("empty spec for {:?}", self.name)));
        }
        if self.name.contains('\0') || self.spec.contains('\0') {
            return Err(Error::InvalidFilter(format!("NUL in {:?}", self.name)));
        }
        Ok(())
    }

    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.spec
            .split(';')
            .map(str::trim)
            .filter(|pattern| !pattern.is_empty())
    }

    /// Extension of the first `*.ext` pattern, if it names a concrete one.
    pub fn first_extension(&self) -> Option<&str> {
        let ext = self.patterns().next()?.strip_prefix("*.")?;
        if ext.is_empty() || ext.contains(['*', '?']) {
            None
        } else {
            Some(ext)
        }
    }
}

/// Parses `Name=*.a;*.b`; a bare spec names itself.
impl FromStr for FileFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<FileFilter> {
        match s.split_once('=') {
            Some((name, spec)) => FileFilter::new(name.trim(), spec.trim()),
            None => FileFilter::new(s.trim(), s.trim()),
        }
    }
}

impl fmt::Display for FileFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.spec)
    }
}

#[cfg(windows)]
pub(crate) use self::win::FilterSpecs;

#[cfg(windows)]
mod win {
    use windows::{core::PCWSTR, Win32::UI::Shell::Common::COMDLG_FILTERSPEC};

    use super::FileFilter;
    use crate::{error::Result, util::conv::to_u16s};

    /// Owns the UTF-16 buffers that the `COMDLG_FILTERSPEC` array points into.
    pub(crate) struct FilterSpecs {
        // Kept alive for the pointers in `specs`.
        _buffers: Vec<(Vec<u16>, Vec<u16>)>,
        specs: Vec<COMDLG_FILTERSPEC>,
    }

    impl FilterSpecs {
        pub(crate) fn new(filters: &[FileFilter]) -> Result<FilterSpecs> {
            let buffers = filters
                .iter()
                .map(|filter| Ok((to_u16s(&filter.name)?, to_u16s(&filter.spec)?)))
                .collect::<Result<Vec<_>>>()?;
            let specs = buffers
                .iter()
                .map(|(name, spec)| COMDLG_FILTERSPEC {
                    pszName: PCWSTR::from_raw(name.as_ptr()),
                    pszSpec: PCWSTR::from_raw(spec.as_ptr()),
                })
                .collect();
            Ok(FilterSpecs {
                _buffers: buffers,
                specs,
            })
        }

        pub(crate) fn as_slice(&self) -> &[COMDLG_FILTERSPEC] {
            &self.specs
        }
    }
}
