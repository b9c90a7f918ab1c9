use std::{ffi::OsStr, io, os::windows::prelude::OsStrExt, path::PathBuf};

use windows::{
    core::{PCWSTR, PWSTR},
    Win32::System::Com::CoTaskMemFree,
};

use crate::error::Result;

pub trait ToWide {
    fn to_wide(&self) -> Vec<u16>;
    fn to_wide_null(&self) -> Vec<u16>;
}

impl<T> ToWide for T
where
    T: AsRef<OsStr>,
{
    fn to_wide(&self) -> Vec<u16> {
        self.as_ref().encode_wide().collect()
    }
    fn to_wide_null(&self) -> Vec<u16> {
        self.as_ref().encode_wide().chain(Some(0)).collect()
    }
}

pub fn to_u16s<S: AsRef<OsStr>>(s: S) -> Result<Vec<u16>> {
    let mut maybe_result: Vec<u16> = s.to_wide();
    if maybe_result.iter().any(|&u| u == 0) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            "strings passed to WinAPI cannot contain NULs",
        )
        .into());
    }
    maybe_result.push(0);
    Ok(maybe_result)
}

/// Reads a NUL terminated UTF-16 string the caller still owns.
pub fn from_wide_ptr(ptr: PCWSTR) -> Result<String> {
    if ptr.is_null() {
        return Ok(String::new());
    }
    Ok(unsafe { String::from_utf16(ptr.as_wide())? })
}

/// A string the shell allocated with `CoTaskMemAlloc` and handed to us.
pub struct CoTaskString(PWSTR);

impl CoTaskString {
    /// # Safety
    /// `ptr` must be null or a NUL terminated string allocated by the COM task allocator,
    /// and must not be freed elsewhere.
    pub unsafe fn from_raw(ptr: PWSTR) -> CoTaskString {
        CoTaskString(ptr)
    }

    pub fn to_string(&self) -> Result<String> {
        from_wide_ptr(PCWSTR::from_raw(self.0.as_ptr()))
    }

    pub fn to_path(&self) -> Result<PathBuf> {
        Ok(PathBuf::from(self.to_string()?))
    }
}

impl Drop for CoTaskString {
    fn drop(&mut self) {
        if !self.0.is_null() {
            unsafe { CoTaskMemFree(Some(self.0.as_ptr() as *const _)) };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wide_null_terminates() {
        assert_eq!("ab".to_wide_null(), vec![0x61, 0x62, 0]);
        assert_eq!("ab".to_wide(), vec![0x61, 0x62]);
    }

    #[test]
    fn interior_nul_rejected() {
        assert!(to_u16s("a\0b").is_err());
        assert_eq!(to_u16s("C:\\").unwrap(), vec![0x43, 0x3a, 0x5c, 0]);
    }

    #[test]
    fn reads_borrowed_wide_strings() {
        let wide = "Ünïcode".to_wide_null();
        assert_eq!(from_wide_ptr(PCWSTR::from_raw(wide.as_ptr())).unwrap(), "Ünïcode");
        assert_eq!(from_wide_ptr(PCWSTR::null()).unwrap(), "");
    }
}
