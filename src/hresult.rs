//! HRESULT status codes.
//!
//! Every COM method reports through a 32-bit HRESULT: bit 31 is the severity,
//! bits 16 to 28 the facility and the low word the code.

use std::fmt;

#[derive(Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct HResult(pub i32);

impl HResult {
    pub const S_OK: HResult = HResult(0);
    pub const S_FALSE: HResult = HResult(1);
    pub const E_NOTIMPL: HResult = HResult(0x8000_4001_u32 as i32);
    pub const E_NOINTERFACE: HResult = HResult(0x8000_4002_u32 as i32);
    pub const E_POINTER: HResult = HResult(0x8000_4003_u32 as i32);
    pub const E_ABORT: HResult = HResult(0x8000_4004_u32 as i32);
    pub const E_FAIL: HResult = HResult(0x8000_4005_u32 as i32);
    pub const E_UNEXPECTED: HResult = HResult(0x8000_FFFF_u32 as i32);
    pub const E_ACCESSDENIED: HResult = HResult(0x8007_0005_u32 as i32);
    pub const E_OUTOFMEMORY: HResult = HResult(0x8007_000E_u32 as i32);
    pub const E_INVALIDARG: HResult = HResult(0x8007_0057_u32 as i32);
    /// `HRESULT_FROM_WIN32(ERROR_CANCELLED)`, returned by `Show` when the user dismisses the dialog.
    pub const CANCELLED: HResult = HResult(0x8007_04C7_u32 as i32);
    /// Returned by `IShellItem::GetParent` on the namespace root.
    pub const MK_E_NOOBJECT: HResult = HResult(0x8004_01E5_u32 as i32);

    const FACILITY_WIN32: u32 = 7;

    /// Equivalent of the `HRESULT_FROM_WIN32` macro.
    pub const fn from_win32(error: u32) -> HResult {
        if error as i32 <= 0 {
            HResult(error as i32)
        } else {
            HResult(((error & 0xFFFF) | (Self::FACILITY_WIN32 << 16) | 0x8000_0000) as i32)
        }
    }

    /// Parses decimal (signed or unsigned) or `0x` prefixed hexadecimal text.
    pub fn parse(text: &str) -> Option<HResult> {
        let text = text.trim();
        let (digits, radix) = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
            Some(hex) => (hex, 16),
            None => (text, 10),
        };
        if radix == 10 {
            if let Ok(value) = digits.parse::<i32>() {
                return Some(HResult(value));
            }
        }
        u32::from_str_radix(digits, radix)
            .ok()
            .map(|value| HResult(value as i32))
    }

    pub const fn is_success(self) -> bool {
        self.0 >= 0
    }

    pub const fn is_failure(self) -> bool {
        self.0 < 0
    }

    pub const fn severity(self) -> u32 {
        (self.0 as u32) >> 31
    }

    pub const fn facility(self) -> u32 {
        ((self.0 as u32) >> 16) & 0x1FFF
    }

    pub const fn code(self) -> u32 {
        (self.0 as u32) & 0xFFFF
    }

    pub fn name(self) -> Option<&'static str> {
        let name = match self {
            HResult::S_OK => "S_OK",
            HResult::S_FALSE => "S_FALSE",
            HResult::E_NOTIMPL => "E_NOTIMPL",
            HResult::E_NOINTERFACE => "E_NOINTERFACE",
            HResult::E_POINTER => "E_POINTER",
            HResult::E_ABORT => "E_ABORT",
            HResult::E_FAIL => "E_FAIL",
            HResult::E_UNEXPECTED => "E_UNEXPECTED",
            HResult::E_ACCESSDENIED => "E_ACCESSDENIED",
            HResult::E_OUTOFMEMORY => "E_OUTOFMEMORY",
            HResult::E_INVALIDARG => "E_INVALIDARG",
            HResult::CANCELLED => "HRESULT_FROM_WIN32(ERROR_CANCELLED)",
            HResult::MK_E_NOOBJECT => "MK_E_NOOBJECT",
            _ => return None,
        };
        Some(name)
    }

    pub fn decode(self) -> Decoded {
        Decoded(self)
    }
}

impl fmt::Display for HResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.0 as u32)
    }
}

impl fmt::Debug for HResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "HResult({self} {name})"),
            None => write!(f, "HResult({self})"),
        }
    }
}

impl From<i32> for HResult {
    fn from(value: i32) -> Self {
        HResult(value)
    }
}

#[cfg(windows)]
impl From<windows::core::HRESULT> for HResult {
    fn from(hr: windows::core::HRESULT) -> Self {
        HResult(hr.0)
    }
}

#[cfg(windows)]
impl From<HResult> for windows::core::HRESULT {
    fn from(hr: HResult) -> Self {
        windows::core::HRESULT(hr.0)
    }
}

/// Multi-line breakdown of an HRESULT, as printed by `shelldialog decode`.
pub struct Decoded(HResult);

impl fmt::Display for Decoded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hr = self.0;
        match hr.name() {
            Some(name) => writeln!(f, "HRESULT: {hr} ({name})")?,
            None => writeln!(f, "HRESULT: {hr}")?,
        }
        let severity = if hr.is_success() { "Success" } else { "Failure" };
        writeln!(f, "Severity: {severity}")?;
        writeln!(f, "Facility: {}", hr.facility())?;
        write!(f, "Code: 0x{:04X} ({})", hr.code(), hr.code())
    }
}
