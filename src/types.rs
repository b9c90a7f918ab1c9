use std::{fmt, ops::BitOr};

use serde::{Deserialize, Serialize};

use crate::guid::{self, Guid};

/// Name forms accepted by `IShellItem::GetDisplayName`.
#[repr(i32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SigDn {
    NormalDisplay = 0,
    ParentRelativeParsing = 0x8001_8001_u32 as i32,
    DesktopAbsoluteParsing = 0x8002_8000_u32 as i32,
    ParentRelativeEditing = 0x8003_1001_u32 as i32,
    DesktopAbsoluteEditing = 0x8004_C000_u32 as i32,
    FileSysPath = 0x8005_8000_u32 as i32,
    Url = 0x8006_8000_u32 as i32,
    ParentRelativeForAddressBar = 0x8007_C001_u32 as i32,
    ParentRelative = 0x8008_0001_u32 as i32,
    ParentRelativeForUi = 0x8009_4001_u32 as i32,
}

#[cfg(windows)]
impl From<SigDn> for windows::Win32::UI::Shell::SIGDN {
    fn from(sigdn: SigDn) -> Self {
        windows::Win32::UI::Shell::SIGDN(sigdn as i32)
    }
}

/// `SFGAO_*` attribute bits reported by `IShellItem::GetAttributes`.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes(pub u32);

impl Attributes {
    pub const LINK: Attributes = Attributes(0x0001_0000);
    pub const READONLY: Attributes = Attributes(0x0004_0000);
    pub const HIDDEN: Attributes = Attributes(0x0008_0000);
    pub const STREAM: Attributes = Attributes(0x0040_0000);
    pub const FOLDER: Attributes = Attributes(0x2000_0000);
    pub const FILESYSTEM: Attributes = Attributes(0x4000_0000);

    /// Mask used when describing selections.
    pub const DESCRIBE: Attributes = Attributes(
        Self::FILESYSTEM.0 | Self::FOLDER.0 | Self::LINK.0 | Self::HIDDEN.0 | Self::READONLY.0,
    );

    pub const fn contains(self, other: Attributes) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_folder(self) -> bool {
        self.contains(Self::FOLDER)
    }

    pub const fn is_file_system(self) -> bool {
        self.contains(Self::FILESYSTEM)
    }
}

impl BitOr for Attributes {
    type Output = Attributes;

    fn bitor(self, rhs: Attributes) -> Attributes {
        Attributes(self.0 | rhs.0)
    }
}

impl fmt::Debug for Attributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Attributes(0x{:08X})", self.0)
    }
}

impl fmt::Display for Attributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(Attributes, &str); 6] = [
            (Attributes::FILESYSTEM, "filesystem"),
            (Attributes::FOLDER, "folder"),
            (Attributes::LINK, "link"),
            (Attributes::HIDDEN, "hidden"),
            (Attributes::READONLY, "readonly"),
            (Attributes::STREAM, "stream"),
        ];
        let names: Vec<&str> = NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        if names.is_empty() {
            write!(f, "0x{:08X}", self.0)
        } else {
            write!(f, "{} (0x{:08X})", names.join("|"), self.0)
        }
    }
}

/// Answer to `OnShareViolation` / `OnOverwrite`.
#[repr(i32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Response {
    /// Let the dialog apply its own policy.
    #[default]
    Default = 0,
    Accept = 1,
    Refuse = 2,
}

/// Where `IFileDialog::AddPlace` puts a folder in the navigation pane.
#[repr(i32)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlacePosition {
    #[default]
    Bottom = 0,
    Top = 1,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DialogKind {
    #[default]
    Open,
    Save,
    /// An open dialog that picks folders instead of files.
    Folder,
}

impl DialogKind {
    pub const fn class_id(self) -> Guid {
        match self {
            DialogKind::Open | DialogKind::Folder => guid::CLSID_FILE_OPEN_DIALOG,
            DialogKind::Save => guid::CLSID_FILE_SAVE_DIALOG,
        }
    }

    pub const fn iid(self) -> Guid {
        match self {
            DialogKind::Open | DialogKind::Folder => guid::IID_IFILE_OPEN_DIALOG,
            DialogKind::Save => guid::IID_IFILE_SAVE_DIALOG,
        }
    }

    pub const fn is_open(self) -> bool {
        !matches!(self, DialogKind::Save)
    }
}

impl fmt::Display for DialogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DialogKind::Open => "open",
            DialogKind::Save => "save",
            DialogKind::Folder => "folder",
        })
    }
}
