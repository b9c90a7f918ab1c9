//! Shell items: the namespace objects the dialogs hand back.

use std::{
    borrow::Cow,
    ffi::OsStr,
    fmt,
    path::{Path, PathBuf},
};

use log::trace;
use windows::{
    core::HSTRING,
    Win32::{
        System::SystemServices::SFGAO_FLAGS,
        UI::Shell::{
            IEnumShellItems, IShellItem, IShellItemArray, SHCreateItemFromParsingName,
        },
    },
};

use crate::{
    error::Result,
    hresult::HResult,
    types::{Attributes, SigDn},
    util::conv::CoTaskString,
};

const SICHINT_CANONICAL: u32 = 0x1000_0000;

#[derive(Clone, PartialEq, Eq)]
pub struct ShellItem(IShellItem);

/// Everything a caller usually wants to know about a selected item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemInfo {
    pub display_name: String,
    /// `None` for items outside the file system (libraries, devices).
    pub path: Option<PathBuf>,
    pub attributes: Attributes,
    pub parent: Option<String>,
}

/// The name `SHCreateItemFromParsingName` understands. Verbatim prefixes from
/// `fs::canonicalize` are dropped; `\\?\UNC\server\share` becomes `\\server\share`.
fn parsing_name(path: &Path) -> Cow<'_, OsStr> {
    let text = path.as_os_str();
    match text.to_str() {
        Some(s) => {
            if let Some(rest) = s.strip_prefix(r"\\?\UNC\") {
                Cow::Owned(format!(r"\\{rest}").into())
            } else if let Some(rest) = s.strip_prefix(r"\\?\") {
                Cow::Borrowed(OsStr::new(rest))
            } else {
                Cow::Borrowed(text)
            }
        }
        None => Cow::Borrowed(text),
    }
}

impl ShellItem {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<ShellItem> {
        let name = parsing_name(path.as_ref());
        trace!("SHCreateItemFromParsingName({})", Path::new(&*name).display());
        let item: IShellItem =
            unsafe { SHCreateItemFromParsingName(&HSTRING::from(&*name), None)? };
        Ok(ShellItem(item))
    }

    pub fn display_name(&self, form: SigDn) -> Result<String> {
        trace!("GetDisplayName({form:?})");
        let name = unsafe { CoTaskString::from_raw(self.0.GetDisplayName(form.into())?) };
        name.to_string()
    }

    /// The file system path; fails for items that have none.
    pub fn path(&self) -> Result<PathBuf> {
        trace!("GetDisplayName(FileSysPath)");
        let name = unsafe { CoTaskString::from_raw(self.0.GetDisplayName(SigDn::FileSysPath.into())?) };
        name.to_path()
    }

    pub fn attributes(&self, mask: Attributes) -> Result<Attributes> {
        trace!("GetAttributes({mask})");
        let attrs = unsafe { self.0.GetAttributes(SFGAO_FLAGS(mask.0))? };
        Ok(Attributes(attrs.0))
    }

    /// `None` at the root of the namespace.
    pub fn parent(&self) -> Result<Option<ShellItem>> {
        trace!("GetParent()");
        match unsafe { self.0.GetParent() } {
            Ok(parent) => Ok(Some(ShellItem(parent))),
            Err(err) if HResult::from(err.code()) == HResult::MK_E_NOOBJECT => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Whether both items name the same namespace object.
    pub fn compare(&self, other: &ShellItem) -> Result<bool> {
        trace!("Compare(SICHINT_CANONICAL)");
        let order = unsafe { self.0.Compare(&other.0, SICHINT_CANONICAL)? };
        Ok(order == 0)
    }

    pub fn describe(&self) -> Result<ItemInfo> {
        let display_name = self.display_name(SigDn::NormalDisplay)?;
        let attributes = self.attributes(Attributes::DESCRIBE)?;
        let path = if attributes.is_file_system() {
            Some(self.path()?)
        } else {
            None
        };
        let parent = match self.parent()? {
            Some(parent) => Some(parent.display_name(SigDn::NormalDisplay)?),
            None => None,
        };
        Ok(ItemInfo {
            display_name,
            path,
            attributes,
            parent,
        })
    }

    pub fn as_raw(&self) -> &IShellItem {
        &self.0
    }
}

impl From<IShellItem> for ShellItem {
    fn from(item: IShellItem) -> Self {
        ShellItem(item)
    }
}

impl fmt::Debug for ShellItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.display_name(SigDn::DesktopAbsoluteParsing) {
            Ok(name) => write!(f, "ShellItem({name:?})"),
            Err(_) => f.write_str("ShellItem(<unnamed>)"),
        }
    }
}

/// The multi-selection result of an open dialog.
pub struct ShellItemArray(IShellItemArray);

impl ShellItemArray {
    pub fn len(&self) -> Result<u32> {
        trace!("GetCount()");
        Ok(unsafe { self.0.GetCount()? })
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    pub fn get(&self, index: u32) -> Result<ShellItem> {
        trace!("GetItemAt({index})");
        Ok(ShellItem(unsafe { self.0.GetItemAt(index)? }))
    }

    /// Walks the array through `IEnumShellItems`.
    pub fn iter(&self) -> Result<ShellItems> {
        trace!("EnumItems()");
        let items = unsafe { self.0.EnumItems()? };
        Ok(ShellItems { items, done: false })
    }

    pub fn paths(&self) -> Result<Vec<PathBuf>> {
        self.iter()?.map(|item| item?.path()).collect()
    }

    pub fn describe(&self) -> Result<Vec<ItemInfo>> {
        self.iter()?.map(|item| item?.describe()).collect()
    }
}

impl From<IShellItemArray> for ShellItemArray {
    fn from(array: IShellItemArray) -> Self {
        ShellItemArray(array)
    }
}

pub struct ShellItems {
    items: IEnumShellItems,
    done: bool,
}

impl Iterator for ShellItems {
    type Item = Result<ShellItem>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut slot = [None];
        let mut fetched = 0u32;
        let hr = unsafe { self.items.Next(&mut slot, Some(&mut fetched)) };
        if let Err(err) = hr {
            self.done = true;
            return Some(Err(err.into()));
        }
        match slot[0].take() {
            Some(item) if fetched > 0 => Some(Ok(ShellItem(item))),
            // S_FALSE, or nothing fetched
            _ => {
                self.done = true;
                None
            }
        }
    }
}
