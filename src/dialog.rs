use std::path::Path;

use log::{debug, trace};
use windows::{
    core::{Interface, HSTRING},
    Win32::{
        Foundation::HWND,
        UI::Shell::{IFileDialog, IFileOpenDialog, IFileSaveDialog, FDAP},
    },
};

use crate::{
    config::DialogConfig,
    error::{Error, Result},
    events::{Advised, DialogEvents},
    filter::{FileFilter, FilterSpecs},
    guid::Guid,
    hresult::HResult,
    options::FileOptions,
    shell::{ShellItem, ShellItemArray},
    types::{DialogKind, PlacePosition},
    util::{com::create_instance, conv::CoTaskString},
};

enum Inner {
    Open(IFileOpenDialog),
    Save(IFileSaveDialog),
}

/// An `IFileOpenDialog` or `IFileSaveDialog`, driven through their shared `IFileDialog` base.
pub struct FileDialog {
    kind: DialogKind,
    inner: Inner,
    base: IFileDialog,
}

impl FileDialog {
    pub fn new(kind: DialogKind) -> Result<FileDialog> {
        debug!("creating {kind} dialog, class {}", kind.class_id());
        let inner = match kind {
            DialogKind::Open | DialogKind::Folder => {
                Inner::Open(create_instance::<IFileOpenDialog>(&kind.class_id())?)
            }
            DialogKind::Save => Inner::Save(create_instance::<IFileSaveDialog>(&kind.class_id())?),
        };
        let base: IFileDialog = match &inner {
            Inner::Open(dialog) => dialog.cast()?,
            Inner::Save(dialog) => dialog.cast()?,
        };
        let dialog = FileDialog { kind, inner, base };
        if kind == DialogKind::Folder {
            let options = dialog.options()? | FileOptions::PICK_FOLDERS;
            dialog.set_options(options)?;
        }
        Ok(dialog)
    }

    pub fn kind(&self) -> DialogKind {
        self.kind
    }

    /// The shared base interface.
    pub fn as_raw(&self) -> &IFileDialog {
        &self.base
    }

    pub fn set_title(&self, title: &str) -> Result<()> {
        trace!("SetTitle({title:?})");
        unsafe { self.base.SetTitle(&HSTRING::from(title))? };
        Ok(())
    }

    pub fn set_ok_button_label(&self, label: &str) -> Result<()> {
        trace!("SetOkButtonLabel({label:?})");
        unsafe { self.base.SetOkButtonLabel(&HSTRING::from(label))? };
        Ok(())
    }

    pub fn set_file_name_label(&self, label: &str) -> Result<()> {
        trace!("SetFileNameLabel({label:?})");
        unsafe { self.base.SetFileNameLabel(&HSTRING::from(label))? };
        Ok(())
    }

    pub fn set_file_name(&self, name: &str) -> Result<()> {
        trace!("SetFileName({name:?})");
        unsafe { self.base.SetFileName(&HSTRING::from(name))? };
        Ok(())
    }

    pub fn file_name(&self) -> Result<String> {
        let name = unsafe { CoTaskString::from_raw(self.base.GetFileName()?) };
        name.to_string()
    }

    /// Extension without the dot; appended when the user types a bare name.
    pub fn set_default_extension(&self, extension: &str) -> Result<()> {
        let extension = extension.trim_start_matches('.');
        trace!("SetDefaultExtension({extension:?})");
        unsafe { self.base.SetDefaultExtension(&HSTRING::from(extension))? };
        Ok(())
    }

    pub fn set_folder<P: AsRef<Path>>(&self, folder: P) -> Result<()> {
        let item = ShellItem::from_path(folder)?;
        trace!("SetFolder({item:?})");
        unsafe { self.base.SetFolder(item.as_raw())? };
        Ok(())
    }

    pub fn set_default_folder<P: AsRef<Path>>(&self, folder: P) -> Result<()> {
        let item = ShellItem::from_path(folder)?;
        trace!("SetDefaultFolder({item:?})");
        unsafe { self.base.SetDefaultFolder(item.as_raw())? };
        Ok(())
    }

    pub fn folder(&self) -> Result<ShellItem> {
        Ok(unsafe { self.base.GetFolder()? }.into())
    }

    pub fn current_selection(&self) -> Result<ShellItem> {
        Ok(unsafe { self.base.GetCurrentSelection()? }.into())
    }

    /// An empty list leaves the dialog without a type box.
    pub fn set_file_types(&self, filters: &[FileFilter]) -> Result<()> {
        if filters.is_empty() {
            return Ok(());
        }
        let specs = FilterSpecs::new(filters)?;
        trace!("SetFileTypes({} filters)", filters.len());
        unsafe { self.base.SetFileTypes(specs.as_slice())? };
        Ok(())
    }

    /// `index` is 1-based.
    pub fn set_file_type_index(&self, index: u32) -> Result<()> {
        trace!("SetFileTypeIndex({index})");
        unsafe { self.base.SetFileTypeIndex(index)? };
        Ok(())
    }

    pub fn file_type_index(&self) -> Result<u32> {
        Ok(unsafe { self.base.GetFileTypeIndex()? })
    }

    pub fn options(&self) -> Result<FileOptions> {
        Ok(unsafe { self.base.GetOptions()? }.into())
    }

    pub fn set_options(&self, options: FileOptions) -> Result<()> {
        trace!("SetOptions({options:?})");
        unsafe { self.base.SetOptions(options.into())? };
        Ok(())
    }

    pub fn add_place<P: AsRef<Path>>(&self, folder: P, position: PlacePosition) -> Result<()> {
        let item = ShellItem::from_path(folder)?;
        trace!("AddPlace({item:?}, {position:?})");
        unsafe { self.base.AddPlace(item.as_raw(), FDAP(position as i32))? };
        Ok(())
    }

    pub fn set_client_guid(&self, guid: &Guid) -> Result<()> {
        trace!("SetClientGuid({guid})");
        let guid = windows::core::GUID::from(*guid);
        unsafe { self.base.SetClientGuid(&guid)? };
        Ok(())
    }

    /// Forgets the state persisted under the client GUID.
    pub fn clear_client_data(&self) -> Result<()> {
        unsafe { self.base.ClearClientData()? };
        Ok(())
    }

    /// Proposes an existing item to save over; save dialogs only.
    pub fn set_save_as_item<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let Inner::Save(dialog) = &self.inner else {
            return Err(Error::Unsupported("SetSaveAsItem"));
        };
        let item = ShellItem::from_path(path)?;
        trace!("SetSaveAsItem({item:?})");
        unsafe { dialog.SetSaveAsItem(item.as_raw())? };
        Ok(())
    }

    pub fn advise(&self, handler: Box<dyn DialogEvents>) -> Result<Advised> {
        Advised::new(&self.base, handler)
    }

    /// Applies a whole preset.
    pub fn configure(&self, config: &DialogConfig) -> Result<()> {
        config.validate()?;
        if config.kind != self.kind {
            return Err(Error::InvalidConfig(format!(
                "{} preset applied to a {} dialog",
                config.kind, self.kind
            )));
        }

        if let Some(guid) = &config.client_guid {
            self.set_client_guid(guid)?;
        }
        if let Some(title) = &config.title {
            self.set_title(title)?;
        }
        if let Some(label) = &config.ok_button_label {
            self.set_ok_button_label(label)?;
        }
        if let Some(label) = &config.file_name_label {
            self.set_file_name_label(label)?;
        }
        if let Some(name) = &config.file_name {
            self.set_file_name(name)?;
        }
        if let Some(extension) = config.effective_default_extension() {
            self.set_default_extension(extension)?;
        }
        self.set_file_types(&config.filters)?;
        if let Some(index) = config.file_type_index {
            self.set_file_type_index(index)?;
        }
        if let Some(folder) = &config.folder {
            self.set_folder(folder)?;
        }
        if let Some(folder) = &config.default_folder {
            self.set_default_folder(folder)?;
        }
        for place in &config.places {
            self.add_place(&place.path, place.position)?;
        }

        let mut options = self.options()?;
        if self.kind == DialogKind::Folder {
            options.insert(FileOptions::PICK_FOLDERS);
        }
        options.set(FileOptions::ALLOW_MULTISELECT, config.multiselect);
        if config.force_file_system {
            options.insert(FileOptions::FORCE_FILE_SYSTEM);
        }
        let options = config.options.apply(options);
        self.set_options(options)
    }

    /// Runs the modal loop. `Ok(false)` means the user cancelled.
    pub fn show(&self, owner: Option<HWND>) -> Result<bool> {
        debug!("showing {} dialog", self.kind);
        match unsafe { self.base.Show(owner.unwrap_or_default()) } {
            Ok(()) => Ok(true),
            Err(err) if HResult::from(err.code()) == HResult::CANCELLED => {
                debug!("dialog cancelled");
                Ok(false)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// The single chosen item; for save dialogs, the file to write.
    pub fn result(&self) -> Result<ShellItem> {
        Ok(unsafe { self.base.GetResult()? }.into())
    }

    /// All chosen items of an open dialog.
    pub fn results(&self) -> Result<ShellItemArray> {
        match &self.inner {
            Inner::Open(dialog) => Ok(unsafe { dialog.GetResults()? }.into()),
            Inner::Save(_) => Err(Error::Unsupported("GetResults")),
        }
    }

    /// The items currently selected in the view, while the dialog is shown.
    pub fn selected_items(&self) -> Result<ShellItemArray> {
        match &self.inner {
            Inner::Open(dialog) => Ok(unsafe { dialog.GetSelectedItems()? }.into()),
            Inner::Save(_) => Err(Error::Unsupported("GetSelectedItems")),
        }
    }

    pub fn close(&self, hr: HResult) -> Result<()> {
        unsafe { self.base.Close(hr.into())? };
        Ok(())
    }
}
