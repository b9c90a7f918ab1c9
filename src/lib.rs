//! Drives the Windows Shell file dialogs (`IFileOpenDialog`, `IFileSaveDialog`)
//! through their COM interfaces.
//!
//! The data model (identities, status codes, options, filters, presets) is
//! portable; the dialogs themselves are only available on Windows.

pub mod config;
pub mod error;
pub mod filter;
pub mod guid;
pub mod hresult;
pub mod logging;
pub mod options;
pub mod types;

#[cfg(windows)]
pub mod dialog;
#[cfg(windows)]
pub mod events;
#[cfg(windows)]
pub mod shell;
#[cfg(windows)]
mod util;

pub use {
    config::{DialogConfig, Place},
    error::{Error, Result},
    filter::FileFilter,
    guid::Guid,
    hresult::HResult,
    options::{DialogOption, FileOptions, OptionState, OptionToggles},
    types::{Attributes, DialogKind, PlacePosition, Response, SigDn},
};

#[cfg(windows)]
pub use {
    dialog::FileDialog,
    events::{Advised, DialogEvents, DialogView, EventSink, LoggingEvents},
    shell::{ItemInfo, ShellItem, ShellItemArray},
    util::{
        com::ensure_apartment,
        conv::ToWide,
    },
};

#[cfg(windows)]
pub use self::run::{pick_file, pick_files, pick_folder, run, save_file, Selection};

#[cfg(windows)]
mod run {
    use std::path::PathBuf;

    use log::info;
    use windows::Win32::Foundation::HWND;

    use crate::{
        config::DialogConfig,
        dialog::FileDialog,
        error::Result,
        events::LoggingEvents,
        shell::ItemInfo,
        types::DialogKind,
        util::com::ensure_apartment,
    };

    /// What the user picked.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Selection {
        Cancelled,
        Items(Vec<ItemInfo>),
    }

    impl Selection {
        pub fn paths(&self) -> Vec<PathBuf> {
            match self {
                Selection::Cancelled => vec![],
                Selection::Items(items) => items.iter().filter_map(|i| i.path.clone()).collect(),
            }
        }
    }

    /// Creates, configures and shows one dialog, then collects what was chosen.
    pub fn run(config: &DialogConfig, owner: Option<HWND>) -> Result<Selection> {
        ensure_apartment()?;
        let dialog = FileDialog::new(config.kind)?;
        dialog.configure(config)?;
        let _events = dialog.advise(Box::new(LoggingEvents))?;

        if !dialog.show(owner)? {
            return Ok(Selection::Cancelled);
        }

        let items = if config.kind.is_open() {
            dialog.results()?.describe()?
        } else {
            vec![dialog.result()?.describe()?]
        };
        info!("{} item(s) selected", items.len());
        Ok(Selection::Items(items))
    }

    fn single(config: &DialogConfig, kind: DialogKind) -> Result<Option<PathBuf>> {
        let mut config = config.clone();
        config.kind = kind;
        config.multiselect = false;
        Ok(run(&config, None)?.paths().into_iter().next())
    }

    pub fn pick_file(config: &DialogConfig) -> Result<Option<PathBuf>> {
        single(config, DialogKind::Open)
    }

    pub fn pick_files(config: &DialogConfig) -> Result<Vec<PathBuf>> {
        let mut config = config.clone();
        config.kind = DialogKind::Open;
        config.multiselect = true;
        Ok(run(&config, None)?.paths())
    }

    pub fn pick_folder(config: &DialogConfig) -> Result<Option<PathBuf>> {
        single(config, DialogKind::Folder)
    }

    pub fn save_file(config: &DialogConfig) -> Result<Option<PathBuf>> {
        single(config, DialogKind::Save)
    }
}
