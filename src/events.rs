//! The dialog event sink: an `IFileDialogEvents` object implemented in Rust and
//! handed to the dialog through `IFileDialog::Advise`.

use log::{debug, warn};
use windows::{
    core::{implement, Error as WinError, Result as WinResult},
    Win32::{
        Foundation::{E_ABORT, E_POINTER, S_FALSE},
        UI::Shell::{
            IFileDialog, IFileDialogEvents, IFileDialogEvents_Impl, IShellItem,
            FDE_OVERWRITE_RESPONSE, FDE_SHAREVIOLATION_RESPONSE,
        },
    },
};

use crate::{
    error::Result,
    hresult::HResult,
    shell::ShellItem,
    types::{Response, SigDn},
    util::conv::CoTaskString,
};

/// Callbacks a dialog makes while it is shown. Every method has a default that
/// lets the dialog carry on as if no handler were attached.
pub trait DialogEvents {
    /// Called before the dialog closes with OK. Returning `false` keeps it open.
    fn on_file_ok(&self, _dialog: &DialogView) -> bool {
        true
    }

    /// Returning `false` stops the navigation.
    fn on_folder_changing(&self, _dialog: &DialogView, _folder: &ShellItem) -> bool {
        true
    }

    fn on_folder_change(&self, _dialog: &DialogView) {}

    fn on_selection_change(&self, _dialog: &DialogView) {}

    fn on_share_violation(&self, _dialog: &DialogView, _item: &ShellItem) -> Response {
        Response::Default
    }

    fn on_type_change(&self, _dialog: &DialogView) {}

    fn on_overwrite(&self, _dialog: &DialogView, _item: &ShellItem) -> Response {
        Response::Default
    }
}

/// The dialog as seen from inside a callback.
pub struct DialogView<'a>(&'a IFileDialog);

impl DialogView<'_> {
    pub fn file_name(&self) -> Result<String> {
        let name = unsafe { CoTaskString::from_raw(self.0.GetFileName()?) };
        name.to_string()
    }

    pub fn folder(&self) -> Result<ShellItem> {
        Ok(unsafe { self.0.GetFolder()? }.into())
    }

    pub fn current_selection(&self) -> Result<ShellItem> {
        Ok(unsafe { self.0.GetCurrentSelection()? }.into())
    }

    /// 1-based, as the dialog reports it.
    pub fn file_type_index(&self) -> Result<u32> {
        Ok(unsafe { self.0.GetFileTypeIndex()? })
    }

    /// Dismisses the dialog; `Show` returns `hr`.
    pub fn close(&self, hr: HResult) -> Result<()> {
        unsafe { self.0.Close(hr.into())? };
        Ok(())
    }
}

#[implement(IFileDialogEvents)]
pub struct EventSink {
    handler: Box<dyn DialogEvents>,
}

impl EventSink {
    pub fn new(handler: Box<dyn DialogEvents>) -> IFileDialogEvents {
        EventSink { handler }.into()
    }
}

fn view(pfd: Option<&IFileDialog>) -> WinResult<DialogView> {
    pfd.map(DialogView).ok_or_else(|| WinError::from(E_POINTER))
}

fn item(psi: Option<&IShellItem>) -> WinResult<ShellItem> {
    psi.cloned()
        .map(ShellItem::from)
        .ok_or_else(|| WinError::from(E_POINTER))
}

impl IFileDialogEvents_Impl for EventSink_Impl {
    fn OnFileOk(&self, pfd: Option<&IFileDialog>) -> WinResult<()> {
        if self.handler.on_file_ok(&view(pfd)?) {
            Ok(())
        } else {
            Err(S_FALSE.into())
        }
    }

    fn OnFolderChanging(
        &self,
        pfd: Option<&IFileDialog>,
        psifolder: Option<&IShellItem>,
    ) -> WinResult<()> {
        if self.handler.on_folder_changing(&view(pfd)?, &item(psifolder)?) {
            Ok(())
        } else {
            Err(E_ABORT.into())
        }
    }

    fn OnFolderChange(&self, pfd: Option<&IFileDialog>) -> WinResult<()> {
        self.handler.on_folder_change(&view(pfd)?);
        Ok(())
    }

    fn OnSelectionChange(&self, pfd: Option<&IFileDialog>) -> WinResult<()> {
        self.handler.on_selection_change(&view(pfd)?);
        Ok(())
    }

    fn OnShareViolation(
        &self,
        pfd: Option<&IFileDialog>,
        psi: Option<&IShellItem>,
        presponse: *mut FDE_SHAREVIOLATION_RESPONSE,
    ) -> WinResult<()> {
        if presponse.is_null() {
            return Err(E_POINTER.into());
        }
        let response = self.handler.on_share_violation(&view(pfd)?, &item(psi)?);
        unsafe { *presponse = FDE_SHAREVIOLATION_RESPONSE(response as i32) };
        Ok(())
    }

    fn OnTypeChange(&self, pfd: Option<&IFileDialog>) -> WinResult<()> {
        self.handler.on_type_change(&view(pfd)?);
        Ok(())
    }

    fn OnOverwrite(
        &self,
        pfd: Option<&IFileDialog>,
        psi: Option<&IShellItem>,
        presponse: *mut FDE_OVERWRITE_RESPONSE,
    ) -> WinResult<()> {
        if presponse.is_null() {
            return Err(E_POINTER.into());
        }
        let response = self.handler.on_overwrite(&view(pfd)?, &item(psi)?);
        unsafe { *presponse = FDE_OVERWRITE_RESPONSE(response as i32) };
        Ok(())
    }
}

/// Traces every callback and otherwise keeps the dialog's default behaviour.
#[derive(Default)]
pub struct LoggingEvents;

impl DialogEvents for LoggingEvents {
    fn on_file_ok(&self, dialog: &DialogView) -> bool {
        match dialog.file_name() {
            Ok(name) => debug!("OnFileOk: {name:?}"),
            Err(err) => debug!("OnFileOk: file name unavailable: {err}"),
        }
        true
    }

    fn on_folder_changing(&self, _dialog: &DialogView, folder: &ShellItem) -> bool {
        debug!("OnFolderChanging: {folder:?}");
        true
    }

    fn on_folder_change(&self, dialog: &DialogView) {
        if let Ok(folder) = dialog.folder() {
            debug!("OnFolderChange: {folder:?}");
        }
    }

    fn on_selection_change(&self, dialog: &DialogView) {
        match dialog
            .current_selection()
            .and_then(|item| item.display_name(SigDn::NormalDisplay))
        {
            Ok(name) => debug!("OnSelectionChange: {name}"),
            Err(_) => debug!("OnSelectionChange: nothing selected"),
        }
    }

    fn on_share_violation(&self, _dialog: &DialogView, item: &ShellItem) -> Response {
        debug!("OnShareViolation: {item:?}");
        Response::Default
    }

    fn on_type_change(&self, dialog: &DialogView) {
        if let Ok(index) = dialog.file_type_index() {
            debug!("OnTypeChange: file type {index}");
        }
    }

    fn on_overwrite(&self, _dialog: &DialogView, item: &ShellItem) -> Response {
        debug!("OnOverwrite: {item:?}");
        Response::Default
    }
}

/// Keeps an event sink attached to a dialog; unadvises on drop.
pub struct Advised {
    dialog: IFileDialog,
    cookie: u32,
}

impl Advised {
    pub(crate) fn new(dialog: &IFileDialog, handler: Box<dyn DialogEvents>) -> Result<Advised> {
        let sink = EventSink::new(handler);
        let cookie = unsafe { dialog.Advise(&sink)? };
        debug!("event sink advised, cookie {cookie}");
        Ok(Advised {
            dialog: dialog.clone(),
            cookie,
        })
    }

    pub fn cookie(&self) -> u32 {
        self.cookie
    }
}

impl Drop for Advised {
    fn drop(&mut self) {
        if let Err(err) = unsafe { self.dialog.Unadvise(self.cookie) } {
            warn!("Unadvise({}) failed: {err}", self.cookie);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, ptr, rc::Rc};

    use windows::{
        core::{IUnknown, Interface},
        Win32::UI::Shell::{IFileDialog, IShellItem},
    };

    use super::*;
    use crate::{guid, util::com::create_instance};

    #[derive(Default)]
    struct Counts {
        file_ok: Cell<u32>,
        folder_changing: Cell<u32>,
        folder_change: Cell<u32>,
        share_violation: Cell<u32>,
        overwrite: Cell<u32>,
    }

    fn bump(cell: &Cell<u32>) {
        cell.set(cell.get() + 1);
    }

    struct Recorder {
        counts: Rc<Counts>,
        accept: bool,
        response: Response,
    }

    impl DialogEvents for Recorder {
        fn on_file_ok(&self, _dialog: &DialogView) -> bool {
            bump(&self.counts.file_ok);
            self.accept
        }

        fn on_folder_changing(&self, _dialog: &DialogView, _folder: &ShellItem) -> bool {
            bump(&self.counts.folder_changing);
            self.accept
        }

        fn on_folder_change(&self, _dialog: &DialogView) {
            bump(&self.counts.folder_change);
        }

        fn on_share_violation(&self, _dialog: &DialogView, _item: &ShellItem) -> Response {
            bump(&self.counts.share_violation);
            self.response
        }

        fn on_overwrite(&self, _dialog: &DialogView, _item: &ShellItem) -> Response {
            bump(&self.counts.overwrite);
            self.response
        }
    }

    fn recorder(accept: bool, response: Response) -> (IFileDialogEvents, Rc<Counts>) {
        let counts = Rc::new(Counts::default());
        let sink = EventSink::new(Box::new(Recorder {
            counts: counts.clone(),
            accept,
            response,
        }));
        (sink, counts)
    }

    fn open_dialog() -> IFileDialog {
        create_instance(&guid::CLSID_FILE_OPEN_DIALOG).unwrap()
    }

    fn temp_item() -> (tempfile::TempDir, ShellItem) {
        let dir = tempfile::tempdir().unwrap();
        let item = ShellItem::from_path(dir.path()).unwrap();
        (dir, item)
    }

    #[test]
    fn query_interface_answers_own_identities() {
        let (sink, _) = recorder(true, Response::Default);
        assert!(sink.cast::<IUnknown>().is_ok());
        let err = sink.cast::<IShellItem>().unwrap_err();
        assert_eq!(HResult::from(err.code()), HResult::E_NOINTERFACE);
    }

    #[test]
    fn upcalls_reach_the_handler() {
        let dialog = open_dialog();
        let (sink, counts) = recorder(true, Response::Default);

        unsafe { sink.OnFolderChange(&dialog) }.unwrap();
        unsafe { sink.OnFolderChange(&dialog) }.unwrap();
        unsafe { sink.OnFileOk(&dialog) }.unwrap();

        assert_eq!(counts.folder_change.get(), 2);
        assert_eq!(counts.file_ok.get(), 1);
    }

    #[test]
    fn refusing_file_ok_returns_s_false() {
        let dialog = open_dialog();
        let (sink, counts) = recorder(false, Response::Default);
        // S_FALSE is a success code, so go through the vtable slot directly to see it.
        let hr = unsafe { (sink.vtable().OnFileOk)(sink.as_raw(), dialog.as_raw()) };
        assert_eq!(HResult::from(hr), HResult::S_FALSE);
        assert_eq!(counts.file_ok.get(), 1);
    }

    #[test]
    fn folder_change_veto_is_e_abort() {
        let dialog = open_dialog();
        let (_dir, folder) = temp_item();

        let (sink, counts) = recorder(false, Response::Default);
        let hr = unsafe {
            (sink.vtable().OnFolderChanging)(sink.as_raw(), dialog.as_raw(), folder.as_raw().as_raw())
        };
        assert_eq!(HResult::from(hr), HResult::E_ABORT);
        assert_eq!(counts.folder_changing.get(), 1);

        let (sink, _) = recorder(true, Response::Default);
        let hr = unsafe {
            (sink.vtable().OnFolderChanging)(sink.as_raw(), dialog.as_raw(), folder.as_raw().as_raw())
        };
        assert_eq!(HResult::from(hr), HResult::S_OK);
    }

    #[test]
    fn responses_are_written_back() {
        let dialog = open_dialog();
        let (_dir, item) = temp_item();
        let (sink, counts) = recorder(true, Response::Refuse);

        let mut overwrite = FDE_OVERWRITE_RESPONSE(-1);
        let hr = unsafe {
            (sink.vtable().OnOverwrite)(
                sink.as_raw(),
                dialog.as_raw(),
                item.as_raw().as_raw(),
                &mut overwrite,
            )
        };
        assert_eq!(HResult::from(hr), HResult::S_OK);
        assert_eq!(overwrite.0, Response::Refuse as i32);

        let mut share = FDE_SHAREVIOLATION_RESPONSE(-1);
        let hr = unsafe {
            (sink.vtable().OnShareViolation)(
                sink.as_raw(),
                dialog.as_raw(),
                item.as_raw().as_raw(),
                &mut share,
            )
        };
        assert_eq!(HResult::from(hr), HResult::S_OK);
        assert_eq!(share.0, Response::Refuse as i32);

        assert_eq!(counts.overwrite.get(), 1);
        assert_eq!(counts.share_violation.get(), 1);
    }

    #[test]
    fn default_handler_answers_default_response() {
        let dialog = open_dialog();
        let (_dir, item) = temp_item();
        let sink = EventSink::new(Box::new(LoggingEvents));

        let mut overwrite = FDE_OVERWRITE_RESPONSE(-1);
        let hr = unsafe {
            (sink.vtable().OnOverwrite)(
                sink.as_raw(),
                dialog.as_raw(),
                item.as_raw().as_raw(),
                &mut overwrite,
            )
        };
        assert_eq!(HResult::from(hr), HResult::S_OK);
        assert_eq!(overwrite.0, Response::Default as i32);
    }

    #[test]
    fn null_response_pointer_is_e_pointer() {
        let dialog = open_dialog();
        let (_dir, item) = temp_item();
        let (sink, counts) = recorder(true, Response::Accept);
        let hr = unsafe {
            (sink.vtable().OnOverwrite)(
                sink.as_raw(),
                dialog.as_raw(),
                item.as_raw().as_raw(),
                ptr::null_mut(),
            )
        };
        assert_eq!(HResult::from(hr), HResult::E_POINTER);
        assert_eq!(counts.overwrite.get(), 0);
    }

    #[test]
    fn null_dialog_is_e_pointer() {
        let (sink, counts) = recorder(true, Response::Default);
        let err = unsafe { sink.OnFileOk(None) }.unwrap_err();
        assert_eq!(HResult::from(err.code()), HResult::E_POINTER);
        assert_eq!(counts.file_ok.get(), 0);
    }

    #[test]
    fn advise_and_unadvise() {
        let dialog = open_dialog();
        let advised = Advised::new(&dialog, Box::new(LoggingEvents)).unwrap();
        assert_ne!(advised.cookie(), 0);
        drop(advised);
    }
}
