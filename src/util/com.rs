use log::{debug, warn};
use windows::{
    core::{Interface, HRESULT},
    Win32::System::Com::{
        CoCreateInstance, CoInitializeEx, CoUninitialize, CLSCTX_INPROC_SERVER,
        COINIT_APARTMENTTHREADED, COINIT_DISABLE_OLE1DDE,
    },
};

use crate::{error::Result, guid::Guid, hresult::HResult};

thread_local!(static APARTMENT: Apartment = {
    let hr = unsafe { CoInitializeEx(None, COINIT_APARTMENTTHREADED | COINIT_DISABLE_OLE1DDE) };
    if hr == HRESULT(HResult::S_FALSE.0) {
        debug!("COM already initialized on this thread");
    } else if hr.is_err() {
        warn!("CoInitializeEx failed: {}", HResult::from(hr));
    }
    Apartment(hr, std::ptr::null_mut())
});

/// RAII object that guards the fact that this thread joined a single-threaded apartment.
///
// The raw pointer removes `Send`/`Sync`; the apartment belongs to one thread.
struct Apartment(HRESULT, *mut ());

impl Drop for Apartment {
    #[inline]
    fn drop(&mut self) {
        // Every successful CoInitializeEx, S_FALSE included, needs a matching CoUninitialize.
        if self.0.is_ok() {
            unsafe { CoUninitialize() };
        }
    }
}

/// Ensures that COM is initialized in this thread, failing with `RPC_E_CHANGED_MODE`
/// if somebody else already put it in the multithreaded apartment.
pub fn ensure_apartment() -> Result<()> {
    APARTMENT.with(|apartment| apartment.0.ok())?;
    Ok(())
}

pub fn create_instance<T: Interface>(clsid: &Guid) -> Result<T> {
    ensure_apartment()?;
    let clsid = windows::core::GUID::from(*clsid);
    unsafe { Ok(CoCreateInstance(&clsid, None, CLSCTX_INPROC_SERVER)?) }
}
