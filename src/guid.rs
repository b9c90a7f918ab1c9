//! Interface and class identities.

use std::{fmt, str::FromStr};

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

/// Binary layout of a Win32 `GUID`.
#[repr(C)]
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct Guid {
    pub data1: u32,
    pub data2: u16,
    pub data3: u16,
    pub data4: [u8; 8],
}

pub const IID_IUNKNOWN: Guid = Guid::from_u128(0x00000000_0000_0000_c000_000000000046);
pub const IID_IMODAL_WINDOW: Guid = Guid::from_u128(0xb4db1657_70d7_485e_8e3e_6fcb5a5c1802);
pub const IID_IFILE_DIALOG: Guid = Guid::from_u128(0x42f85136_db7e_439c_85f1_e4075d135fc8);
pub const IID_IFILE_OPEN_DIALOG: Guid = Guid::from_u128(0xd57c7288_d4ad_4768_be02_9d969532d960);
pub const IID_IFILE_SAVE_DIALOG: Guid = Guid::from_u128(0x84bccd23_5fde_4cdb_aea4_af64b83d78ab);
pub const IID_IFILE_DIALOG_EVENTS: Guid = Guid::from_u128(0x973510db_7d7f_452b_8975_74a85828d354);
pub const IID_ISHELL_ITEM: Guid = Guid::from_u128(0x43826d1e_e718_42ee_bc55_a1e261c37bfe);
pub const IID_ISHELL_ITEM_ARRAY: Guid = Guid::from_u128(0xb63ea76d_1f85_456f_a19c_48159efa858b);
pub const IID_IENUM_SHELL_ITEMS: Guid = Guid::from_u128(0x70629033_e363_4a28_a567_0db78006e6d7);

pub const CLSID_FILE_OPEN_DIALOG: Guid = Guid::from_u128(0xdc1c5a9c_e88a_4dde_a5a1_60f82a20aef7);
pub const CLSID_FILE_SAVE_DIALOG: Guid = Guid::from_u128(0xc0b4e2f3_ba21_4773_8dba_335ec946eb8b);

impl Guid {
    pub const fn zeroed() -> Guid {
        Guid {
            data1: 0,
            data2: 0,
            data3: 0,
            data4: [0; 8],
        }
    }

    pub const fn from_u128(uuid: u128) -> Guid {
        Guid {
            data1: (uuid >> 96) as u32,
            data2: (uuid >> 80 & 0xffff) as u16,
            data3: (uuid >> 64 & 0xffff) as u16,
            data4: (uuid as u64).to_be_bytes(),
        }
    }

    pub const fn to_u128(&self) -> u128 {
        ((self.data1 as u128) << 96)
            | ((self.data2 as u128) << 80)
            | ((self.data3 as u128) << 64)
            | (u64::from_be_bytes(self.data4) as u128)
    }

    pub const fn is_zero(&self) -> bool {
        self.to_u128() == 0
    }
}

impl FromStr for Guid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Guid> {
        let invalid = || Error::InvalidGuid(s.to_owned());

        let trimmed = s.trim();
        let body = match (trimmed.strip_prefix('{'), trimmed.strip_suffix('}')) {
            (Some(_), Some(_)) => &trimmed[1..trimmed.len() - 1],
            (None, None) => trimmed,
            _ => return Err(invalid()),
        };

        let groups: Vec<&str> = body.split('-').collect();
        let lengths = [8, 4, 4, 4, 12];
        if groups.len() != lengths.len()
            || groups
                .iter()
                .zip(lengths)
                .any(|(group, len)| group.len() != len || !group.bytes().all(|b| b.is_ascii_hexdigit()))
        {
            return Err(invalid());
        }

        let hex: String = groups.concat();
        let value = u128::from_str_radix(&hex, 16).map_err(|_| invalid())?;
        Ok(Guid::from_u128(value))
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d4 = &self.data4;
        write!(
            f,
            "{{{:08X}-{:04X}-{:04X}-{:02X}{:02X}-{:02X}{:02X}{:02X}{:02X}{:02X}{:02X}}}",
            self.data1, self.data2, self.data3, d4[0], d4[1], d4[2], d4[3], d4[4], d4[5], d4[6], d4[7]
        )
    }
}

impl fmt::Debug for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl Serialize for Guid {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Guid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Guid, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(de::Error::custom)
    }
}

#[cfg(windows)]
impl From<Guid> for windows::core::GUID {
    fn from(guid: Guid) -> Self {
        windows::core::GUID::from_values(guid.data1, guid.data2, guid.data3, guid.data4)
    }
}

#[cfg(windows)]
impl From<windows::core::GUID> for Guid {
    fn from(guid: windows::core::GUID) -> Self {
        Guid {
            data1: guid.data1,
            data2: guid.data2,
            data3: guid.data3,
            data4: guid.data4,
        }
    }
}
