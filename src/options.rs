//! `FILEOPENDIALOGOPTIONS` flags and the tri-state toggles layered on top of them.

use std::{
    collections::BTreeMap,
    fmt,
    ops::{BitAnd, BitOr, BitOrAssign, Not},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileOptions(pub u32);

impl FileOptions {
    pub const NONE: FileOptions = FileOptions(0);
    pub const OVERWRITE_PROMPT: FileOptions = FileOptions(0x2);
    pub const STRICT_FILE_TYPES: FileOptions = FileOptions(0x4);
    pub const NO_CHANGE_DIR: FileOptions = FileOptions(0x8);
    pub const PICK_FOLDERS: FileOptions = FileOptions(0x20);
    pub const FORCE_FILE_SYSTEM: FileOptions = FileOptions(0x40);
    pub const ALL_NON_STORAGE_ITEMS: FileOptions = FileOptions(0x80);
    pub const NO_VALIDATE: FileOptions = FileOptions(0x100);
    pub const ALLOW_MULTISELECT: FileOptions = FileOptions(0x200);
    pub const PATH_MUST_EXIST: FileOptions = FileOptions(0x800);
    pub const FILE_MUST_EXIST: FileOptions = FileOptions(0x1000);
    pub const CREATE_PROMPT: FileOptions = FileOptions(0x2000);
    pub const SHARE_AWARE: FileOptions = FileOptions(0x4000);
    pub const NO_READONLY_RETURN: FileOptions = FileOptions(0x8000);
    pub const NO_TEST_FILE_CREATE: FileOptions = FileOptions(0x10000);
    pub const HIDE_MRU_PLACES: FileOptions = FileOptions(0x20000);
    pub const HIDE_PINNED_PLACES: FileOptions = FileOptions(0x40000);
    pub const NO_DEREFERENCE_LINKS: FileOptions = FileOptions(0x100000);
    pub const OK_BUTTON_NEEDS_INTERACTION: FileOptions = FileOptions(0x200000);
    pub const DONT_ADD_TO_RECENT: FileOptions = FileOptions(0x2000000);
    pub const FORCE_SHOW_HIDDEN: FileOptions = FileOptions(0x10000000);
    pub const DEFAULT_NO_MINI_MODE: FileOptions = FileOptions(0x20000000);
    pub const FORCE_PREVIEW_PANE_ON: FileOptions = FileOptions(0x40000000);
    pub const SUPPORT_STREAMABLE_ITEMS: FileOptions = FileOptions(0x80000000);

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn contains(self, other: FileOptions) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: FileOptions) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: FileOptions) {
        self.0 &= !other.0;
    }

    pub fn set(&mut self, other: FileOptions, enabled: bool) {
        if enabled {
            self.insert(other)
        } else {
            self.remove(other)
        }
    }

    /// Names of the known flags that are set, in bit order.
    pub fn names(self) -> impl Iterator<Item = &'static str> {
        DialogOption::ALL
            .into_iter()
            .filter(move |option| self.contains(option.flag()))
            .map(DialogOption::name)
    }
}

impl BitOr for FileOptions {
    type Output = FileOptions;

    fn bitor(self, rhs: FileOptions) -> FileOptions {
        FileOptions(self.0 | rhs.0)
    }
}

impl BitOrAssign for FileOptions {
    fn bitor_assign(&mut self, rhs: FileOptions) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for FileOptions {
    type Output = FileOptions;

    fn bitand(self, rhs: FileOptions) -> FileOptions {
        FileOptions(self.0 & rhs.0)
    }
}

impl Not for FileOptions {
    type Output = FileOptions;

    fn not(self) -> FileOptions {
        FileOptions(!self.0)
    }
}

impl fmt::Debug for FileOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FileOptions(0x{:08X}", self.0)?;
        let mut names = self.names().peekable();
        if names.peek().is_some() {
            f.write_str(": ")?;
            for (i, name) in names.enumerate() {
                if i > 0 {
                    f.write_str(" | ")?;
                }
                f.write_str(name)?;
            }
        }
        f.write_str(")")
    }
}

#[cfg(windows)]
impl From<FileOptions> for windows::Win32::UI::Shell::FILEOPENDIALOGOPTIONS {
    fn from(options: FileOptions) -> Self {
        windows::Win32::UI::Shell::FILEOPENDIALOGOPTIONS(options.0)
    }
}

#[cfg(windows)]
impl From<windows::Win32::UI::Shell::FILEOPENDIALOGOPTIONS> for FileOptions {
    fn from(options: windows::Win32::UI::Shell::FILEOPENDIALOGOPTIONS) -> Self {
        FileOptions(options.0)
    }
}

/// One named `FOS_*` flag.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DialogOption {
    OverwritePrompt,
    StrictFileTypes,
    NoChangeDir,
    PickFolders,
    ForceFileSystem,
    AllNonStorageItems,
    NoValidate,
    AllowMultiselect,
    PathMustExist,
    FileMustExist,
    CreatePrompt,
    ShareAware,
    NoReadonlyReturn,
    NoTestFileCreate,
    HideMruPlaces,
    HidePinnedPlaces,
    NoDereferenceLinks,
    OkButtonNeedsInteraction,
    DontAddToRecent,
    ForceShowHidden,
    DefaultNoMiniMode,
    ForcePreviewPaneOn,
    SupportStreamableItems,
}

impl DialogOption {
    pub const ALL: [DialogOption; 23] = [
        DialogOption::OverwritePrompt,
        DialogOption::StrictFileTypes,
        DialogOption::NoChangeDir,
        DialogOption::PickFolders,
        DialogOption::ForceFileSystem,
        DialogOption::AllNonStorageItems,
        DialogOption::NoValidate,
        DialogOption::AllowMultiselect,
        DialogOption::PathMustExist,
        DialogOption::FileMustExist,
        DialogOption::CreatePrompt,
        DialogOption::ShareAware,
        DialogOption::NoReadonlyReturn,
        DialogOption::NoTestFileCreate,
        DialogOption::HideMruPlaces,
        DialogOption::HidePinnedPlaces,
        DialogOption::NoDereferenceLinks,
        DialogOption::OkButtonNeedsInteraction,
        DialogOption::DontAddToRecent,
        DialogOption::ForceShowHidden,
        DialogOption::DefaultNoMiniMode,
        DialogOption::ForcePreviewPaneOn,
        DialogOption::SupportStreamableItems,
    ];

    pub const fn flag(self) -> FileOptions {
        use DialogOption::*;
        match self {
            OverwritePrompt => FileOptions::OVERWRITE_PROMPT,
            StrictFileTypes => FileOptions::STRICT_FILE_TYPES,
            NoChangeDir => FileOptions::NO_CHANGE_DIR,
            PickFolders => FileOptions::PICK_FOLDERS,
            ForceFileSystem => FileOptions::FORCE_FILE_SYSTEM,
            AllNonStorageItems => FileOptions::ALL_NON_STORAGE_ITEMS,
            NoValidate => FileOptions::NO_VALIDATE,
            AllowMultiselect => FileOptions::ALLOW_MULTISELECT,
            PathMustExist => FileOptions::PATH_MUST_EXIST,
            FileMustExist => FileOptions::FILE_MUST_EXIST,
            CreatePrompt => FileOptions::CREATE_PROMPT,
            ShareAware => FileOptions::SHARE_AWARE,
            NoReadonlyReturn => FileOptions::NO_READONLY_RETURN,
            NoTestFileCreate => FileOptions::NO_TEST_FILE_CREATE,
            HideMruPlaces => FileOptions::HIDE_MRU_PLACES,
            HidePinnedPlaces => FileOptions::HIDE_PINNED_PLACES,
            NoDereferenceLinks => FileOptions::NO_DEREFERENCE_LINKS,
            OkButtonNeedsInteraction => FileOptions::OK_BUTTON_NEEDS_INTERACTION,
            DontAddToRecent => FileOptions::DONT_ADD_TO_RECENT,
            ForceShowHidden => FileOptions::FORCE_SHOW_HIDDEN,
            DefaultNoMiniMode => FileOptions::DEFAULT_NO_MINI_MODE,
            ForcePreviewPaneOn => FileOptions::FORCE_PREVIEW_PANE_ON,
            SupportStreamableItems => FileOptions::SUPPORT_STREAMABLE_ITEMS,
        }
    }

    pub const fn name(self) -> &'static str {
        use DialogOption::*;
        match self {
            OverwritePrompt => "overwrite-prompt",
            StrictFileTypes => "strict-file-types",
            NoChangeDir => "no-change-dir",
            PickFolders => "pick-folders",
            ForceFileSystem => "force-file-system",
            AllNonStorageItems => "all-non-storage-items",
            NoValidate => "no-validate",
            AllowMultiselect => "allow-multiselect",
            PathMustExist => "path-must-exist",
            FileMustExist => "file-must-exist",
            CreatePrompt => "create-prompt",
            ShareAware => "share-aware",
            NoReadonlyReturn => "no-readonly-return",
            NoTestFileCreate => "no-test-file-create",
            HideMruPlaces => "hide-mru-places",
            HidePinnedPlaces => "hide-pinned-places",
            NoDereferenceLinks => "no-dereference-links",
            OkButtonNeedsInteraction => "ok-button-needs-interaction",
            DontAddToRecent => "dont-add-to-recent",
            ForceShowHidden => "force-show-hidden",
            DefaultNoMiniMode => "default-no-mini-mode",
            ForcePreviewPaneOn => "force-preview-pane-on",
            SupportStreamableItems => "support-streamable-items",
        }
    }
}

impl fmt::Display for DialogOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DialogOption {
    type Err = Error;

    fn from_str(s: &str) -> Result<DialogOption> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        let wanted = wanted.strip_prefix("fos-").unwrap_or(&wanted);
        DialogOption::ALL
            .into_iter()
            .find(|option| option.name() == wanted || option.name().replace('-', "") == wanted)
            .ok_or_else(|| Error::InvalidOption(s.to_owned()))
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OptionState {
    #[default]
    Default,
    Enabled,
    Disabled,
}

/// Per-option overrides applied on top of whatever the dialog reports from `GetOptions`.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionToggles(BTreeMap<DialogOption, OptionState>);

impl OptionToggles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enable(&mut self, option: DialogOption) -> &mut Self {
        self.0.insert(option, OptionState::Enabled);
        self
    }

    pub fn disable(&mut self, option: DialogOption) -> &mut Self {
        self.0.insert(option, OptionState::Disabled);
        self
    }

    pub fn reset(&mut self, option: DialogOption) -> &mut Self {
        self.0.remove(&option);
        self
    }

    pub fn state(&self, option: DialogOption) -> OptionState {
        self.0.get(&option).copied().unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(|state| *state == OptionState::Default)
    }

    /// Later entries win; the map is keyed so each option appears once.
    pub fn merge(&mut self, other: &OptionToggles) {
        for (option, state) in &other.0 {
            self.0.insert(*option, *state);
        }
    }

    pub fn apply(&self, base: FileOptions) -> FileOptions {
        let mut options = base;
        for (option, state) in &self.0 {
            match state {
                OptionState::Default => {}
                OptionState::Enabled => options.insert(option.flag()),
                OptionState::Disabled => options.remove(option.flag()),
            }
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_option_has_a_distinct_bit() {
        let mut seen = FileOptions::NONE;
        for option in DialogOption::ALL {
            let flag = option.flag();
            assert_eq!(flag.bits().count_ones(), 1, "{option}");
            assert!(!seen.contains(flag), "{option} overlaps");
            seen |= flag;
        }
    }

    #[test]
    fn names_round_trip() {
        for option in DialogOption::ALL {
            assert_eq!(option.name().parse::<DialogOption>().unwrap(), option);
        }
        assert_eq!(
            "FOS_ALLOWMULTISELECT".parse::<DialogOption>().unwrap(),
            DialogOption::AllowMultiselect
        );
        assert_eq!(
            "force_show_hidden".parse::<DialogOption>().unwrap(),
            DialogOption::ForceShowHidden
        );
        assert!(matches!(
            "multi".parse::<DialogOption>(),
            Err(Error::InvalidOption(_))
        ));
    }

    #[test]
    fn set_and_remove() {
        let mut options = FileOptions::PATH_MUST_EXIST | FileOptions::FILE_MUST_EXIST;
        options.set(FileOptions::ALLOW_MULTISELECT, true);
        assert!(options.contains(FileOptions::ALLOW_MULTISELECT));
        options.set(FileOptions::FILE_MUST_EXIST, false);
        assert!(!options.contains(FileOptions::FILE_MUST_EXIST));
        assert_eq!(
            options.bits(),
            FileOptions::PATH_MUST_EXIST.bits() | FileOptions::ALLOW_MULTISELECT.bits()
        );
        assert_eq!(
            options & !FileOptions::PATH_MUST_EXIST,
            FileOptions::ALLOW_MULTISELECT
        );
    }

    #[test]
    fn debug_lists_flag_names() {
        let options = FileOptions::NO_CHANGE_DIR | FileOptions::PICK_FOLDERS;
        assert_eq!(
            format!("{options:?}"),
            "FileOptions(0x00000028: no-change-dir | pick-folders)"
        );
        assert_eq!(format!("{:?}", FileOptions::NONE), "FileOptions(0x00000000)");
    }

    #[test]
    fn toggles_apply_tri_state() {
        let base = FileOptions::OVERWRITE_PROMPT | FileOptions::NO_CHANGE_DIR;
        let mut toggles = OptionToggles::new();
        toggles
            .enable(DialogOption::ForceShowHidden)
            .disable(DialogOption::OverwritePrompt);
        assert_eq!(toggles.state(DialogOption::ShareAware), OptionState::Default);

        let applied = toggles.apply(base);
        assert!(applied.contains(FileOptions::FORCE_SHOW_HIDDEN));
        assert!(!applied.contains(FileOptions::OVERWRITE_PROMPT));
        assert!(applied.contains(FileOptions::NO_CHANGE_DIR));

        toggles.reset(DialogOption::OverwritePrompt);
        assert!(toggles.apply(base).contains(FileOptions::OVERWRITE_PROMPT));
    }

    #[test]
    fn toggles_merge_and_serde() {
        let mut preset = OptionToggles::new();
        preset.enable(DialogOption::ShareAware);
        let mut cli = OptionToggles::new();
        cli.disable(DialogOption::ShareAware).enable(DialogOption::DontAddToRecent);
        preset.merge(&cli);
        assert_eq!(preset.state(DialogOption::ShareAware), OptionState::Disabled);

        let json = serde_json::to_string(&preset).unwrap();
        assert_eq!(json, r#"{"share-aware":"disabled","dont-add-to-recent":"enabled"}"#);
        let back: OptionToggles = serde_json::from_str(&json).unwrap();
        assert_eq!(back, preset);
    }
}
