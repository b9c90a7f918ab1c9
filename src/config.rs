//! Dialog presets.
//!
//! A preset describes one dialog completely and can be stored as JSON:
//!
//! ```json
//! {
//!   "version": 1,
//!   "kind": "save",
//!   "title": "Export report",
//!   "filters": [{ "name": "CSV", "spec": "*.csv" }],
//!   "options": { "overwrite-prompt": "enabled" }
//! }
//! ```

use std::{fs, path::Path, path::PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    filter::FileFilter,
    guid::Guid,
    options::OptionToggles,
    types::{DialogKind, PlacePosition},
};

pub const CONFIG_VERSION: u32 = 1;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogConfig {
    pub version: u32,
    pub kind: DialogKind,
    pub title: Option<String>,
    pub ok_button_label: Option<String>,
    pub file_name_label: Option<String>,
    /// Initial text of the file name box.
    pub file_name: Option<String>,
    pub default_extension: Option<String>,
    /// Folder the dialog opens in, overriding the most recently used one.
    pub folder: Option<PathBuf>,
    /// Folder used only when there is no recently used one.
    pub default_folder: Option<PathBuf>,
    pub filters: Vec<FileFilter>,
    /// 1-based index into `filters`.
    pub file_type_index: Option<u32>,
    pub multiselect: bool,
    pub force_file_system: bool,
    pub options: OptionToggles,
    /// Lets the dialog keep its persisted state (size, last folder) apart from other callers.
    pub client_guid: Option<Guid>,
    pub places: Vec<Place>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Place {
    pub path: PathBuf,
    #[serde(default)]
    pub position: PlacePosition,
}

impl Default for DialogConfig {
    fn default() -> Self {
        DialogConfig {
            version: CONFIG_VERSION,
            kind: DialogKind::default(),
            title: None,
            ok_button_label: None,
            file_name_label: None,
            file_name: None,
            default_extension: None,
            folder: None,
            default_folder: None,
            filters: vec![],
            file_type_index: None,
            multiselect: false,
            force_file_system: false,
            options: OptionToggles::default(),
            client_guid: None,
            places: vec![],
        }
    }
}

impl DialogConfig {
    pub fn new(kind: DialogKind) -> Self {
        DialogConfig {
            kind,
            ..Default::default()
        }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<DialogConfig> {
        let path = path.as_ref();
        debug!("loading dialog preset from {}", path.display());
        let text = fs::read_to_string(path)?;
        let config: DialogConfig = serde_json::from_str(&text)?;
        if config.version != CONFIG_VERSION {
            return Err(Error::InvalidConfig(format!(
                "unsupported preset version {} (expected {CONFIG_VERSION})",
                config.version
            )));
        }
        config.validate()?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        self.validate()?;
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        debug!("saved dialog preset to {}", path.display());
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        for filter in &self.filters {
            filter.validate()?;
        }
        if let Some(index) = self.file_type_index {
            if self.filters.is_empty() {
                return Err(Error::InvalidConfig(
                    "file_type_index given without filters".into(),
                ));
            }
            if index == 0 || index as usize > self.filters.len() {
                return Err(Error::InvalidConfig(format!(
                    "file_type_index {index} outside 1..={}",
                    self.filters.len()
                )));
            }
        }
        match self.kind {
            DialogKind::Folder if !self.filters.is_empty() => Err(Error::InvalidConfig(
                "folder dialogs do not take file filters".into(),
            )),
            DialogKind::Save if self.multiselect => Err(Error::InvalidConfig(
                "save dialogs cannot select multiple items".into(),
            )),
            _ => Ok(()),
        }
    }

    /// Extension appended by a save dialog when the user types a bare name.
    pub fn effective_default_extension(&self) -> Option<&str> {
        match self.default_extension.as_deref() {
            Some(ext) => Some(ext.trim_start_matches('.')),
            None if self.kind == DialogKind::Save => {
                self.filters.first().and_then(FileFilter::first_extension)
            }
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{DialogOption, OptionState};

    fn sample() -> DialogConfig {
        let mut config = DialogConfig::new(DialogKind::Save);
        config.title = Some("Export report".into());
        config.filters = vec![
            FileFilter::new("CSV", "*.csv").unwrap(),
            FileFilter::all_files(),
        ];
        config.file_type_index = Some(1);
        config.options.enable(DialogOption::OverwritePrompt);
        config.client_guid = Some("{0F3A3B8C-4C1E-4D7A-9A53-2B8E1E2F9C10}".parse().unwrap());
        config.places.push(Place {
            path: PathBuf::from(r"C:\Reports"),
            position: PlacePosition::Top,
        });
        config
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("presets").join("export.json");
        let config = sample();
        config.save(&path).unwrap();
        let loaded = DialogConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let config: DialogConfig = serde_json::from_str(r#"{"kind":"folder"}"#).unwrap();
        assert_eq!(config.kind, DialogKind::Folder);
        assert_eq!(config.version, CONFIG_VERSION);
        assert!(config.filters.is_empty());
        assert!(config.options.is_empty());
    }

    #[test]
    fn reads_hand_written_preset() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(
            &mut file,
            br#"{
                "version": 1,
                "kind": "open",
                "filters": [{ "name": "Text", "spec": "*.txt" }],
                "multiselect": true,
                "options": { "force-show-hidden": "enabled", "no-change-dir": "disabled" },
                "places": [{ "path": "D:\\Shared" }]
            }"#,
        )
        .unwrap();
        let config = DialogConfig::load(file.path()).unwrap();
        assert!(config.multiselect);
        assert_eq!(config.options.state(DialogOption::ForceShowHidden), OptionState::Enabled);
        assert_eq!(config.options.state(DialogOption::NoChangeDir), OptionState::Disabled);
        assert_eq!(config.places[0].position, PlacePosition::Bottom);
    }

    #[test]
    fn rejects_other_versions() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, br#"{"version": 7}"#).unwrap();
        assert!(matches!(
            DialogConfig::load(file.path()),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            DialogConfig::load(dir.path().join("absent.json")),
            Err(Error::Io(_))
        ));
    }

    #[test]
    fn validate_type_index() {
        let mut config = sample();
        config.file_type_index = Some(3);
        assert!(config.validate().is_err());
        config.file_type_index = Some(0);
        assert!(config.validate().is_err());
        config.filters.clear();
        config.file_type_index = Some(1);
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_kind_constraints() {
        let mut folder = DialogConfig::new(DialogKind::Folder);
        folder.filters.push(FileFilter::all_files());
        assert!(folder.validate().is_err());

        let mut save = DialogConfig::new(DialogKind::Save);
        save.multiselect = true;
        assert!(save.validate().is_err());

        let mut open = DialogConfig::new(DialogKind::Open);
        open.multiselect = true;
        assert!(open.validate().is_ok());
    }

    #[test]
    fn default_extension_falls_back_to_first_filter() {
        let config = sample();
        assert_eq!(config.effective_default_extension(), Some("csv"));

        let mut explicit = sample();
        explicit.default_extension = Some(".tsv".into());
        assert_eq!(explicit.effective_default_extension(), Some("tsv"));

        let mut open = sample();
        open.kind = DialogKind::Open;
        assert_eq!(open.effective_default_extension(), None);
    }
}
