use std::{fmt::Display, path::PathBuf, process::ExitCode, str::FromStr};

use clap::{Args, Parser, Subcommand};
use log::error;
use shelldialog::{
    logging::{self, Verbosity},
    DialogConfig, DialogKind, DialogOption, FileFilter, Guid, HResult, Place, PlacePosition,
};

#[derive(Parser, Debug)]
#[command(name = "shelldialog", version, about = "Shows the Windows Shell file dialogs")]
struct Cli {
    /// quiet, error, warn, info, debug or trace
    #[arg(long, value_name = "LEVEL", default_value = "warn", global = true)]
    log_level: Verbosity,

    /// Also write the log to this file
    #[arg(long, value_name = "FILE", global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Pick one or more existing files
    Open {
        #[command(flatten)]
        dialog: DialogArgs,
        /// Allow selecting several items
        #[arg(long)]
        multi: bool,
    },
    /// Choose a file name to save to
    Save {
        #[command(flatten)]
        dialog: DialogArgs,
    },
    /// Pick one or more folders
    Folder {
        #[command(flatten)]
        dialog: DialogArgs,
        #[arg(long)]
        multi: bool,
    },
    /// Explain HRESULT values (hex or decimal)
    Decode {
        #[arg(required = true, allow_negative_numbers = true, value_parser = parse_hresult)]
        values: Vec<HResult>,
    },
}

#[derive(Args, Debug, Default)]
struct DialogArgs {
    /// JSON preset; the options below override it
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    ok_label: Option<String>,
    #[arg(long)]
    file_name_label: Option<String>,
    #[arg(long)]
    file_name: Option<String>,
    #[arg(long, value_name = "EXT")]
    default_extension: Option<String>,
    /// Folder to open in, even if another one was used last time
    #[arg(long, value_name = "DIR")]
    folder: Option<PathBuf>,
    /// Folder to open in when there is no recently used one
    #[arg(long, value_name = "DIR")]
    default_folder: Option<PathBuf>,
    /// NAME=PATTERNS, e.g. "Images=*.png;*.jpg"; repeatable
    #[arg(long = "filter", value_name = "NAME=SPEC", value_parser = parse_with::<FileFilter>)]
    filters: Vec<FileFilter>,
    /// 1-based index of the filter selected initially
    #[arg(long, value_name = "N")]
    type_index: Option<u32>,
    /// Dialog option to switch on, e.g. force-show-hidden; repeatable
    #[arg(long = "enable", value_name = "OPTION", value_parser = parse_with::<DialogOption>)]
    enable: Vec<DialogOption>,
    /// Dialog option to switch off; repeatable
    #[arg(long = "disable", value_name = "OPTION", value_parser = parse_with::<DialogOption>)]
    disable: Vec<DialogOption>,
    #[arg(long)]
    force_file_system: bool,
    #[arg(long, value_name = "GUID", value_parser = parse_with::<Guid>)]
    client_guid: Option<Guid>,
    /// Extra folder for the navigation pane; repeatable
    #[arg(long = "place", value_name = "DIR")]
    places: Vec<PathBuf>,
    /// Print display name, attributes and parent for each item
    #[arg(long)]
    details: bool,
}

fn parse_with<T>(text: &str) -> Result<T, String>
where
    T: FromStr,
    T::Err: Display,
{
    text.parse().map_err(|err: T::Err| err.to_string())
}

fn parse_hresult(text: &str) -> Result<HResult, String> {
    HResult::parse(text).ok_or_else(|| format!("not an HRESULT: {text:?}"))
}

impl DialogArgs {
    fn into_config(self, kind: DialogKind, multi: bool) -> shelldialog::Result<DialogConfig> {
        let mut config = match &self.config {
            Some(path) => DialogConfig::load(path)?,
            None => DialogConfig::new(kind),
        };
        config.kind = kind;

        macro_rules! overlay {
            ($($field:ident <- $arg:ident),* $(,)?) => {
                $(if let Some(value) = self.$arg {
                    config.$field = Some(value);
                })*
            };
        }
        overlay!(
            title <- title,
            ok_button_label <- ok_label,
            file_name_label <- file_name_label,
            file_name <- file_name,
            default_extension <- default_extension,
            folder <- folder,
            default_folder <- default_folder,
            file_type_index <- type_index,
            client_guid <- client_guid,
        );

        if !self.filters.is_empty() {
            config.filters = self.filters;
        }
        for option in self.enable {
            config.options.enable(option);
        }
        for option in self.disable {
            config.options.disable(option);
        }
        config.places.extend(self.places.into_iter().map(|path| Place {
            path,
            position: PlacePosition::Bottom,
        }));
        config.multiselect |= multi;
        config.force_file_system |= self.force_file_system;

        config.validate()?;
        Ok(config)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(err) = logging::init(cli.log_level, cli.log_file.as_deref()) {
        eprintln!("{err}");
    }

    let (dialog, kind, multi) = match cli.command {
        Command::Decode { values } => {
            for (i, value) in values.iter().enumerate() {
                if i > 0 {
                    println!();
                }
                println!("{}", value.decode());
            }
            return ExitCode::SUCCESS;
        }
        Command::Open { dialog, multi } => (dialog, DialogKind::Open, multi),
        Command::Save { dialog } => (dialog, DialogKind::Save, false),
        Command::Folder { dialog, multi } => (dialog, DialogKind::Folder, multi),
    };

    let details = dialog.details;
    let config = match dialog.into_config(kind, multi) {
        Ok(config) => config,
        Err(err) => {
            error!("{err}");
            eprintln!("{err}");
            return ExitCode::from(2);
        }
    };

    show(&config, details)
}

#[cfg(windows)]
fn show(config: &DialogConfig, details: bool) -> ExitCode {
    use shelldialog::Selection;

    match shelldialog::run(config, None) {
        Ok(Selection::Cancelled) => ExitCode::from(1),
        Ok(Selection::Items(items)) => {
            for item in items {
                match &item.path {
                    Some(path) => println!("{}", path.display()),
                    None => println!("{}", item.display_name),
                }
                if details {
                    println!("  name: {}", item.display_name);
                    println!("  attributes: {}", item.attributes);
                    if let Some(parent) = &item.parent {
                        println!("  parent: {parent}");
                    }
                }
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{err}");
            eprintln!("{err}");
            ExitCode::from(2)
        }
    }
}

#[cfg(not(windows))]
fn show(config: &DialogConfig, _details: bool) -> ExitCode {
    eprintln!("the {} dialog is only available on Windows", config.kind);
    ExitCode::from(2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelldialog::OptionState;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("shelldialog").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn open_arguments_become_config() {
        let cli = parse(&[
            "open",
            "--title",
            "Pick sources",
            "--filter",
            "Rust=*.rs",
            "--filter",
            "All=*.*",
            "--type-index",
            "2",
            "--enable",
            "force-show-hidden",
            "--disable",
            "no-change-dir",
            "--multi",
        ]);
        let Command::Open { dialog, multi } = cli.command else {
            panic!("expected open");
        };
        let config = dialog.into_config(DialogKind::Open, multi).unwrap();
        assert_eq!(config.title.as_deref(), Some("Pick sources"));
        assert_eq!(config.filters.len(), 2);
        assert_eq!(config.filters[0].spec, "*.rs");
        assert_eq!(config.file_type_index, Some(2));
        assert!(config.multiselect);
        assert_eq!(config.options.state(DialogOption::ForceShowHidden), OptionState::Enabled);
        assert_eq!(config.options.state(DialogOption::NoChangeDir), OptionState::Disabled);
    }

    #[test]
    fn command_line_overrides_preset() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preset.json");
        let mut preset = DialogConfig::new(DialogKind::Save);
        preset.title = Some("From preset".into());
        preset.ok_button_label = Some("Export".into());
        preset.filters = vec![FileFilter::new("CSV", "*.csv").unwrap()];
        preset.save(&path).unwrap();

        let cli = parse(&[
            "save",
            "--config",
            path.to_str().unwrap(),
            "--title",
            "From command line",
        ]);
        let Command::Save { dialog } = cli.command else {
            panic!("expected save");
        };
        let config = dialog.into_config(DialogKind::Save, false).unwrap();
        assert_eq!(config.title.as_deref(), Some("From command line"));
        assert_eq!(config.ok_button_label.as_deref(), Some("Export"));
        assert_eq!(config.filters[0].name, "CSV");
    }

    #[test]
    fn invalid_values_are_rejected_by_the_parser() {
        let args = ["shelldialog", "open", "--enable", "turbo-mode"];
        assert!(Cli::try_parse_from(args).is_err());
        let args = ["shelldialog", "open", "--client-guid", "1234"];
        assert!(Cli::try_parse_from(args).is_err());
        let args = ["shelldialog", "decode", "bogus"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn decode_accepts_hex_and_decimal() {
        let cli = parse(&["--log-level", "quiet", "decode", "0x800704C7", "-2147467262"]);
        let Command::Decode { values } = cli.command else {
            panic!("expected decode");
        };
        assert_eq!(values, [HResult::CANCELLED, HResult::E_NOINTERFACE]);
    }

    #[test]
    fn decode_takes_a_lone_negative_value() {
        let args = ["shelldialog", "decode", "-2147023673"];
        let Command::Decode { values } = Cli::try_parse_from(args).unwrap().command else {
            panic!("expected decode");
        };
        assert_eq!(values, [HResult::CANCELLED]);

        let args = ["shelldialog", "decode", "-2147467262", "-2147024809", "0x80004005"];
        let Command::Decode { values } = Cli::try_parse_from(args).unwrap().command else {
            panic!("expected decode");
        };
        assert_eq!(
            values,
            [HResult::E_NOINTERFACE, HResult::E_INVALIDARG, HResult::E_FAIL]
        );
    }

    #[test]
    fn folder_with_filters_is_invalid() {
        let cli = parse(&["folder", "--filter", "*.txt"]);
        let Command::Folder { dialog, multi } = cli.command else {
            panic!("expected folder");
        };
        assert!(dialog.into_config(DialogKind::Folder, multi).is_err());
    }
}
