use crate::errors::CliError;
use crate::utils::Workspace;
use crate::{println_pad, ProjectArgs};
use camino::Utf8PathBuf;
use clap::Subcommand;
use colored::Colorize;
use miette::{IntoDiagnostic, Result};
use thing_l10n::{CellRef, LocalizationSession, TYPINGS_PATH};
use thing_project::{DiskFs, ProjectLock};

#[derive(Subcommand, Debug)]
pub enum L10nCommand {
    /// List the keys of a localization folder with their texts
    Keys {
        /// Localization folder, e.g. `games/demo/assets/i18n`
        #[arg(short, long)]
        folder: Option<String>,

        /// Only show keys whose id or text contains this, ignoring case
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Add a key with empty texts to every language of a folder
    AddKey {
        key: String,

        #[arg(short, long)]
        folder: Option<String>,
    },
    /// Rename a key in every language of a folder
    RenameKey {
        old_key: String,
        new_key: String,

        #[arg(short, long)]
        folder: Option<String>,
    },
    /// Delete a key from every language of a folder
    DeleteKey {
        key: String,

        #[arg(short, long)]
        folder: Option<String>,
    },
    /// Set the text of a key; the key is looked up in every folder and
    /// created in the current one when missing
    Set {
        key: String,
        language: String,
        text: String,

        #[arg(short, long)]
        folder: Option<String>,
    },
    /// Create files for a new language in every folder
    AddLanguage { language: String },
    /// Create a new localization folder
    AddFolder {
        /// Sub directory of the asset folder that receives the `i18n` folder
        #[arg(default_value = "")]
        group: String,

        /// Asset folder to create it in (defaults to the project's)
        #[arg(short, long)]
        assets: Option<String>,
    },
    /// Print the suggested id for a new key
    SuggestKey {
        #[arg(short, long)]
        folder: Option<String>,
    },
    /// Check that every translation uses the same placeholders
    Validate,
    /// Regenerate the key typings for a language
    Typings {
        #[arg(short, long)]
        language: Option<String>,
    },
}

trait L10nResultExt<T> {
    fn l10n_diagnostic(self) -> Result<T>;
}

impl<T> L10nResultExt<T> for thing_l10n::Result<T> {
    fn l10n_diagnostic(self) -> Result<T> {
        match self {
            Ok(value) => Ok(value),
            Err(thing_l10n::Error::Rejected(rejection)) => Err(CliError::Rejected {
                reason: rejection.to_string(),
            }
            .into()),
            Err(e) => Err(e).into_diagnostic(),
        }
    }
}

pub fn run_l10n(args: &ProjectArgs, command: L10nCommand) -> Result<()> {
    let workspace = Workspace::open(args)?;
    let mut fs = workspace.open_fs()?;
    let mut session = LocalizationSession::open(&mut fs, &workspace.project, ProjectLock::new())
        .l10n_diagnostic()?;

    run_command(&workspace, &mut fs, &mut session, command)?;

    let written = session.flush(&mut fs).l10n_diagnostic()?;
    if written > 0 {
        println_pad!(
            "{} {} files",
            "💾 Saved".bright_green().bold(),
            written.to_string().bright_white()
        );
    }
    Ok(())
}

fn run_command(
    workspace: &Workspace,
    fs: &mut DiskFs,
    session: &mut LocalizationSession,
    command: L10nCommand,
) -> Result<()> {
    let language = session.store().current_language().to_string();

    match command {
        L10nCommand::Keys { folder, search } => {
            select_folder(session, folder.as_deref())?;
            let view = session.store().view().l10n_diagnostic()?;
            println_pad!("{} {}", "🌐 Folder:".bright_blue().bold(), view.directory.bright_cyan());
            for key in view.filter(search.as_deref().unwrap_or_default()) {
                println_pad!("   {} {}", "•".bright_cyan(), key.bright_white().bold());
                for lang in view.languages() {
                    let text = view.text(lang, key).unwrap_or_default();
                    println_pad!("       {} {}", format!("{}:", lang).dimmed(), text);
                }
            }
        }
        L10nCommand::AddKey { key, folder } => {
            select_folder(session, folder.as_deref())?;
            let cell = session.add_key(&key, &language).l10n_diagnostic()?;
            println_pad!(
                "{} {} {}",
                "➕ Added key".bright_green().bold(),
                cell.key.bright_white(),
                format!("({})", cell.directory).dimmed()
            );
        }
        L10nCommand::RenameKey {
            old_key,
            new_key,
            folder,
        } => {
            select_folder(session, folder.as_deref())?;
            session.rename_key(&old_key, &new_key).l10n_diagnostic()?;
            println_pad!(
                "{} {} → {}",
                "✏️  Renamed".bright_green().bold(),
                old_key.dimmed(),
                new_key.bright_white()
            );
        }
        L10nCommand::DeleteKey { key, folder } => {
            select_folder(session, folder.as_deref())?;
            session.delete_key(&key).l10n_diagnostic()?;
            println_pad!("{} {}", "🗑️  Deleted".bright_green().bold(), key.bright_white());
        }
        L10nCommand::Set {
            key,
            language,
            text,
            folder,
        } => {
            let cell = match folder {
                Some(folder) => {
                    let folder = folder.trim_end_matches('/').to_string();
                    select_folder(session, Some(&folder))?;
                    CellRef {
                        directory: folder,
                        language,
                        key,
                    }
                }
                None => session.edit_key(&key, &language).l10n_diagnostic()?,
            };
            session
                .set_cell_value(&cell.directory, &cell.language, &cell.key, &text)
                .l10n_diagnostic()?;
            println_pad!(
                "{} {} {}",
                "✏️  Updated".bright_green().bold(),
                format!("{}.{}", cell.language, cell.key).bright_white(),
                format!("({})", cell.directory).dimmed()
            );
        }
        L10nCommand::AddLanguage { language } => {
            let created = session.add_language(fs, &language).l10n_diagnostic()?;
            for file in created {
                println_pad!("{} {}", "📄 Created".bright_green().bold(), file.as_str().bright_white());
            }
        }
        L10nCommand::AddFolder { group, assets } => {
            let assets = assets
                .map(Utf8PathBuf::from)
                .unwrap_or_else(|| workspace.project.assets_dir());
            let directory = session.add_directory(fs, &assets, &group).l10n_diagnostic()?;
            println_pad!("{} {}", "📁 Created".bright_green().bold(), directory.bright_white());
        }
        L10nCommand::SuggestKey { folder } => {
            select_folder(session, folder.as_deref())?;
            println!("{}", session.suggest_new_key());
        }
        L10nCommand::Validate => {
            let warnings = session.validate_template_consistency();
            if warnings.is_empty() {
                println_pad!("{}", "✓ All placeholders match".bright_green());
            }
            for warning in warnings {
                println_pad!("{} {}", "⚠".bright_yellow(), warning.to_string().yellow());
            }
        }
        L10nCommand::Typings { language } => {
            if let Some(language) = language {
                session.set_current_language(fs, &language).l10n_diagnostic()?;
            }
            println_pad!(
                "{} {} {}",
                "📝 Typings written:".bright_green().bold(),
                TYPINGS_PATH.bright_white(),
                format!("({})", session.store().current_language()).dimmed()
            );
        }
    }
    Ok(())
}

fn select_folder(session: &mut LocalizationSession, folder: Option<&str>) -> Result<()> {
    match folder {
        Some(folder) => session
            .set_current_directory(folder.trim_end_matches('/'))
            .l10n_diagnostic(),
        None => Ok(()),
    }
}
