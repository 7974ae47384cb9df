use crate::utils::Workspace;
use crate::{println_pad, ProjectArgs};
use colored::Colorize;
use miette::{IntoDiagnostic, Result};
use thing_l10n::LocalizationStore;
use thing_project::{AssetKind, ProjectFs};

const KINDS: [AssetKind; 7] = [
    AssetKind::Scene,
    AssetKind::Prefab,
    AssetKind::Class,
    AssetKind::Image,
    AssetKind::Sound,
    AssetKind::Resource,
    AssetKind::L10n,
];

pub fn info_project(args: &ProjectArgs) -> Result<()> {
    let workspace = Workspace::open(args)?;
    let project = &workspace.project;
    let desc = &project.desc;
    let fs = workspace.open_fs()?;

    println_pad!(
        "{} {}",
        "🎮 Project:".bright_blue().bold(),
        desc.name.bright_cyan().bold()
    );
    println_pad!("{} {}", "📁 Directory:".bright_green(), project.dir.as_str().bright_white());
    println_pad!(
        "{} {}",
        "🔊 Sound formats:".bright_yellow(),
        desc.sound_formats.join(", ").bright_white()
    );
    println_pad!(
        "{} {}",
        "🚀 Preloader scene:".bright_yellow(),
        desc.preloader_scene.bright_white()
    );
    match &desc.bundler {
        Some(bundler) => println_pad!(
            "{} {} {}",
            "🔨 Bundler:".bright_yellow(),
            bundler.command.bright_white(),
            bundler.args.join(" ").dimmed()
        ),
        None => println_pad!("{} {}", "🔨 Bundler:".bright_yellow(), "(not set)".bright_yellow()),
    }

    println_pad!("\n{}", "🗂️  Asset folders:".bright_magenta().bold());
    for folder in project.asset_folders() {
        println_pad!(
            "   {} {} {}",
            "•".bright_cyan(),
            folder.path.as_str().bright_cyan().bold(),
            format!("({})", folder.origin).dimmed()
        );
    }

    println_pad!("\n{}", "🧾 Assets:".bright_magenta().bold());
    for kind in KINDS {
        let count = fs.list_assets(Some(kind)).len();
        println_pad!(
            "   {} {} {}",
            "•".bright_cyan(),
            format!("{}:", kind).bright_white(),
            count.to_string().bright_white().bold()
        );
    }

    let store = LocalizationStore::load(&fs, project).into_diagnostic()?;
    println_pad!("\n{}", "🌐 Localization:".bright_magenta().bold());
    println_pad!(
        "   {} {}",
        "Languages:".bright_white(),
        store.languages().join(", ").bright_cyan()
    );
    for directory in store.directories() {
        println_pad!("   {} {}", "•".bright_cyan(), directory.bright_white());
    }

    Ok(())
}
