use crate::errors::CliError;
use crate::utils::Workspace;
use crate::{println_pad, ProjectArgs};
use colored::Colorize;
use miette::{IntoDiagnostic, Result, WrapErr};
use thing_build::{
    BuildFailure, BuildMode, BuildOutcome, BuildPipeline, BuildProgress, BuildReport, BuildStage,
    CommandBundler,
};
use thing_project::ProjectLock;

#[derive(Debug)]
pub struct BuildProjectArgs {
    pub project: ProjectArgs,
    pub debug: bool,
    pub no_open: bool,
}

pub fn build_project(args: BuildProjectArgs) -> Result<()> {
    let workspace = Workspace::open(&args.project)?;
    let project = &workspace.project;
    let command = project
        .desc
        .bundler
        .clone()
        .ok_or_else(|| CliError::no_bundler(&project.desc.name))?;
    let mode = BuildMode::from_debug(args.debug);

    println!(
        "{} {} {}",
        "🔨 Building project:".bright_blue().bold(),
        project.desc.name.bright_cyan().bold(),
        format!("({})", mode).dimmed()
    );

    let mut fs = workspace.open_fs()?;
    let mut bundler = CommandBundler::new(workspace.root.clone(), command);
    let report = BuildPipeline::new(project, mode, ProjectLock::new())
        .with_progress(print_stage)
        .run(&mut fs, &mut bundler)
        .into_diagnostic()
        .wrap_err("Build aborted")?;

    print_report(&report);

    match report.outcome {
        BuildOutcome::Success { url } => {
            println!(
                "{} {}",
                "✅ Build finished:".bright_green().bold(),
                url.bright_white().underline()
            );
            if !args.no_open {
                if let Err(e) = webbrowser::open(&url) {
                    tracing::warn!("Failed to open browser: {}", e);
                }
            }
            Ok(())
        }
        BuildOutcome::Failed(failure) => {
            Err(CliError::BuildFailed {
                location: describe_location(&failure),
                message: failure.message,
            }
            .into())
        }
    }
}

fn print_stage(progress: BuildProgress) {
    let label = match progress.stage {
        BuildStage::Validating => "Validating localization",
        BuildStage::Analyzing => "Analyzing dependencies",
        BuildStage::WritingManifests => "Writing manifests",
        BuildStage::Bundling => "Running bundler",
        BuildStage::Complete => return,
    };
    println_pad!("{} {}", "•".bright_cyan(), label.bright_white());
}

fn print_report(report: &BuildReport) {
    println_pad!(
        "{} {} preloader, {} main, {} excluded",
        "📦 Assets:".bright_magenta().bold(),
        report.preloader_assets.to_string().bright_white().bold(),
        report.main_assets.to_string().bright_white().bold(),
        report.excluded_assets.to_string().dimmed()
    );
    println_pad!(
        "{} {} retained, {} pruned",
        "🧩 Classes:".bright_magenta().bold(),
        report.retained_classes.len().to_string().bright_white().bold(),
        report.pruned_classes.len().to_string().dimmed()
    );
    for warning in &report.warnings {
        println_pad!("{} {}", "⚠".bright_yellow(), warning.yellow());
    }
    println_pad!(
        "{}",
        format!("Finished in {:.2}s", report.build_time.as_secs_f64()).dimmed()
    );
}

fn describe_location(failure: &BuildFailure) -> String {
    if let Some(location) = &failure.location {
        return format!("Error at {}", location);
    }
    match failure.file_link() {
        Some(file) => format!("See {}", file),
        None => "The bundler did not report a source location".to_string(),
    }
}
