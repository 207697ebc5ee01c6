use anyhow::{bail, Context, Result};
use rpmrm_core::RecordOffset;
use rpmrm_db::{DbError, DirectoryDatabase, PackageDatabase};
use rpmrm_uninstall::{uninstall_package, RootLayout, UninstallFlags, UninstallReport};
use tracing::{debug, warn};

use crate::render::{describe_applied, render_status_line, OutputStyle, TerminalRenderer};
use crate::{Cli, Commands};

pub(crate) fn run_cli(cli: Cli) -> Result<()> {
    let layout = RootLayout::new(cli.root);
    let db_dir = cli.dbpath.unwrap_or_else(|| layout.default_db_dir());
    debug!("using database at {}", db_dir.display());
    let mut db = DirectoryDatabase::open(db_dir);
    let renderer = TerminalRenderer::current();

    match cli.command {
        Commands::Erase {
            name,
            offset,
            test,
            noscripts,
            all_matches,
        } => {
            let flags = UninstallFlags {
                test_only: test,
                no_scripts: noscripts,
                debug: cli.debug,
            };
            let targets = resolve_erase_targets(&db, name.as_deref(), offset, all_matches)?;
            for target in targets {
                let report = uninstall_package(&layout, &mut db, target, flags)
                    .with_context(|| format!("failed to erase package record {target}"))?;
                renderer.print_lines(&format_erase_report(&report, flags, renderer.style()));
            }
        }
        Commands::List => {
            renderer.print_section("Installed packages");
            renderer.print_lines(&list_records(&db)?);
        }
    }

    Ok(())
}

pub(crate) fn resolve_erase_targets(
    db: &dyn PackageDatabase,
    name: Option<&str>,
    offset: Option<u32>,
    all_matches: bool,
) -> Result<Vec<RecordOffset>> {
    if let Some(offset) = offset {
        return Ok(vec![RecordOffset::new(offset)]);
    }
    let Some(name) = name else {
        bail!("no package given for erase");
    };

    let mut matches = db
        .find_records_by_name(name)
        .with_context(|| format!("failed to look up package {name}"))?;
    matches.sort();
    match matches.len() {
        0 => bail!("package {name} is not installed"),
        1 => Ok(matches),
        count if all_matches => {
            debug!("erasing {count} instances of {name}");
            Ok(matches)
        }
        count => bail!(
            "\"{name}\" specifies multiple packages ({count}); pass --all-matches to erase them all"
        ),
    }
}

pub(crate) fn list_records(db: &DirectoryDatabase) -> Result<Vec<String>> {
    let mut lines = Vec::new();
    for offset in db.offsets().context("failed to list package records")? {
        let record = match db.get_record(offset) {
            Ok(record) => record,
            Err(err @ DbError::Corrupt { .. }) => {
                warn!("{err}");
                continue;
            }
            Err(err) => {
                return Err(err).with_context(|| format!("failed to read package record {offset}"))
            }
        };
        lines.push(format!(
            "{offset}  {}  {}",
            record.nevr(),
            record.files().len()
        ));
    }
    Ok(lines)
}

pub(crate) fn format_erase_report(
    report: &UninstallReport,
    flags: UninstallFlags,
    style: OutputStyle,
) -> Vec<String> {
    let mut lines = Vec::new();
    if flags.test_only {
        lines.extend(
            report
                .applied
                .iter()
                .map(|applied| render_status_line(style, "step", &describe_applied(applied, true))),
        );
    }

    let verb = if flags.test_only { "would erase" } else { "erased" };
    let summary = match report.issues.len() {
        0 => render_status_line(style, "ok", &format!("{verb} {}", report.nevr)),
        count => render_status_line(
            style,
            "warn",
            &format!("{verb} {} with {count} issue(s)", report.nevr),
        ),
    };
    lines.push(summary);
    lines
}
