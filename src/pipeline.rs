//! Filter run orchestration.
//!
//! Sequences one run end to end: unpack → select field → filter notes →
//! prune media → update collection → pack. Each step either finishes or
//! aborts the run; only media cleanup problems are collected as warnings.

use anyhow::{bail, Result};
use std::path::PathBuf;

use crate::archive;
use crate::config::Config;
use crate::db;
use crate::filter;
use crate::media::MediaManifest;
use crate::progress::{ProgressReporter, StageEvent};
use crate::prune::{self, CleanupWarning};
use crate::schema::{self, FieldSelector};
use crate::update::{self, DeleteCounts, RenamedDeck};
use crate::wordlist;

/// Inputs of one run, as given on the command line.
#[derive(Debug, Clone)]
pub struct FilterJob {
    pub archive: PathBuf,
    pub wordlist: PathBuf,
    /// Output deck name; also the output file stem.
    pub output_name: String,
}

#[derive(Debug)]
pub struct FilterReport {
    pub model: String,
    pub field: String,
    pub notes_scanned: usize,
    pub notes_kept: usize,
    /// `None` when nothing matched and the collection was left whole.
    pub deleted: Option<DeleteCounts>,
    /// Files removed, `None` when no kept note referenced media.
    pub media_removed: Option<usize>,
    pub media_retained: usize,
    pub renamed_deck: Option<RenamedDeck>,
    pub output: PathBuf,
    pub entries_written: usize,
    pub warnings: Vec<CleanupWarning>,
}

pub async fn run_filter(
    config: &Config,
    job: &FilterJob,
    selector: &mut dyn FieldSelector,
    progress: &dyn ProgressReporter,
) -> Result<FilterReport> {
    config.validate()?;
    if job.output_name.trim().is_empty() {
        bail!("output name must not be empty");
    }

    let words = wordlist::load_wordlist(&job.wordlist)?;

    let entries = archive::unpack(&job.archive, &config.work_dir)?;
    println!("Content extracted successfully");
    progress.report(StageEvent::Unpacked { entries });

    let db_path = archive::locate_collection(&config.work_dir, &config.collection_files)?;
    let pool = db::connect(&db_path).await?;

    let model = schema::load_first_model(&pool).await?;
    let field = selector.select(&model)?;
    let field_name = model
        .fields
        .get(field)
        .map(|f| f.name.clone())
        .unwrap_or_else(|| format!("#{}", field + 1));
    println!("Selected field: {}", field_name);

    let notes = filter::load_model_notes(&pool, model.id).await?;
    let manifest_path = config.manifest_path();
    let mut manifest = MediaManifest::load(&manifest_path)?;
    let outcome = filter::filter_notes(&notes, model.id, field, &words, &manifest);
    progress.report(StageEvent::Filtered {
        kept: outcome.kept_note_ids.len(),
        scanned: outcome.notes_scanned,
    });

    let mut warnings = Vec::new();
    let media_removed = if outcome.has_media() {
        let report = prune::prune_media(
            &config.work_dir,
            &manifest_path,
            &mut manifest,
            &outcome.retained_keys(),
            &config.protected_files(),
        )?;
        progress.report(StageEvent::MediaPruned {
            removed: report.removed.len(),
            retained: report.retained,
        });
        warnings.extend(report.warnings);
        Some(report.removed.len())
    } else {
        progress.report(StageEvent::MediaKept);
        None
    };

    let deleted = if outcome.has_matches() {
        let counts = update::delete_unmatched(&pool, &outcome.kept_note_ids).await?;
        progress.report(StageEvent::NotesDeleted {
            notes: counts.notes,
            cards: counts.cards,
        });
        Some(counts)
    } else {
        log::warn!("no note matched the wordlist, keeping the full collection");
        progress.report(StageEvent::NotesKept);
        None
    };

    let renamed_deck = update::rename_deck(&pool, &job.output_name, &config.default_deck).await?;
    match &renamed_deck {
        Some(renamed) => progress.report(StageEvent::DeckRenamed {
            from: renamed.from.clone(),
            to: renamed.to.clone(),
        }),
        None => log::warn!(
            "no deck other than '{}' found, nothing renamed",
            config.default_deck
        ),
    }

    pool.close().await;

    let output = config.output_path(&job.output_name);
    let entries_written = archive::pack(&config.work_dir, &output)?;
    progress.report(StageEvent::Packed {
        entries: entries_written,
    });

    Ok(FilterReport {
        model: model.name,
        field: field_name,
        notes_scanned: outcome.notes_scanned,
        notes_kept: outcome.kept_note_ids.len(),
        deleted,
        media_removed,
        media_retained: manifest.len(),
        renamed_deck,
        output,
        entries_written,
        warnings,
    })
}

/// Print the run summary on stdout and any cleanup warnings on stderr.
pub fn print_summary(job: &FilterJob, report: &FilterReport) {
    println!("filter {}", job.archive.display());
    println!("  model: {}", report.model);
    println!("  field: {}", report.field);
    println!(
        "  notes kept: {} / {}",
        report.notes_kept, report.notes_scanned
    );
    match &report.deleted {
        Some(counts) => {
            println!("  notes deleted: {}", counts.notes);
            println!("  cards deleted: {}", counts.cards);
        }
        None => println!("  notes deleted: 0 (no match, collection kept whole)"),
    }
    match report.media_removed {
        Some(removed) => {
            println!("  media removed: {}", removed);
            println!("  media retained: {}", report.media_retained);
        }
        None => println!("  media removed: 0 (no references, all files kept)"),
    }
    if let Some(renamed) = &report.renamed_deck {
        println!("  deck renamed: '{}' -> '{}'", renamed.from, renamed.to);
    }
    println!(
        "  written: {} ({} entries)",
        report.output.display(),
        report.entries_written
    );
    for warning in &report.warnings {
        eprintln!("warning: {}", warning);
    }
    println!("ok");
}
