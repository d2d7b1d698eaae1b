// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command implementations for the `forge` binary.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use forge_core::human_errors::humanize_error;
use forge_core::{
    AssemblySummary, Entry, EntryList, ForgeError, GenerationOptions, PageGeometry, Quality,
    Settings, SettingsStore, default_output_filename_today, media_type_for_extension,
};
use forge_document::{DocumentAssembler, count_pages, probe_page_count};
use tracing::{error, info, instrument};

/// Command-line values that take precedence over saved settings.
#[derive(Debug, Clone, Copy, Default)]
pub struct Overrides {
    pub page_geometry: Option<PageGeometry>,
    pub quality: Option<i64>,
    pub compress: Option<bool>,
}

impl Overrides {
    fn apply(&self, settings: &mut Settings) {
        if let Some(geometry) = self.page_geometry {
            settings.image_paper_size = geometry;
        }
        if let Some(quality) = self.quality {
            settings.image_quality = Quality::new(quality);
        }
        if let Some(compress) = self.compress {
            settings.use_image_compression = compress;
        }
    }

    fn is_empty(&self) -> bool {
        self.page_geometry.is_none() && self.quality.is_none() && self.compress.is_none()
    }
}

/// Read `path` and turn it into an entry, classified by file extension.
async fn load_entry(path: &Path) -> Result<Entry> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default();
    let media_type = media_type_for_extension(extension).ok_or_else(|| {
        ForgeError::UnsupportedMediaType(format!("{} ({})", extension, path.display()))
    })?;

    let payload = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;

    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let mut entry = Entry::classify(media_type, payload)?.with_name(name);
    if entry.kind.is_pdf() {
        let pages = probe_page_count(&entry.payload);
        entry = entry.with_page_count(pages);
    }
    Ok(entry)
}

async fn load_entries(files: &[PathBuf]) -> Result<EntryList> {
    let mut entries = EntryList::new();
    for path in files {
        let entry = load_entry(path).await?;
        info!(
            name = entry.name.as_deref().unwrap_or_default(),
            kind = ?entry.kind,
            bytes = entry.payload.len(),
            "Entry added"
        );
        entries.push(entry);
    }
    Ok(entries)
}

/// `forge combine`: merge `files` in order and write the result.
#[instrument(skip_all, fields(files = files.len(), concurrent = concurrent))]
pub async fn combine(
    store: &SettingsStore,
    files: Vec<PathBuf>,
    output: Option<PathBuf>,
    overrides: Overrides,
    concurrent: bool,
) -> Result<()> {
    let mut settings = store.load();
    overrides.apply(&mut settings);
    let options = settings.generation_options();

    let entries = load_entries(&files).await?;
    let entry_count = entries.len();
    let bytes = assemble(entries.into_vec(), options, concurrent).await?;

    let output = output.unwrap_or_else(|| PathBuf::from(default_output_filename_today()));
    tokio::fs::write(&output, &bytes)
        .await
        .with_context(|| format!("failed to write {}", output.display()))?;

    let summary = AssemblySummary {
        entries: entry_count,
        pages: count_pages(&bytes)? as usize,
        bytes: bytes.len(),
        options,
    };
    info!(
        output = %output.display(),
        pages = summary.pages,
        bytes = summary.bytes,
        "PDF written"
    );
    println!("{} → {}", summary.describe(), output.display());
    Ok(())
}

async fn assemble(
    entries: Vec<Entry>,
    options: GenerationOptions,
    concurrent: bool,
) -> Result<Vec<u8>> {
    let assembler = DocumentAssembler::with_default_rasterizer();
    let bytes = if concurrent {
        assembler.assemble_concurrent(entries, options).await?
    } else {
        tokio::task::spawn_blocking(move || assembler.assemble(&entries, &options))
            .await
            .map_err(|err| ForgeError::Task(format!("assembly worker failed: {err}")))??
    };
    Ok(bytes)
}

/// `forge pages`: print each file's page count.
pub async fn pages(files: &[PathBuf]) -> Result<()> {
    for path in files {
        let data = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        let count = probe_page_count(&data);
        println!("{}: {} page(s)", path.display(), count);
    }
    Ok(())
}

pub fn settings_show(store: &SettingsStore) -> Result<()> {
    print_settings(store, &store.load());
    Ok(())
}

pub fn settings_reset(store: &SettingsStore) -> Result<()> {
    let settings = store.reset()?;
    print_settings(store, &settings);
    Ok(())
}

pub fn settings_set(store: &SettingsStore, overrides: Overrides) -> Result<()> {
    if overrides.is_empty() {
        anyhow::bail!("nothing to change; pass --paper, --quality or --compress");
    }
    let mut settings = store.load();
    overrides.apply(&mut settings);
    store.save(&settings)?;
    print_settings(store, &settings);
    Ok(())
}

fn print_settings(store: &SettingsStore, settings: &Settings) {
    println!("Settings file:     {}", store.path().display());
    println!("Compress images:   {}", settings.use_image_compression);
    println!("Image quality:     {}", settings.image_quality);
    println!("Image paper size:  {}", settings.image_paper_size);
}

/// Log the full error and show the user the humanized notification.
pub fn report(err: &anyhow::Error) {
    match err.downcast_ref::<ForgeError>() {
        Some(forge) => {
            error!(
                error = %forge,
                cause = %forge.root_cause(),
                entry = ?forge.entry_index(),
                "Command failed"
            );
            let human = humanize_error(forge);
            eprintln!("{}\n{}", human.message, human.suggestion);
        }
        None => {
            error!(error = format!("{err:#}"), "Command failed");
            eprintln!("{err:#}");
        }
    }
}
