//! # chatvault CLI
//!
//! Command-line interface for the chatvault library.

use std::process;
use std::sync::Arc;
use std::time::Instant;

use chrono::DateTime;
use clap::Parser as ClapParser;

use chatvault::cli::{Args, Command, TOKEN_ENV};
use chatvault::config::{ExtractConfig, TransformConfig};
use chatvault::extractor::Extractor;
use chatvault::progress::Progress;
use chatvault::sink::RawEnvelope;
use chatvault::transform::{Projection, Transformer};
use chatvault::{ChatvaultError, Result};

fn main() {
    if let Err(e) = run() {
        eprintln!("❌ Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();
    match args.command {
        Command::Extract {
            group_id,
            page_size,
            max_pages,
            raw_dir,
            wrapped,
        } => run_extract(&group_id, page_size, max_pages, raw_dir, wrapped),
        Command::Transform {
            raw_dir,
            out_dir,
            only,
        } => run_transform(raw_dir, out_dir, &only),
    }
}

fn run_extract(
    group_id: &str,
    page_size: u32,
    max_pages: Option<u32>,
    raw_dir: std::path::PathBuf,
    wrapped: bool,
) -> Result<()> {
    let token =
        std::env::var(TOKEN_ENV).map_err(|_| ChatvaultError::MissingToken { var: TOKEN_ENV })?;

    let envelope = if wrapped {
        RawEnvelope::Wrapped
    } else {
        RawEnvelope::Bare
    };
    let config = ExtractConfig::new(token)
        .with_raw_dir(&raw_dir)
        .with_envelope(envelope);

    println!("📦 chatvault v{}", env!("CARGO_PKG_VERSION"));
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("👥 Group:     {}", group_id);
    println!("📄 Page size: {}", page_size);
    match max_pages {
        Some(cap) => println!("🔢 Max pages: {}", cap),
        None => println!("🔢 Max pages: until exhausted"),
    }
    println!("📂 Raw dir:   {}", raw_dir.display());
    println!();

    let start = Instant::now();
    let extractor = Extractor::from_config(&config).with_progress(Arc::new(|p: Progress| {
        match p.percentage() {
            Some(pct) => println!(
                "⏳ Page {} — {} messages ({:.0}%)",
                p.pages_fetched, p.messages_fetched, pct
            ),
            None => println!(
                "⏳ Page {} — {} messages",
                p.pages_fetched, p.messages_fetched
            ),
        }
    }));

    // A transport failure has already flushed buffered messages to disk by
    // the time it surfaces here, so partial progress is preserved either way.
    let report = extractor.extract(group_id, page_size, max_pages)?;
    let elapsed = start.elapsed();

    println!();
    println!("✅ Done! Stopped: {}", report.stop);
    println!();
    println!("📊 Summary:");
    println!("   Pages:     {}", report.pages_fetched);
    println!("   Messages:  {}", report.messages_fetched);
    println!("   Raw files: {}", report.files_written.len());
    for filename in &report.files_written {
        println!("     - {}", filename);
    }
    if let Some(oldest) = oldest_timestamp(&report.files_written) {
        println!("   Oldest:    {}", oldest);
    }
    println!("   Total time: {:.2}s", elapsed.as_secs_f64());

    Ok(())
}

/// Pulls the oldest batch timestamp back out of the deterministic filenames
/// (`{group}_{oldestTs}_{lastId}.json`) for the summary line.
fn oldest_timestamp(files: &[String]) -> Option<String> {
    let last = files.last()?;
    let epoch: i64 = last.split('_').nth(1)?.parse().ok()?;
    let ts = DateTime::from_timestamp(epoch, 0)?;
    Some(ts.format("%Y-%m-%d %H:%M:%S UTC").to_string())
}

fn run_transform(
    raw_dir: std::path::PathBuf,
    out_dir: std::path::PathBuf,
    only: &[Projection],
) -> Result<()> {
    let projections: Vec<Projection> = if only.is_empty() {
        Projection::ALL.to_vec()
    } else {
        only.to_vec()
    };

    println!("📦 chatvault v{}", env!("CARGO_PKG_VERSION"));
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("📂 Raw dir:  {}", raw_dir.display());
    println!("💾 Out dir:  {}", out_dir.display());
    println!(
        "🗂  Stages:   {}",
        projections
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!();

    let start = Instant::now();
    let transformer = Transformer::new(TransformConfig::new(raw_dir, out_dir));
    let report = transformer.transform(&projections)?;
    let elapsed = start.elapsed();

    for output in &report.written {
        println!(
            "✅ {} — {} rows → {}",
            output.projection,
            output.rows,
            output.path.display()
        );
    }
    for (projection, err) in &report.failed {
        eprintln!("❌ {} — {}", projection, err);
    }

    println!();
    println!(
        "📊 {} of {} projections written in {:.2}s",
        report.written.len(),
        projections.len(),
        elapsed.as_secs_f64()
    );

    if report.is_success() {
        Ok(())
    } else {
        // Surface the first violation so the exit code reflects the failure.
        let (projection, err) = report.failed.into_iter().next().expect("non-empty failed");
        eprintln!("❌ transform incomplete: {} projection failed", projection);
        Err(err)
    }
}
