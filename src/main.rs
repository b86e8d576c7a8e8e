use std::fs;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use sheetscribe::{
    encode_wav, export_json, page, page_musicxml, play_page, test_tone, transcribe, PageInfo,
    RenderConfig, SheetError, SheetMusic, WavFileSink,
};
use tracing_subscriber::EnvFilter;

/// Render a transcription response as paged sheet music and audio
#[derive(Parser, Debug)]
#[command(name = "sheetscribe", version, about)]
struct Args {
    /// Transcription response: bare JSON or text with a fenced JSON block
    input: Option<PathBuf>,

    /// Page to render, starting at 1
    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
    page: u64,

    /// Write the page's audio to this WAV file
    #[arg(long)]
    wav: Option<PathBuf>,

    /// Write the page's notation to this MusicXML file
    #[arg(long)]
    musicxml: Option<PathBuf>,

    /// Write the full validated document to this JSON file
    #[arg(long)]
    json: Option<PathBuf>,

    /// YAML render configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write a two second A4 tone to this WAV file and exit
    #[arg(long)]
    test_tone: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if args.verbose { "debug" } else { "info" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(args: Args) -> Result<(), SheetError> {
    let config = match &args.config {
        Some(path) => RenderConfig::load(path)?,
        None => RenderConfig::default(),
    };

    if let Some(path) = &args.test_tone {
        fs::write(path, encode_wav(&test_tone(config.sample_rate), config.sample_rate)?)?;
        eprintln!("Wrote test tone to {}", path.display());
        return Ok(());
    }

    let Some(input) = &args.input else {
        return Err(SheetError::ConfigError(
            "an input file is required unless --test-tone is given".to_string(),
        ));
    };
    let source = fs::read_to_string(input)?;
    let sheet = transcribe(&source);

    // pages past the end render as empty
    let page_index = usize::try_from(args.page - 1).unwrap_or(usize::MAX);
    print_summary(&sheet, page_index);

    if let Some(path) = &args.musicxml {
        fs::write(path, page_musicxml(&sheet, page_index))?;
        eprintln!("Wrote MusicXML to {}", path.display());
    }

    if let Some(path) = &args.json {
        fs::write(path, export_json(&sheet)?)?;
        eprintln!("Wrote JSON to {}", path.display());
    }

    if let Some(path) = &args.wav {
        let mut sink = WavFileSink::new(path);
        let report = play_page(&mut sink, &sheet, page_index, &config)?;
        eprintln!("{}", report.message());
    }

    Ok(())
}

fn print_summary(sheet: &SheetMusic, page_index: usize) {
    let info = PageInfo::new(&sheet.notes, page_index);

    println!("{}", sheet.title);
    println!(
        "{} | {} | {} BPM",
        sheet.key_signature, sheet.time_signature, sheet.tempo
    );
    println!(
        "{} of {} notes kept (confidence >= {})",
        sheet.processing_info.filtered_notes_count,
        sheet.processing_info.original_notes_count,
        sheet.processing_info.confidence_threshold
    );

    if sheet.notes.is_empty() {
        println!("No notes detected");
        return;
    }

    println!(
        "Page {} of {}, notes {}-{} of {}",
        info.page_number, info.total_pages, info.first_note, info.last_note, info.total_notes
    );
    for note in page(&sheet.notes, page_index) {
        println!(
            "  {:>4} {} at {:.2}s (velocity {})",
            note.pitch,
            note.duration.code(),
            note.time,
            note.velocity
        );
    }
}
