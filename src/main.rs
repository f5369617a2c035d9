//! finalformat – command-line manuscript → PDF book converter.
//!
//! Usage:
//!   finalformat <manuscript.docx|.html> [--size small] [--font-body N]
//!               [--font-title N] [--title-align L|R|C]
//!
//! The PDF is written next to the input with the same stem unless
//! `--output` is given.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::process;

use clap::Parser;

use finalformat::fonts::{BodyFont, TitleFont};
use finalformat::pipeline::{output_path_for, Assets};
use finalformat::prompt::{collect_metadata, reorder_dialogue};
use finalformat::splitter::read_manuscript;
use finalformat::{write_pdf, Book, BookError, PageSize, TitleAlign, WriteOutcome};

#[derive(Parser, Debug)]
#[command(
    name = "finalformat",
    version,
    about = "This program transforms docx and html files into formatted pdfs",
    after_help = "Remember to input a docx or html file with a Title followed by Paragraphs structure!"
)]
struct Cli {
    /// Path to the docx or html file you want to format into pdf
    path: PathBuf,

    /// Size of the page
    #[arg(short, long, value_enum, ignore_case = true, default_value_t = PageSize::Regular)]
    size: PageSize,

    /// Body font. 0: PT Serif; 1: EB Garamond; 2: Fira Sans
    #[arg(short = 'f', long, default_value = "0", allow_hyphen_values = true)]
    font_body: String,

    /// Title font. 0: Playfair Display; 1: DM Sans; 2: Raleway; 3: Playfair Display SC
    #[arg(short = 't', long, default_value = "0", allow_hyphen_values = true)]
    font_title: String,

    /// Chapter title alignment: L for Left, R for Right, C for Center
    #[arg(short = 'a', long)]
    title_align: Option<String>,

    /// Output path (default: input path with a .pdf extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Directory holding fonts/ and png/
    #[arg(long, default_value = ".")]
    assets: PathBuf,

    /// Also write the composed page list as JSON
    #[arg(long)]
    layout_json: Option<PathBuf>,

    /// Skip the chapter reorder question
    #[arg(long)]
    no_reorder: bool,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let chapters = match read_manuscript(&cli.path) {
        Ok(c) => c,
        Err(BookError::UnsupportedFormat(_)) => {
            exit_with("File extension not supported! Try html or docx file")
        }
        Err(e) => exit_with(&format!("Error reading '{}': {e}", cli.path.display())),
    };

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut stdout = io::stdout();

    let metadata = match collect_metadata(&mut input, &mut stdout) {
        Ok(m) => m,
        Err(e) => exit_with(&interrupted_message(e)),
    };

    let mut book = Book::new(chapters, metadata)
        .with_fonts(
            BodyFont::from_flag(&cli.font_body),
            TitleFont::from_flag(&cli.font_title),
        )
        .with_page_size(cli.size);

    if !cli.no_reorder {
        if let Err(e) = reorder_dialogue(&mut book, &mut input, &mut stdout) {
            exit_with(&interrupted_message(e));
        }
    }

    let assets = match Assets::load(&cli.assets, &book) {
        Ok(a) => a,
        Err(e) => {
            log::error!("{e}");
            exit_with("Unable to load fonts")
        }
    };

    let align = TitleAlign::from_flag(cli.title_align.as_deref());
    let output = cli.output.unwrap_or_else(|| output_path_for(&cli.path));

    if let Some(json_path) = &cli.layout_json {
        let layout = finalformat::pipeline::compute_layout_config(&book, align, &assets);
        if let Err(e) = fs::write(json_path, layout.to_json()) {
            log::warn!("Could not write layout to '{}': {e}", json_path.display());
        }
    }

    match write_pdf(&book, &output, align, &assets) {
        Ok(WriteOutcome::Written { pages, .. }) => {
            println!("\nSuccess! You have created a .pdf file ({pages} pages)\n");
        }
        Ok(WriteOutcome::Failed(e)) => {
            eprintln!("Could not create the PDF file: {e}");
        }
        Err(e) => exit_with(&format!("Error: {e}")),
    }
}

fn interrupted_message(e: BookError) -> String {
    match e {
        BookError::Interrupted => "Program interrupted by keyboard.".to_string(),
        other => format!("Error: {other}"),
    }
}

fn exit_with(message: &str) -> ! {
    eprintln!("{message}");
    process::exit(1);
}
