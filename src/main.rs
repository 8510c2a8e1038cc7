use clap::Parser;
use colrsplit::{BatchBuilder, ExportConfig, InterruptFlag, PipelineError, Rgba};
use std::path::PathBuf;
use std::process::ExitCode;

/// Split color emoji glyphs into one SVG per fill, with provenance metadata.
#[derive(Parser)]
#[command(name = "colrsplit", version, about)]
struct Cli {
    /// Font file: an OpenType font with COLR/CPAL tables, or a `.json` description
    font: PathBuf,

    /// Emoji to export. Exports every color glyph in the font when omitted
    emojis: Vec<String>,

    /// JSON config file; command-line flags override its values
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output root directory
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Palette index to resolve colors from
    #[arg(long)]
    palette: Option<usize>,

    /// Width and height of every SVG in pixels
    #[arg(long)]
    size: Option<u32>,

    /// Worker threads (0 = all cores, 1 = sequential)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Drop outlines shorter than this many font units
    #[arg(long, value_name = "UNITS")]
    min_path_length: Option<f64>,

    /// Color for the foreground palette entry, as #rrggbb or #rrggbbaa
    #[arg(long, value_parser = Rgba::parse_hex)]
    foreground: Option<Rgba>,

    /// Also write each glyph's decoded paint tree to paint_dump.json
    #[arg(long)]
    dump_paints: bool,
}

impl Cli {
    fn export_config(&self) -> Result<ExportConfig, PipelineError> {
        let mut config = match &self.config {
            Some(path) => ExportConfig::from_json_file(path)?,
            None => ExportConfig::default(),
        };
        if let Some(output) = &self.output {
            config.output_root = output.clone();
        }
        if let Some(palette) = self.palette {
            config.palette_index = palette;
        }
        if let Some(size) = self.size {
            config.svg_size = size;
        }
        if let Some(jobs) = self.jobs {
            config.jobs = jobs;
        }
        if self.min_path_length.is_some() {
            config.min_path_length = self.min_path_length;
        }
        if let Some(foreground) = self.foreground {
            config.foreground = foreground;
        }
        config.dump_paints |= self.dump_paints;
        Ok(config)
    }
}

fn run(cli: Cli) -> Result<bool, PipelineError> {
    let interrupt = InterruptFlag::new();
    interrupt.listen_for_ctrl_c()?;

    let runner = BatchBuilder::new()
        .with_font_path(&cli.font)?
        .with_config(cli.export_config()?)
        .with_interrupt(interrupt)
        .build()?;

    let emojis = (!cli.emojis.is_empty()).then_some(cli.emojis);
    let summary = runner.run(emojis)?;
    println!(
        "{} processed, {} succeeded, {} failed{}",
        summary.processed_count,
        summary.success_count,
        summary.failed_count,
        if summary.interrupted { " (interrupted)" } else { "" }
    );
    Ok(!summary.interrupted)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(130),
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
