//! `qrify` command line: generate styled QR codes and manage the theme preference.

use std::error::Error;
use std::fs;
use std::io;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use qrify::{
    Configurator, ContentType, CornerDotType, CornerSquareType, DirectorySaver, DotType,
    ErrorCorrection, ExportFormat, ExportSize, HexColor, ImageOptionsPatch, JsonFileStore,
    LogoFile, Preview, PreviewContainer, PreviewSlot, QrOptions, SizePreset, StyleEditor,
    StyleLayer, StyledQrRenderer, SvgFileContainer, Theme, ThemePreference, Update,
};

#[derive(Debug, Parser)]
#[command(name = "qrify", version, about = "Styled QR code generator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Render a QR code and save it as qrcode.<ext>
    Generate(GenerateArgs),
    /// Show or change the persisted theme
    Theme {
        #[command(subcommand)]
        action: Option<ThemeAction>,
    },
}

#[derive(Debug, Subcommand)]
enum ThemeAction {
    Show,
    Toggle,
    Set { theme: Theme },
}

#[derive(Debug, clap::Args)]
struct GenerateArgs {
    /// Payload to encode. Defaults to the loaded configuration's content.
    content: Option<String>,

    #[arg(long = "type", value_enum, default_value_t = ContentType::Url)]
    content_type: ContentType,

    #[arg(long, value_enum)]
    dots: Option<DotType>,
    #[arg(long)]
    dots_color: Option<HexColor>,
    #[arg(long, value_enum)]
    corner_square: Option<CornerSquareType>,
    #[arg(long)]
    corner_square_color: Option<HexColor>,
    #[arg(long, value_enum)]
    corner_dot: Option<CornerDotType>,
    #[arg(long)]
    corner_dot_color: Option<HexColor>,
    #[arg(long)]
    background: Option<HexColor>,
    /// Quiet zone in pixels (0-50)
    #[arg(long)]
    margin: Option<u32>,

    /// PNG or SVG logo drawn in the centre
    #[arg(long)]
    logo: Option<PathBuf>,
    /// Logo size as a fraction of the code (0.05-0.5)
    #[arg(long)]
    logo_size: Option<f32>,
    /// Gap around the logo in pixels (0-10)
    #[arg(long)]
    logo_margin: Option<u32>,
    /// Keep data modules visible behind the logo
    #[arg(long)]
    show_background_dots: bool,

    #[arg(long, value_enum)]
    error_correction: Option<ErrorCorrection>,

    #[arg(long, value_enum, default_value_t = ExportFormat::Png)]
    format: ExportFormat,
    /// small, medium, large, xlarge or a pixel count (100-2000)
    #[arg(long, value_parser = parse_size, default_value = "medium")]
    size: ExportSize,

    /// Directory the file is saved to
    #[arg(long, default_value = ".")]
    out: PathBuf,
    /// Also write the live preview SVG to this path
    #[arg(long)]
    preview: Option<PathBuf>,
    /// Start from a saved JSON configuration
    #[arg(long)]
    config: Option<PathBuf>,
    /// Print the final configuration as JSON
    #[arg(long)]
    print_config: bool,
}

fn parse_size(value: &str) -> Result<ExportSize, String> {
    if let Some(preset) = SizePreset::from_id(value) {
        return Ok(ExportSize::Preset(preset));
    }
    value
        .parse::<u32>()
        .map(ExportSize::custom)
        .map_err(|_| {
            format!("expected small, medium, large, xlarge or a pixel count, got `{value}`")
        })
}

/// Preview target: in memory, or an SVG file on disk.
enum PreviewTarget {
    Memory(PreviewSlot),
    File(SvgFileContainer),
}

impl PreviewContainer for PreviewTarget {
    fn mount(&mut self, preview: &Preview) -> io::Result<()> {
        match self {
            Self::Memory(slot) => slot.mount(preview),
            Self::File(file) => file.mount(preview),
        }
    }
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Generate(args) => generate(args),
        Command::Theme { action } => theme(action.unwrap_or(ThemeAction::Show)),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("qrify=info")))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn generate(args: GenerateArgs) -> Result<(), Box<dyn Error>> {
    let options = match &args.config {
        Some(path) => QrOptions::from_json(&fs::read_to_string(path)?)?,
        None => QrOptions::default(),
    };
    let target = match args.preview.clone() {
        Some(path) => PreviewTarget::File(SvgFileContainer::new(path)),
        None => PreviewTarget::Memory(PreviewSlot::new()),
    };
    let mut app: Configurator<StyledQrRenderer, PreviewTarget> =
        Configurator::with_options(options, target);

    if args.content.is_some() || args.config.is_none() {
        app.select_content_type(args.content_type);
    }
    if let Some(content) = &args.content {
        app.edit_content(content);
    }

    let style = [
        args.dots.map(StyleEditor::select_dot_type),
        args.dots_color.map(|c| StyleEditor::set_color(StyleLayer::Dots, c)),
        args.corner_square.map(StyleEditor::select_corner_square_type),
        args.corner_square_color.map(|c| StyleEditor::set_color(StyleLayer::CornersSquare, c)),
        args.corner_dot.map(StyleEditor::select_corner_dot_type),
        args.corner_dot_color.map(|c| StyleEditor::set_color(StyleLayer::CornersDot, c)),
        args.background.map(StyleEditor::set_background),
        args.margin.map(StyleEditor::set_margin),
        args.error_correction.map(Update::ErrorCorrection),
    ];
    for update in style.into_iter().flatten() {
        app.apply_style(update);
    }

    if let Some(path) = &args.logo {
        app.upload_logo(&LogoFile::from_path(path))?;
    }
    app.adjust_logo(ImageOptionsPatch {
        image_size: args.logo_size,
        margin: args.logo_margin,
        hide_background_dots: args.show_background_dots.then_some(false),
    });

    // Report the render failure itself instead of the export refusal
    app.sync()?;

    if args.print_config {
        println!("{}", app.export_json()?);
    }

    app.select_export_format(args.format);
    app.select_export_size(args.size);
    let mut saver = DirectorySaver::new(&args.out);
    let file = app.download_to(&mut saver)?;
    info!(path = %args.out.join(&file.file_name).display(), "Done");
    Ok(())
}

fn theme(action: ThemeAction) -> Result<(), Box<dyn Error>> {
    let mut preference = ThemePreference::load(JsonFileStore::open_default(), false);
    match action {
        ThemeAction::Show => {}
        ThemeAction::Toggle => {
            preference.toggle()?;
        }
        ThemeAction::Set { theme } => preference.set(theme)?,
    }
    println!("{}", preference.theme());
    Ok(())
}
