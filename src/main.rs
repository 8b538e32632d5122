use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::process::exit;

use scriptfcns::{compile, init_tracing, CompileOptions, HeaderFlavor, Mode};

#[derive(Clone, Copy, ValueEnum)]
enum CliMode {
    /// Translate one interface file into C
    Code,
    /// Generate the class type header
    Mkhdr,
    /// Generate the export index
    Index,
    /// Dump the scanned declarations as JSON
    Manifest,
}

impl From<CliMode> for Mode {
    fn from(mode: CliMode) -> Self {
        match mode {
            CliMode::Code => Mode::Code,
            CliMode::Mkhdr => Mode::Header,
            CliMode::Index => Mode::Index,
            CliMode::Manifest => Mode::Manifest,
        }
    }
}

#[derive(Parser)]
#[command(name = "scriptfcns")]
#[command(about = "Convert SpiderScript meta-files into C source", long_about = None)]
struct Cli {
    /// Operation mode
    #[arg(short = 'M', long, value_enum, default_value = "code")]
    mode: CliMode,
    /// Header filename included by generated code/index units
    #[arg(short = 'H', long)]
    header: Option<String>,
    /// Generate a language-provided header instead of a provider header
    #[arg(long)]
    lang: bool,
    /// Shared type-name header included by provider headers
    #[arg(long, default_value = scriptfcns::header::DEFAULT_LANG_HEADER)]
    lang_header: String,
    /// Skip regeneration when inputs are unchanged
    #[arg(long)]
    cache_dir: Option<PathBuf>,
    /// Output file
    #[arg(short, long)]
    output: PathBuf,
    /// Interface files (directories are searched for .ssf files)
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let mut options = CompileOptions::new(cli.mode.into(), cli.files, cli.output);
    options.header = cli.header;
    options.flavor = if cli.lang {
        HeaderFlavor::Language
    } else {
        HeaderFlavor::Provider
    };
    options.lang_header = cli.lang_header;
    options.cache_dir = cli.cache_dir;

    if let Err(e) = compile(&options) {
        eprintln!("{}", e);
        if let Some(line) = e.context() {
            eprintln!("{}", line);
        }
        exit(1);
    }
}
