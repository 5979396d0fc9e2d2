//! Asset Package Converter CLI
//!
//! Command-line interface for converting packages to documents and back.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use uasset::{
    BodySource, DecodeOptions, Diagnostics, Document, DocumentFormat, EncodeOptions,
    decode_options_for,
};

#[derive(Parser)]
#[command(name = "uasset")]
#[command(about = "Convert engine asset packages to editable documents and back")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Suppress status lines
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Maximum number of diagnostics to print
    #[arg(long, global = true, default_value_t = 50)]
    max_diagnostics: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a package into a JSON or YAML document
    Decode {
        /// Input package path
        input: PathBuf,

        /// Output document path (defaults to the input with the format's extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Document format (json, yaml); taken from the output extension when omitted
        #[arg(short, long)]
        format: Option<String>,

        /// Package path used as the root of every export path
        #[arg(long)]
        package_name: Option<String>,

        /// Do not add construction-script and scene-root placeholders
        #[arg(long)]
        no_scaffolding: bool,
    },

    /// Encode a document back into a package
    Encode {
        /// Input document path
        input: PathBuf,

        /// Output package path (defaults to the input with a .uasset extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Re-encode properties instead of reusing preserved bytes
        #[arg(long)]
        prefer_properties: bool,

        /// Skip the digest check on preserved bytes
        #[arg(long)]
        no_verify_digests: bool,

        /// Bytes reserved for the package summary
        #[arg(long)]
        header_reserve: Option<usize>,
    },

    /// Decode and re-encode a package in memory and report the difference
    Verify {
        /// Input package path
        input: PathBuf,

        /// Package path used as the root of every export path
        #[arg(long)]
        package_name: Option<String>,

        /// Re-encode properties instead of reusing preserved bytes
        #[arg(long)]
        prefer_properties: bool,
    },

    /// Print versions, table sizes and export classes of a package
    Info {
        /// Input package path
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output {
        quiet: cli.quiet,
        max_diagnostics: cli.max_diagnostics,
    };

    match cli.command {
        Commands::Decode {
            input,
            output: target,
            format,
            package_name,
            no_scaffolding,
        } => decode_command(&output, input, target, format, package_name, no_scaffolding),
        Commands::Encode {
            input,
            output: target,
            prefer_properties,
            no_verify_digests,
            header_reserve,
        } => {
            let mut options = EncodeOptions::default()
                .with_body_source(body_source(prefer_properties))
                .with_verify_digests(!no_verify_digests);
            if let Some(reserve) = header_reserve {
                options = options.with_header_reserve(reserve);
            }
            encode_command(&output, input, target, &options)
        }
        Commands::Verify {
            input,
            package_name,
            prefer_properties,
        } => verify_command(&output, input, package_name, prefer_properties),
        Commands::Info { input } => info_command(input),
    }
}

/// Where status and diagnostics go
struct Output {
    quiet: bool,
    max_diagnostics: usize,
}

impl Output {
    fn status(&self, line: impl AsRef<str>) {
        if !self.quiet {
            println!("{}", line.as_ref());
        }
    }

    fn diagnostics(&self, diagnostics: &Diagnostics) {
        for diagnostic in diagnostics.iter().take(self.max_diagnostics) {
            eprintln!("{}", diagnostic);
        }
        if diagnostics.len() > self.max_diagnostics {
            eprintln!(
                "... and {} more diagnostics",
                diagnostics.len() - self.max_diagnostics
            );
        }
    }
}

fn body_source(prefer_properties: bool) -> BodySource {
    if prefer_properties {
        BodySource::PropertiesFirst
    } else {
        BodySource::RawFirst
    }
}

fn decode_options(input: &Path, package_name: Option<String>) -> DecodeOptions {
    match package_name {
        Some(name) => DecodeOptions::default().with_package_name(name),
        None => decode_options_for(input),
    }
}

fn decode_command(
    output: &Output,
    input: PathBuf,
    target: Option<PathBuf>,
    format: Option<String>,
    package_name: Option<String>,
    no_scaffolding: bool,
) -> Result<()> {
    let format = match (&format, &target) {
        (Some(name), _) => match DocumentFormat::from_name(name) {
            Some(format) => format,
            None => bail!("Unknown format: {}. Supported formats: json, yaml", name),
        },
        (None, Some(path)) => DocumentFormat::from_path(path),
        (None, None) => DocumentFormat::Json,
    };
    let target = target.unwrap_or_else(|| {
        input.with_extension(match format {
            DocumentFormat::Json => "json",
            DocumentFormat::Yaml => "yaml",
        })
    });

    let options = decode_options(&input, package_name).with_scaffolding(!no_scaffolding);
    output.status(format!("Decoding {} as {}", input.display(), options.package_name));

    let decoded = uasset::decode_file(&input, &options)
        .with_context(|| format!("Failed to decode {}", input.display()))?;
    uasset::save_document(&decoded.value, &target, format)
        .with_context(|| format!("Failed to write {}", target.display()))?;

    output.status(format!(
        "✓ Wrote {} ({} exports, {} warnings)",
        target.display(),
        decoded.value.export_count(),
        decoded.diagnostics.warning_count()
    ));
    output.diagnostics(&decoded.diagnostics);
    Ok(())
}

fn encode_command(
    output: &Output,
    input: PathBuf,
    target: Option<PathBuf>,
    options: &EncodeOptions,
) -> Result<()> {
    let target = target.unwrap_or_else(|| input.with_extension("uasset"));
    if target == input {
        bail!("Output would overwrite the input document: {}", input.display());
    }
    output.status(format!("Encoding {}", input.display()));

    let diagnostics = uasset::encode_file(&input, &target, options)
        .with_context(|| format!("Failed to encode {}", input.display()))?;

    output.status(format!(
        "✓ Wrote {} ({} warnings)",
        target.display(),
        diagnostics.warning_count()
    ));
    output.diagnostics(&diagnostics);
    Ok(())
}

fn verify_command(
    output: &Output,
    input: PathBuf,
    package_name: Option<String>,
    prefer_properties: bool,
) -> Result<()> {
    let decode = decode_options(&input, package_name);
    let encode = EncodeOptions::default().with_body_source(body_source(prefer_properties));
    output.status(format!("Verifying {}", input.display()));

    let report = uasset::verify_file(&input, &decode, &encode)
        .with_context(|| format!("Failed to verify {}", input.display()))?;

    output.status(format!(
        "  Original: {} bytes, encoded: {} bytes, delta: {:+}",
        report.original_len, report.encoded_len, report.delta
    ));
    output.status(format!(
        "  Exports: {} before, {} after",
        report.exports_before, report.exports_after
    ));
    output.diagnostics(&report.diagnostics);
    if report.is_clean() {
        output.status("✓ Round trip preserved size and exports");
    } else {
        output.status("⚠ Round trip changed the package");
    }
    Ok(())
}

fn info_command(input: PathBuf) -> Result<()> {
    let options = decode_options_for(&input).with_scaffolding(false);
    let decoded = uasset::decode_file(&input, &options)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    print_info(&input, &decoded.value);
    Ok(())
}

fn print_info(input: &Path, document: &Document) {
    let summary = &document.summary;
    println!("Package: {}", input.display());
    println!(
        "  Versions: legacy {}, UE4 {}, UE5 {}, licensee {}",
        summary.legacy_file_version,
        summary.file_version_ue4,
        summary
            .file_version_ue5
            .map_or_else(|| "-".to_string(), |v| v.to_string()),
        summary.file_version_licensee
    );
    println!("  Saved by: {}", summary.saved_by_engine_version);
    println!(
        "  Byte order: {}",
        if summary.big_endian { "big" } else { "little" }
    );
    println!("  Names: {}", document.names.len());
    println!("  Imports: {}", document.imports.len());
    println!("  Exports: {}", document.exports.len());
    println!("  Thumbnails: {}", document.thumbnails.index.len());

    let mut classes: IndexMap<&str, usize> = IndexMap::new();
    for export in document.exports.values() {
        *classes.entry(export.class.as_str()).or_default() += 1;
    }
    for (class, count) in &classes {
        println!("    {:>4}  {}", count, class);
    }
}
