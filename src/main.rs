use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;

use odl::catalog::CatalogReport;
use odl::container::ContainerReader;
use odl::export::{CstructDoc, FunctionDef};
use odl::hexdump::hex_dump;
use odl::locate::locate;
use odl::schema;

#[derive(Parser)]
#[command(name = "odl", about = "OneDrive ODL log container decoder")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the code files, functions and flags seen in a container
    Catalog {
        input: PathBuf,
        /// Emit the catalog as JSON instead of a tree
        #[arg(long)]
        json: bool,
    },
    /// Extract the parameter bytes of the first record matching an identity
    Extract {
        input: PathBuf,
        #[arg(short = 'c', long)]
        code_file: String,
        #[arg(short = 'f', long)]
        function: String,
        /// Flags value (exact match)
        #[arg(short = 'F', long)]
        flags: u32,
        /// Write raw bytes here instead of hex-dumping to stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show container header metadata
    Info { input: PathBuf },
    /// Write a .cstruct skeleton pre-filled from the catalog
    Skeleton {
        input: PathBuf,
        #[arg(short = 'c', long)]
        code_file: String,
        #[arg(short, long, default_value = "")]
        description: String,
        #[arg(short, long, default_value = "")]
        author: String,
        #[arg(long, default_value = "1.0")]
        version: String,
        /// Directory to write <code_file>.cstruct into
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,
    },
    /// List the primitive data types the structure decoder understands
    Types,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    match Cli::parse().command {
        // ── Catalog ──────────────────────────────────────────────────────────
        Commands::Catalog { input, json } => {
            let mut reader = ContainerReader::open_path(&input)?;
            let report = CatalogReport::build(&mut reader)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("Container: {}", input.display());
                for file in report.catalog.sorted_code_files() {
                    println!("{file}");
                    let mut functions: Vec<&String> = report
                        .catalog
                        .functions_by_file
                        .get(file)
                        .map(|v| v.iter().collect())
                        .unwrap_or_default();
                    functions.sort_by(|a, b| a.to_lowercase().cmp(&b.to_lowercase()));
                    for function in functions {
                        let mut flags = report
                            .catalog
                            .flags_by_function
                            .get(function)
                            .cloned()
                            .unwrap_or_default();
                        flags.sort_unstable();
                        let flags: Vec<String> = flags.iter().map(u32::to_string).collect();
                        println!("    {function}  [{}]", flags.join(", "));
                    }
                }
                println!(
                    "{} record(s), {} code file(s)",
                    report.records,
                    report.catalog.code_files.len()
                );
                if report.is_partial() {
                    eprintln!("warning: partial scan, {}", report.status);
                }
            }
        }

        // ── Extract ──────────────────────────────────────────────────────────
        Commands::Extract { input, code_file, function, flags, output } => {
            let mut reader = ContainerReader::open_path(&input)?;
            match locate(&mut reader, &code_file, &function, flags)? {
                None => {
                    eprintln!("no record matches ({code_file}, {function}, {flags})");
                    process::exit(1);
                }
                Some(params) if params.is_empty() => {
                    println!("matched, but the record carries no parameter bytes");
                }
                Some(params) => match output {
                    Some(path) => {
                        std::fs::write(&path, &params)?;
                        println!("{} byte(s) → {}", params.len(), path.display());
                    }
                    None => println!("{}", hex_dump(&params)),
                },
            }
        }

        // ── Info ─────────────────────────────────────────────────────────────
        Commands::Info { input } => {
            let reader = ContainerReader::open_path(&input)?;
            let header = reader.header();
            println!("── ODL container ───────────────────────────────────────");
            println!("  Path             {}", input.display());
            println!("  Format version   {}", header.version.as_u32());
            println!("  OneDrive version {}", header.one_drive_version);
            println!("  Windows version  {}", header.windows_version);
            println!("  Gzip envelope    {}", reader.is_compressed());
        }

        // ── Skeleton ─────────────────────────────────────────────────────────
        Commands::Skeleton { input, code_file, description, author, version, output_dir } => {
            let mut reader = ContainerReader::open_path(&input)?;
            let report = CatalogReport::build(&mut reader)?;

            let Some(file) = report
                .catalog
                .code_files
                .iter()
                .find(|f| f.eq_ignore_ascii_case(&code_file))
            else {
                eprintln!("code file '{code_file}' not present in {}", input.display());
                process::exit(1);
            };

            let mut doc = CstructDoc::new(description, author, version, file.clone());
            for function in report
                .catalog
                .functions_by_file
                .get(file)
                .cloned()
                .unwrap_or_default()
            {
                let flags = report
                    .catalog
                    .flags_by_function
                    .get(&function)
                    .cloned()
                    .unwrap_or_default();
                doc.functions.push(FunctionDef {
                    function,
                    description: String::new(),
                    flags,
                    fields: Vec::new(),
                });
            }

            let path = doc.write_to(&output_dir)?;
            println!("Wrote {}", path.display());
            if report.is_partial() {
                eprintln!("warning: partial scan, {}", report.status);
            }
        }

        // ── Types ────────────────────────────────────────────────────────────
        Commands::Types => {
            println!("{:<8} size", "type");
            for primitive in schema::ALL {
                let width = match primitive.fixed_width() {
                    Some(1) => "1 byte".to_owned(),
                    Some(n) => format!("{n} bytes"),
                    None => "variable".to_owned(),
                };
                println!("{:<8} {width}", primitive.name());
            }
        }
    }

    Ok(())
}
