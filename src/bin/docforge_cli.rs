//! Document Forge CLI - JSON bridge for the hosting service
//!
//! Commands: interpret, classify, assemble, totals, render
//! Writes JSON to stdout, logs to stderr.
//! Exit codes: 0 ok, 1 bad input, 2 operation failure

use base64::Engine as _;
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use docforge_core::{
    classify, document_mode, BusinessProfile, DocumentPipeline, FormRecord, InvoiceTotals,
    Interpreter, OutputFormat, PageGeometry, PageSize,
};

#[derive(Parser)]
#[command(name = "docforge-cli")]
#[command(about = "Document Forge CLI - edit forms by command, render invoices and quotations")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Business profile JSON (letterhead, signatory, bank details)
    #[arg(short, long, global = true)]
    profile: Option<PathBuf>,

    /// Page size override: letter or a4
    #[arg(long, global = true)]
    page: Option<PageSize>,

    /// Page margin override in inches
    #[arg(long, global = true)]
    margin: Option<f32>,

    /// Log level when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply one command to a form
    Interpret {
        /// Command text, e.g. "change client name to Acme Corp"
        #[arg(short, long)]
        command: String,

        /// Form JSON, or @path to read it from a file
        #[arg(short, long)]
        form: String,
    },

    /// Report invoice/quotation mode
    Classify {
        #[arg(short, long)]
        form: String,
    },

    /// Print the layout blocks for a form
    Assemble {
        #[arg(short, long)]
        form: String,
    },

    /// Print invoice totals for a form
    Totals {
        #[arg(short, long)]
        form: String,
    },

    /// Render a form to a document
    Render {
        #[arg(short, long)]
        form: String,

        /// Output format: pdf or text
        #[arg(long, default_value = "pdf")]
        format: OutputFormat,

        /// Write into this directory; otherwise the bytes are inlined as base64
        #[arg(short, long)]
        out_dir: Option<PathBuf>,
    },
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn emit<T: Serialize>(value: &T, code: ExitCode) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(text) => {
            println!("{text}");
            code
        }
        Err(e) => {
            println!(r#"{{"success": false, "error": "Failed to encode output: {e}"}}"#);
            ExitCode::from(2)
        }
    }
}

fn fail(error: impl std::fmt::Display, code: u8) -> ExitCode {
    emit(&json!({"success": false, "error": error.to_string()}), ExitCode::from(code))
}

/// Accepts the bare record or a `{"form_data": {...}}` envelope.
fn read_form(arg: &str) -> Result<FormRecord, String> {
    let text = match arg.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read form file {path}: {e}"))?,
        None => arg.to_string(),
    };
    let mut value: Value =
        serde_json::from_str(&text).map_err(|e| format!("Invalid form JSON: {e}"))?;
    if let Some(inner) = value.get_mut("form_data") {
        value = inner.take();
    }
    serde_json::from_value(value).map_err(|e| format!("Invalid form: {e}"))
}

fn build_pipeline(cli: &Cli, format: OutputFormat) -> Result<DocumentPipeline, String> {
    let mut pipeline = match &cli.profile {
        Some(path) => DocumentPipeline::from_profile_file(path, format.backend())
            .map_err(|e| e.to_string())?,
        None => DocumentPipeline::new(BusinessProfile::default(), format.backend()),
    };

    if cli.page.is_some() || cli.margin.is_some() {
        let current = *pipeline.geometry();
        let geometry = PageGeometry::from_user(
            cli.page.unwrap_or(current.size),
            cli.margin.unwrap_or(current.margin_inches),
        )
        .map_err(|e| e.to_string())?;
        pipeline = pipeline.with_geometry(geometry);
    }
    Ok(pipeline)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match &cli.command {
        Commands::Interpret { command, form } => {
            let form = match read_form(form) {
                Ok(f) => f,
                Err(e) => return fail(e, 1),
            };
            let result = Interpreter::new().interpret(command, form);
            // Every interpreter outcome is a successful call; the message says what happened.
            emit(
                &json!({
                    "success": true,
                    "form_data": result.form,
                    "message": result.message,
                    "outcome": result.outcome,
                }),
                ExitCode::SUCCESS,
            )
        }

        Commands::Classify { form } => {
            let form = match read_form(form) {
                Ok(f) => f,
                Err(e) => return fail(e, 1),
            };
            emit(
                &json!({
                    "mode": classify(&form),
                    "documentMode": document_mode(&form),
                }),
                ExitCode::SUCCESS,
            )
        }

        Commands::Assemble { form } => {
            let form = match read_form(form) {
                Ok(f) => f,
                Err(e) => return fail(e, 1),
            };
            let pipeline = match build_pipeline(&cli, OutputFormat::Text) {
                Ok(p) => p,
                Err(e) => return fail(e, 1),
            };
            emit(&pipeline.assemble(&form), ExitCode::SUCCESS)
        }

        Commands::Totals { form } => {
            let form = match read_form(form) {
                Ok(f) => f,
                Err(e) => return fail(e, 1),
            };
            emit(&InvoiceTotals::compute(&form), ExitCode::SUCCESS)
        }

        Commands::Render { form, format, out_dir } => {
            let form = match read_form(form) {
                Ok(f) => f,
                Err(e) => return fail(e, 1),
            };
            let pipeline = match build_pipeline(&cli, *format) {
                Ok(p) => p,
                Err(e) => return fail(e, 1),
            };

            match out_dir {
                Some(dir) => match pipeline.generate_to_dir(&form, dir) {
                    Ok(manifest) => emit(
                        &json!({"success": true, "document": manifest}),
                        ExitCode::SUCCESS,
                    ),
                    Err(e) => fail(e, 2),
                },
                None => match pipeline.generate(&form) {
                    Ok(rendered) => emit(
                        &json!({
                            "success": true,
                            "document": rendered.manifest,
                            "dataBase64": base64::engine::general_purpose::STANDARD.encode(&rendered.bytes),
                        }),
                        ExitCode::SUCCESS,
                    ),
                    Err(e) => fail(e, 2),
                },
            }
        }
    }
}
