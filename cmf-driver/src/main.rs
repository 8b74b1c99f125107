//! C-minus-f Compiler Driver
//!
//! Reads a syntax tree produced by the parser (JSON), lowers it to IR,
//! runs the optimization pipeline and prints the resulting IR.

use anyhow::{Context, Result};
use clap::Parser;
use cmf_common::CompilerError;
use cmf_frontend::Frontend;
use cmf_opt::PassManager;
use log::info;
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "cmfc", version, about = "C-minus-f compiler middle end")]
struct Args {
    /// Input syntax tree (JSON)
    input: PathBuf,

    /// Output IR file (defaults to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Skip dead code elimination
    #[arg(long)]
    no_dce: bool,

    /// Module name (defaults to the input file stem)
    #[arg(long)]
    module_name: Option<String>,

    /// Print the syntax tree instead of IR
    #[arg(long)]
    emit_ast: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    let mut logger = env_logger::Builder::from_default_env();
    if args.verbose {
        logger.filter_level(log::LevelFilter::Debug);
    }
    logger.init();

    if let Err(e) = run(&args) {
        let diagnostic = match e.downcast_ref::<CompilerError>() {
            Some(err) => err.to_diagnostic(),
            None => cmf_common::Diagnostic::error(format!("{e:#}")),
        };
        eprintln!("{diagnostic}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let json = fs::read_to_string(&args.input)
        .with_context(|| format!("cannot read {}", args.input.display()))?;
    let program = Frontend::load_ast(&json)?;

    let text = if args.emit_ast {
        serde_json::to_string_pretty(&program)?
    } else {
        let module_name = args.module_name.clone().unwrap_or_else(|| {
            args.input
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| "module".to_string())
        });

        let mut module = Frontend::compile_to_ir(&program, &module_name)?;
        if !args.no_dce {
            let mut passes = PassManager::new();
            passes.run(&mut module);
        }
        info!("{} instructions after optimization", module.instruction_count());
        module.to_string()
    };

    match &args.output {
        Some(path) => fs::write(path, text).with_context(|| format!("cannot write {}", path.display()))?,
        None => print!("{text}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_arguments() {
        let args = Args::try_parse_from(["cmfc", "prog.json", "-o", "prog.ll", "--no-dce", "-v"]).unwrap();
        assert_eq!(args.input, PathBuf::from("prog.json"));
        assert_eq!(args.output, Some(PathBuf::from("prog.ll")));
        assert!(args.no_dce);
        assert!(args.verbose);
        assert!(!args.emit_ast);
        assert_eq!(args.module_name, None);
    }

    #[test]
    fn test_missing_input_is_reported() {
        let args = Args::try_parse_from(["cmfc", "/nonexistent/prog.json"]).unwrap();
        let err = run(&args).unwrap_err();
        assert!(format!("{err:#}").starts_with("cannot read /nonexistent/prog.json"));
    }
}
