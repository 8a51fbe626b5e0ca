use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use similar::{ChangeTag, TextDiff};
use std::fs;
use std::path::{Path, PathBuf};
use syntax_morph::{
    load_from_path, ClassDeclaration, FunctionDeclaration, InterfaceDeclaration, NamedNode, Node,
    Project, ProjectConfig, SourceFile, Structure, TypeAliasDeclaration, VariableStatement,
    WrapperKind, Wrapped,
};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "syntax-morph")]
#[command(about = "Inspect and rewrite TypeScript declarations through structures", long_about = None)]
#[command(version)]
struct Cli {
    /// Project configuration (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// More logging; repeat for more detail (RUST_LOG overrides)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the top-level declarations of files
    Outline {
        /// Files or directories to walk
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },

    /// Print the structure of a file or one of its declarations as JSON
    Structure {
        file: PathBuf,

        /// Top-level declaration to print instead of the whole file
        #[arg(short = 'N', long)]
        name: Option<String>,
    },

    /// Set a JSON structure onto a file or one of its declarations
    Apply {
        file: PathBuf,

        /// JSON structure to apply
        structure: PathBuf,

        /// Top-level declaration to target instead of the whole file
        #[arg(short = 'N', long)]
        name: Option<String>,

        /// Dry run - show what would be changed without modifying files
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show unified diff of changes
        #[arg(short, long)]
        diff: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match &cli.config {
        Some(path) => load_from_path(path)?,
        None => ProjectConfig::default(),
    };

    match cli.command {
        Commands::Outline { paths } => cmd_outline(&config, &paths),
        Commands::Structure { file, name } => cmd_structure(&config, &file, name.as_deref()),
        Commands::Apply {
            file,
            structure,
            name,
            dry_run,
            diff,
        } => cmd_apply(&config, &file, &structure, name.as_deref(), dry_run, diff),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("syntax_morph={level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

/// Helper: every file under `paths` the configuration covers, sorted.
fn discover_files(config: &ProjectConfig, paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for root in paths {
        if root.is_file() {
            files.push(root.clone());
            continue;
        }
        for entry in WalkDir::new(root) {
            let entry = entry?;
            if entry.file_type().is_file() && config.covers(entry.path()) {
                files.push(entry.path().to_path_buf());
            }
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

/// One-line description of a top-level statement.
fn describe(statement: &Node) -> Result<String> {
    let exported = statement.syntax_kind()? == "export_statement";
    let decl = match exported {
        true => statement
            .child_by_field("declaration")?
            .unwrap_or_else(|| statement.clone()),
        false => statement.clone(),
    };
    let label = match decl.kind() {
        WrapperKind::FunctionDeclaration => {
            format!("function {}", decl.cast_or_err::<FunctionDeclaration>()?.name()?)
        }
        WrapperKind::ClassDeclaration => {
            let class = decl.cast_or_err::<ClassDeclaration>()?;
            format!(
                "class {} ({} properties, {} methods)",
                class.name()?,
                class.properties()?.len(),
                class.methods()?.len()
            )
        }
        WrapperKind::InterfaceDeclaration => {
            format!("interface {}", decl.cast_or_err::<InterfaceDeclaration>()?.name()?)
        }
        WrapperKind::TypeAliasDeclaration => {
            format!("type {}", decl.cast_or_err::<TypeAliasDeclaration>()?.name()?)
        }
        WrapperKind::VariableStatement => {
            let statement = decl.cast_or_err::<VariableStatement>()?;
            let names = statement
                .declarations()?
                .iter()
                .map(|d| d.name())
                .collect::<Result<Vec<_>, _>>()?;
            format!("{} {}", statement.declaration_kind()?, names.join(", "))
        }
        _ => decl.syntax_kind()?.to_string(),
    };
    Ok(match exported {
        true => format!("export {label}"),
        false => label,
    })
}

fn cmd_outline(config: &ProjectConfig, paths: &[PathBuf]) -> Result<()> {
    let project = Project::from_config(config)?;
    let files = discover_files(config, paths)?;
    if files.is_empty() {
        println!("{}", "No matching files found".yellow());
        return Ok(());
    }

    for path in files {
        let file = project
            .add_source_file_at_path(&path)
            .with_context(|| format!("failed to load {}", path.display()))?;
        println!("{}", path.display().to_string().bold());
        for statement in file.statements()? {
            println!(
                "  {:>4}  {}",
                statement.start_line_number()?.to_string().dimmed(),
                describe(&statement)?
            );
        }
    }
    Ok(())
}

/// The node a command targets: a named top-level declaration or the file itself.
fn target(file: &SourceFile, name: Option<&str>) -> Result<Node> {
    let Some(name) = name else {
        return Ok(file.node().clone());
    };
    if let Some(function) = file.function(name)? {
        return Ok(function.node().clone());
    }
    if let Some(class) = file.class(name)? {
        return Ok(class.node().clone());
    }
    if let Some(interface) = file.interface(name)? {
        return Ok(interface.node().clone());
    }
    if let Some(alias) = file.type_alias(name)? {
        return Ok(alias.node().clone());
    }
    for statement in file.variable_statements()? {
        if statement.declaration(name)?.is_some() {
            return Ok(statement.node().clone());
        }
    }
    anyhow::bail!("No top-level declaration named `{name}`")
}

fn cmd_structure(config: &ProjectConfig, path: &Path, name: Option<&str>) -> Result<()> {
    let project = Project::from_config(config)?;
    let file = project
        .add_source_file_at_path(path)
        .with_context(|| format!("failed to load {}", path.display()))?;
    let node = target(&file, name)?;
    println!("{}", node.structure()?.to_json_pretty()?);
    Ok(())
}

/// Helper: Show unified diff between original and modified content
fn display_diff(file: &Path, original: &str, modified: &str) {
    println!("\n{}", format!("--- {} (original)", file.display()).dimmed());
    println!("{}", format!("+++ {} (modified)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, modified);
    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => format!("-{}", change).red(),
            ChangeTag::Insert => format!("+{}", change).green(),
            ChangeTag::Equal => format!(" {}", change).normal(),
        };
        print!("{}", sign);
    }
}

fn cmd_apply(
    config: &ProjectConfig,
    path: &Path,
    structure_path: &Path,
    name: Option<&str>,
    dry_run: bool,
    show_diff: bool,
) -> Result<()> {
    let json = fs::read_to_string(structure_path)
        .with_context(|| format!("failed to read {}", structure_path.display()))?;
    let structure = Structure::from_json(&json)?;

    let project = Project::from_config(config)?;
    let file = project
        .add_source_file_at_path(path)
        .with_context(|| format!("failed to load {}", path.display()))?;
    let original = file.full_text()?;

    let node = target(&file, name)?;
    let morph = node.set_structure(&structure)?;
    let modified = file.full_text()?;

    if original == modified {
        println!("{}", "No changes".dimmed());
        return Ok(());
    }
    if show_diff {
        display_diff(path, &original, &modified);
    }
    if morph.was_replaced() {
        println!(
            "{}",
            format!("{} was replaced by a new {}", name.unwrap_or("node"), morph.node().kind())
                .yellow()
        );
    }
    if dry_run {
        println!("{}", "Dry run: nothing written".yellow());
    } else {
        file.save()?;
        println!("{} {}", "Updated".green(), path.display());
    }
    Ok(())
}
