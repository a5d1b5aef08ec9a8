use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::{debug, LevelFilter};
use pastepad_core::{Playground, PlaygroundError, StdinMode, SAMPLES};
use pastepad_inputs::InputSchema;
use pastepad_project::format_kib;
use pastepad_runexec::{HttpTransport, LineKind};
use pastepad_settings::{Preferences, PreferencesStore};

#[derive(Parser)]
#[command(
    name = "pastepad-cli",
    about = "Inspect, preview and run multi-file PastePad projects",
    author,
    version
)]
struct Cli {
    /// 指定工作區根目錄；預設為目前目錄。 / Workspace root (defaults to current directory).
    #[arg(long, global = true, value_name = "PATH")]
    workspace: Option<PathBuf>,
    /// 輸出除錯紀錄。 / Emit debug logging (overrides RUST_LOG).
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 列出專案檔案與統計。 / List project files with sizes and totals.
    Parse(ProjectArgs),
    /// 顯示資料夾樹。 / Print the folder tree.
    Tree(ViewArgs),
    /// 組合網頁預覽。 / Compose the HTML preview document.
    Preview(PreviewArgs),
    /// 顯示偵測語言與輸入欄位。 / Show the detected language and input fields.
    Inputs(ViewArgs),
    /// 送至遠端執行。 / Run the project on the configured execution endpoint.
    Run(RunArgs),
    /// 將專案寫出為資料夾。 / Write every project file into a directory.
    Export(ExportArgs),
    /// 匯入資料夾或文字檔並輸出專案文字。 / Import a directory or text file and print the project text.
    Import(ImportArgs),
    /// 列出或輸出內建範例。 / List or print the built-in samples.
    Sample(SampleArgs),
    /// 匯入/匯出偏好設定。 / Import or export preferences.
    #[command(subcommand)]
    Preferences(PreferencesCommand),
}

#[derive(Args)]
struct ProjectArgs {
    /// 專案文字檔或資料夾。 / Project text file or directory.
    #[arg(value_name = "PROJECT")]
    project: PathBuf,
}

#[derive(Args)]
struct ViewArgs {
    #[command(flatten)]
    source: ProjectArgs,
    /// 以 JSON 輸出。 / Print JSON instead of text.
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct PreviewArgs {
    #[command(flatten)]
    source: ProjectArgs,
    /// 寫入檔案而非標準輸出。 / Write the document to a file instead of stdout.
    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct RunArgs {
    #[command(flatten)]
    source: ProjectArgs,
    /// 依欄位順序提供的輸入值。 / Input values in slot order.
    #[arg(long = "input", value_name = "VALUE")]
    inputs: Vec<String>,
    /// 原樣傳送的標準輸入。 / Raw stdin passed through verbatim.
    #[arg(long, value_name = "TEXT", conflicts_with = "inputs")]
    stdin: Option<String>,
    /// 覆寫設定中的執行端點。 / Override the configured execution endpoint.
    #[arg(long, value_name = "URL")]
    endpoint: Option<String>,
}

#[derive(Args)]
struct ExportArgs {
    #[command(flatten)]
    source: ProjectArgs,
    /// 輸出資料夾；預設為工作區下的專案名稱。 / Destination directory; defaults to the project name under the workspace.
    #[arg(long, value_name = "DIR")]
    output: Option<PathBuf>,
    /// 專案名稱。 / Project name used for the archive name.
    #[arg(long)]
    name: Option<String>,
}

#[derive(Args)]
struct ImportArgs {
    /// 來源資料夾或文字檔。 / Source directory or text file.
    #[arg(value_name = "PATH")]
    source: PathBuf,
}

#[derive(Args)]
struct SampleArgs {
    /// 要輸出的範例；略過時列出全部。 / Sample to print; lists all when omitted.
    #[arg(value_enum)]
    name: Option<SampleChoice>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SampleChoice {
    Python,
    C,
    Web,
}

impl SampleChoice {
    fn label(self) -> &'static str {
        match self {
            SampleChoice::Python => "Python",
            SampleChoice::C => "C",
            SampleChoice::Web => "Web",
        }
    }
}

#[derive(Subcommand)]
enum PreferencesCommand {
    /// 匯出目前偏好設定。 / Export current preferences.
    Export(PreferencesExportArgs),
    /// 匯入偏好設定 JSON。 / Import preferences from JSON.
    Import(PreferencesImportArgs),
}

#[derive(Args)]
struct PreferencesExportArgs {
    /// 輸出檔案路徑。 / Destination file path.
    #[arg(long, value_name = "FILE")]
    output: PathBuf,
}

#[derive(Args)]
struct PreferencesImportArgs {
    /// 輸入檔案路徑。 / Source preferences JSON.
    #[arg(value_name = "FILE")]
    input: PathBuf,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let Cli {
        workspace,
        verbose,
        command,
    } = Cli::parse();
    init_logging(verbose);

    let workspace_root = resolve_workspace(workspace)?;
    match command {
        Commands::Preferences(subcommand) => {
            execute_preferences_command(subcommand, &workspace_root)
        }
        Commands::Sample(args) => print_sample(args),
        Commands::Import(args) => {
            let preferences = load_preferences(&workspace_root)?;
            import_project(args, &preferences)
        }
        command => {
            let preferences = load_preferences(&workspace_root)?;
            execute_project_command(command, &preferences, &workspace_root)
        }
    }
}

fn init_logging(verbose: bool) {
    let mut builder = env_logger::Builder::from_default_env();
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.init();
}

fn execute_project_command(
    command: Commands,
    preferences: &Preferences,
    workspace_root: &Path,
) -> Result<()> {
    match command {
        Commands::Parse(args) => {
            let playground = open_project(&args.project, preferences)?;
            print_file_list(&playground);
            Ok(())
        }
        Commands::Tree(args) => {
            let playground = open_project(&args.source.project, preferences)?;
            print_tree(&playground, args.json)
        }
        Commands::Preview(args) => {
            let playground = open_project(&args.source.project, preferences)?;
            write_preview(&playground, args.output.as_deref())
        }
        Commands::Inputs(args) => {
            let playground = open_project(&args.source.project, preferences)?;
            print_inputs(&playground, args.json)
        }
        Commands::Run(args) => {
            let playground = open_project(&args.source.project, preferences)?;
            run_project(playground, args, preferences)
        }
        Commands::Export(args) => {
            let playground = open_project(&args.source.project, preferences)?;
            export_project(&playground, args, workspace_root)
        }
        Commands::Import(_) | Commands::Sample(_) | Commands::Preferences(_) => {
            Err(anyhow!("command does not operate on a project"))
        }
    }
}

fn open_project(path: &Path, preferences: &Preferences) -> Result<Playground> {
    let path = resolve_input_path(path)?;
    if !path.exists() {
        bail!("project '{}' does not exist", path.display());
    }
    let mut playground = Playground::from_preferences(preferences);
    playground
        .import_path(&path)
        .with_context(|| format!("failed to load project {}", path.display()))?;
    debug!(
        "loaded {} ({} file(s), revision {})",
        path.display(),
        playground.files().len(),
        playground.revision()
    );
    Ok(playground)
}

fn print_file_list(playground: &Playground) {
    for (path, content) in playground.files().iter() {
        println!("{path}  {} KB", format_kib(content.len(), 2));
    }
    let stats = playground.stats();
    println!(
        "{} file(s), {} bytes ({} KB)",
        stats.file_count,
        stats.total_bytes,
        stats.total_kib()
    );
    println!("{}", playground.editor_stats());
}

fn print_tree(playground: &Playground, json: bool) -> Result<()> {
    let tree = playground.file_tree();
    if json {
        let payload =
            serde_json::to_string_pretty(&tree).context("failed to serialize file tree")?;
        println!("{payload}");
    } else {
        for line in tree.render_lines() {
            println!("{line}");
        }
    }
    Ok(())
}

fn write_preview(playground: &Playground, output: Option<&Path>) -> Result<()> {
    let document = playground
        .preview()
        .ok_or_else(|| anyhow!("project has no HTML file to preview"))?;
    match output {
        Some(path) => {
            let path = resolve_input_path(path)?;
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            fs::write(&path, document.as_bytes())
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Wrote preview to {}", path.display());
        }
        None => println!("{document}"),
    }
    Ok(())
}

fn print_inputs(playground: &Playground, json: bool) -> Result<()> {
    let schema = playground.inputs();
    if json {
        let payload =
            serde_json::to_string_pretty(schema).context("failed to serialize inputs")?;
        println!("{payload}");
        return Ok(());
    }

    println!("Language: {}", playground.language());
    match schema {
        InputSchema::NotNeeded => println!("No input needed."),
        InputSchema::Scanned { fields, .. } => {
            for field in fields {
                println!("[{}] {}", field.slot_index, field.label);
            }
            if let Some(hint) = schema.hint() {
                println!("{hint}");
            }
        }
    }
    Ok(())
}

fn run_project(mut playground: Playground, args: RunArgs, preferences: &Preferences) -> Result<()> {
    match args.stdin {
        Some(raw) => playground.set_stdin_mode(StdinMode::Manual(raw)),
        None => {
            for (slot, value) in args.inputs.into_iter().enumerate() {
                playground.set_input_value(slot, value)?;
            }
        }
    }

    let endpoint = args
        .endpoint
        .unwrap_or_else(|| preferences.execution.endpoint.clone());
    let transport = HttpTransport::new(endpoint);
    let ticket = match playground.prepare_run() {
        Ok(ticket) => ticket,
        Err(PlaygroundError::MissingInputs { slots }) => {
            let labels: Vec<String> = slots
                .iter()
                .filter_map(|slot| playground.inputs().fields().get(*slot))
                .map(|field| format!("[{}] {}", field.slot_index, field.label))
                .collect();
            bail!("missing input values: {}", labels.join(", "));
        }
        Err(err) => return Err(err.into()),
    };
    debug!(
        "sending {} ({} stdin bytes) to {}",
        ticket.request().language,
        ticket.request().stdin.len(),
        transport.endpoint()
    );
    let completion = ticket.dispatch(&transport);
    let lines = playground
        .accept_run(completion)
        .ok_or_else(|| anyhow!("run result no longer matches the project"))?;

    for line in lines {
        match line.kind {
            LineKind::Output | LineKind::Info => println!("{}", line.text),
            LineKind::Error => eprintln!("{}", line.text),
        }
    }
    Ok(())
}

fn export_project(playground: &Playground, args: ExportArgs, workspace_root: &Path) -> Result<()> {
    if playground.files().is_empty() {
        bail!("project has no files to export");
    }
    let archive_name = playground.archive_name(args.name.as_deref());
    let output = match args.output {
        Some(path) => resolve_input_path(&path)?,
        None => workspace_root.join(archive_name.trim_end_matches(".zip")),
    };
    let written = playground
        .export_to(&output)
        .with_context(|| format!("failed to export project to {}", output.display()))?;
    println!(
        "Exported {written} file(s) of {archive_name} to {}",
        output.display()
    );
    Ok(())
}

fn import_project(args: ImportArgs, preferences: &Preferences) -> Result<()> {
    let playground = open_project(&args.source, preferences)?;
    print!("{}", playground.raw_text());
    Ok(())
}

fn print_sample(args: SampleArgs) -> Result<()> {
    match args.name {
        Some(choice) => {
            let sample = SAMPLES
                .iter()
                .find(|sample| sample.name == choice.label())
                .ok_or_else(|| anyhow!("sample '{}' is not available", choice.label()))?;
            print!("{}", sample.text);
        }
        None => {
            println!("Available samples:");
            for sample in &SAMPLES {
                println!("  - {}", sample.name);
            }
        }
    }
    Ok(())
}

fn execute_preferences_command(command: PreferencesCommand, workspace_root: &Path) -> Result<()> {
    match command {
        PreferencesCommand::Export(args) => export_preferences(args, workspace_root),
        PreferencesCommand::Import(args) => import_preferences(args, workspace_root),
    }
}

fn export_preferences(args: PreferencesExportArgs, workspace_root: &Path) -> Result<()> {
    let prefs_path = preferences_path(workspace_root);
    let store = PreferencesStore::load(&prefs_path)
        .with_context(|| format!("failed to load preferences from {}", prefs_path.display()))?;
    let output = resolve_input_path(&args.output)?;
    store
        .export_to(&output)
        .with_context(|| format!("failed to export preferences to {}", output.display()))?;
    println!("Exported preferences to {}", output.display());
    Ok(())
}

fn import_preferences(args: PreferencesImportArgs, workspace_root: &Path) -> Result<()> {
    let prefs_path = preferences_path(workspace_root);
    let mut store = PreferencesStore::load(&prefs_path)
        .with_context(|| format!("failed to load preferences from {}", prefs_path.display()))?;
    let input = resolve_input_path(&args.input)?;
    if !input.exists() {
        bail!("preferences file '{}' does not exist", input.display());
    }
    store
        .import_from(&input)
        .with_context(|| format!("failed to import preferences from {}", input.display()))?;
    println!("Imported preferences from {}", input.display());
    Ok(())
}

fn load_preferences(workspace_root: &Path) -> Result<Preferences> {
    let prefs_path = preferences_path(workspace_root);
    let store = PreferencesStore::load(&prefs_path)
        .with_context(|| format!("failed to load preferences from {}", prefs_path.display()))?;
    Ok(store.preferences().clone())
}

fn preferences_path(workspace_root: &Path) -> PathBuf {
    workspace_root.join(".pastepad").join("preferences.json")
}

fn resolve_workspace(workspace: Option<PathBuf>) -> Result<PathBuf> {
    match workspace {
        Some(path) => resolve_input_path(&path),
        None => std::env::current_dir().context("determine current directory"),
    }
}

fn resolve_input_path(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()
            .context("determine current directory")?
            .join(path))
    }
}
