use anyhow::{bail, Context, Result};
use clap::Parser;
use futures::executor::block_on;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use layer_text_sync::table::{self, read_table_file, write_table_file};
use layer_text_sync::{
    extract, extract_selection, Document, MemoryHost, Reconciler, SyncConfig, TableFormat,
    VerifyPolicy, NO_TEXT_LAYERS_MESSAGE,
};

#[derive(Parser)]
#[command(name = "layer_text_sync")]
#[command(about = "从设计文档快照中提取文本图层到表格，并按图层 ID 回写编辑后的文本")]
#[command(version = "0.1.0")]
struct Cli {
    /// 输入文档快照（JSON）
    #[arg(short, long)]
    input: PathBuf,

    /// 输出路径（提取模式为表格文件，回写模式为快照文件）
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// 表格格式：csv、tsv、json（默认按扩展名判断，否则 csv）
    #[arg(short, long)]
    format: Option<String>,

    /// 以这些节点为根提取（覆盖快照中的选区）
    #[arg(long, num_args = 1..)]
    selection: Vec<String>,

    /// 忽略选区，提取整个文档
    #[arg(long)]
    all_pages: bool,

    /// 层级路径列数
    #[arg(long)]
    frame_depth: Option<usize>,

    /// 配置文件（JSON）
    #[arg(long)]
    config: Option<PathBuf>,

    /// 回写模式：从编辑后的表格应用文本
    #[arg(long)]
    apply: Option<PathBuf>,

    /// 表格文件编码（如 shift_jis、gbk；默认 UTF-8）
    #[arg(long)]
    encoding: Option<String>,

    /// 回写后重新读取节点文本确认
    #[arg(long)]
    verify: bool,

    /// 输出表格时写入 UTF-8 BOM
    #[arg(long)]
    bom: bool,

    /// 仅显示提取统计信息
    #[arg(long)]
    stats: bool,

    /// 静默模式(仅输出警告和错误)
    #[arg(long)]
    quiet: bool,

    /// 显示调试日志
    #[arg(long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);

    validate_input(&cli.input)?;
    let config = load_config(&cli)?;

    if let Some(table_file) = &cli.apply {
        return handle_apply(&cli, &config, table_file);
    }

    // 默认模式：文本提取
    handle_extraction(&cli, &config)
}

/// 初始化日志
fn init_logging(cli: &Cli) {
    let default_level = if cli.quiet {
        "warn"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// 验证输入文件
fn validate_input(input: &Path) -> Result<()> {
    if !input.exists() {
        bail!("输入文件不存在: {:?}", input);
    }
    Ok(())
}

/// 加载配置并应用命令行覆盖
fn load_config(cli: &Cli) -> Result<SyncConfig> {
    let mut config = match &cli.config {
        Some(path) => SyncConfig::load(path).with_context(|| format!("读取配置文件失败: {:?}", path))?,
        None => SyncConfig::default(),
    };

    if let Some(depth) = cli.frame_depth {
        config.extract.frame_depth = depth;
    }
    if cli.verify {
        config.reconcile.verify = VerifyPolicy::ReadBack;
    }

    Ok(config)
}

/// 确定表格格式
fn resolve_format(cli: &Cli, path: Option<&Path>) -> Result<TableFormat> {
    if let Some(name) = &cli.format {
        return TableFormat::from_name(name)
            .with_context(|| format!("不支持的表格格式: {} (可选: {})", name, table::SUPPORTED_TABLE_EXTENSIONS.join(", ")));
    }
    Ok(path.and_then(TableFormat::from_path).unwrap_or(TableFormat::Csv))
}

/// 处理文本提取
fn handle_extraction(cli: &Cli, config: &SyncConfig) -> Result<()> {
    let mut document = Document::load(&cli.input)
        .with_context(|| format!("解析文档快照失败: {:?}", cli.input))?;

    if cli.all_pages {
        document.set_selection(Vec::new());
    } else if !cli.selection.is_empty() {
        document.set_selection(cli.selection.clone());
    }

    let extraction = if document.selection().is_empty() {
        let mut host = MemoryHost::new(document);
        block_on(extract(&mut host, &config.extract)).context("提取文本图层失败")?
    } else {
        extract_selection(&document, document.selection(), &config.extract)
    };

    if cli.stats {
        println!("{}", extraction.stats);
        return Ok(());
    }

    if extraction.is_empty() {
        if !cli.quiet {
            println!("{}", NO_TEXT_LAYERS_MESSAGE);
        }
        return Ok(());
    }

    let format = resolve_format(cli, cli.output.as_deref())?;
    let output_path = match &cli.output {
        Some(path) if same_file(path, &cli.input) => {
            bail!("表格输出路径与输入快照相同，拒绝覆盖: {:?}", path);
        }
        Some(path) => path.clone(),
        None => default_table_path(&cli.input, format),
    };

    let table = table::encode(&extraction.assets, config.extract.depth());
    write_table_file(&output_path, &table, format, cli.bom)
        .with_context(|| format!("写入表格失败: {:?}", output_path))?;

    if !cli.quiet {
        print_extraction_summary(&extraction.assets, &output_path);
    }

    Ok(())
}

/// 默认表格路径：与输入同名换扩展名；会与输入重名时改为 `<stem>.texts.<ext>`
fn default_table_path(input: &Path, format: TableFormat) -> PathBuf {
    let derived = input.with_extension(format.extension());
    if same_file(&derived, input) {
        input.with_extension(format!("texts.{}", format.extension()))
    } else {
        derived
    }
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

/// 打印提取摘要信息
fn print_extraction_summary(assets: &[layer_text_sync::TextAsset], output_path: &Path) {
    println!("提取到 {} 个文本图层", assets.len());
    println!("结果已写入: {:?}", output_path);

    // 显示样例
    println!("\n样例文本:");
    for (i, asset) in assets.iter().take(3).enumerate() {
        println!(
            "{}. [{}] {}: \"{}\"",
            i + 1,
            asset.id,
            asset.name,
            if asset.characters.chars().count() > 50 {
                format!("{}...", asset.characters.chars().take(50).collect::<String>())
            } else {
                asset.characters.clone()
            }
        );
    }

    if assets.len() > 3 {
        println!("... 还有 {} 个文本图层", assets.len() - 3);
    }
}

/// 处理回写
fn handle_apply(cli: &Cli, config: &SyncConfig, table_file: &Path) -> Result<()> {
    if !table_file.exists() {
        bail!("表格文件不存在: {:?}", table_file);
    }

    let document = Document::load(&cli.input)
        .with_context(|| format!("解析文档快照失败: {:?}", cli.input))?;

    let format = resolve_format(cli, Some(table_file))?;
    let table = read_table_file(table_file, format, cli.encoding.as_deref())
        .with_context(|| format!("读取表格失败: {:?}", table_file))?;
    let requests = table::decode(&table).with_context(|| format!("解析表格失败: {:?}", table_file))?;

    tracing::info!(rows = requests.len(), "准备回写");

    let mut host = MemoryHost::new(document);
    let report = block_on(Reconciler::new(&mut host, config.reconcile.clone()).apply(&requests));

    println!("{}", report.summary.message());

    if report.summary.applied == 0 {
        return Ok(());
    }

    let output_path = cli.output.clone().unwrap_or_else(|| cli.input.clone());
    if output_path.exists() {
        let backup = layer_text_sync::utils::create_backup(&output_path)
            .with_context(|| format!("创建备份失败: {:?}", output_path))?;
        tracing::info!(backup = ?backup, "已创建备份文件");
    }

    host.into_document()
        .save(&output_path)
        .with_context(|| format!("写入文档快照失败: {:?}", output_path))?;

    if !cli.quiet {
        println!("文档已写入: {:?}", output_path);
    }

    Ok(())
}
