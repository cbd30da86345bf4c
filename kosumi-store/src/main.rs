use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use kosumi_core::{Color, FormatReport, GameRecord, StoneWalker, TreeFormatter, WalkerConfig};
use kosumi_store::StorageManager;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// 围棋棋谱查看工具
#[derive(Parser, Debug)]
#[command(name = "kosumi-inspect")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 列出保存的棋谱
    List,

    /// 显示棋谱和指定手数的棋盘
    Show {
        /// 棋谱 ID（文件名）
        session: String,

        /// 跳到第 N 手，默认显示主分支末端
        #[arg(short = 'm', long = "move")]
        at: Option<u32>,

        /// 显示从根节点到当前节点的着手
        #[arg(short, long)]
        branch: bool,
    },

    /// 导入 JSON 棋谱
    Import {
        /// 棋谱文件
        file: PathBuf,

        /// 棋谱名称，默认使用文件名
        #[arg(short, long)]
        name: Option<String>,
    },
}

fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("kosumi_store=info".parse()?)
            .add_directive("kosumi_core=info".parse()?))
        .init();

    let cli = Cli::parse();
    let storage = StorageManager::new()?;

    match cli.command {
        Command::List => list(&storage),
        Command::Show { session, at, branch } => show(&storage, &session, at, branch),
        Command::Import { file, name } => import(&storage, file, name),
    }
}

fn list(storage: &StorageManager) -> Result<()> {
    let sessions = storage.list_sessions()?;
    if sessions.is_empty() {
        println!("没有保存的棋谱 ({})", storage.sessions_directory().display());
        return Ok(());
    }

    for session in sessions {
        println!(
            "{}  {}  {} 个节点  {}",
            session.saved_at.format("%Y-%m-%d %H:%M"),
            session.name,
            session.node_count,
            session.session_id
        );
    }
    Ok(())
}

fn show(storage: &StorageManager, session: &str, target: Option<u32>, branch: bool) -> Result<()> {
    let record = storage.load_session(session)?;
    let summary = record.to_text();
    let config = storage.load_config();
    let (mut walker, report) = StorageManager::open_record(record, &config, WalkerConfig::default())
        .with_context(|| format!("打开棋谱失败: {}", session))?;

    print_defects(&report);

    match target {
        Some(n) if walker.current_node().move_number() == n => {}
        Some(n) => {
            walker
                .move_to(n)
                .with_context(|| format!("主分支上没有第 {} 手", n))?;
        }
        None => {
            walker.terminal_node();
        }
    }

    println!("{}", summary);
    if branch {
        print_branch(&walker);
    }

    let node = walker.current_node();
    let latest = node
        .state()
        .latest()
        .and_then(|point| point.to_token())
        .unwrap_or_else(|| "-".to_string());
    println!("节点 {}  第 {} 手  最新一手 {}", node.id(), node.move_number(), latest);
    print!("{}", node.state().to_text());
    Ok(())
}

fn print_defects(report: &FormatReport) {
    for defect in &report.defects {
        println!("警告: 节点 {} 含有根属性 {}", defect.node, defect.key);
    }
}

/// 打印从根节点到当前节点的着手
fn print_branch(walker: &StoneWalker) {
    let tree = walker.tree();
    let moves: Vec<String> = tree
        .path_to(walker.current())
        .into_iter()
        .filter_map(|id| {
            let node = &tree[id];
            [Color::Black, Color::White].into_iter().find_map(|color| {
                let key = color.move_key();
                node.property(key)
                    .and_then(|v| v.first())
                    .map(|point| format!("{}. {}[{}]", node.move_number(), key, point))
            })
        })
        .collect();

    println!("当前分支：");
    for line in moves.chunks(2) {
        println!("{}", line.join("  "));
    }
    println!();
}

fn import(storage: &StorageManager, file: PathBuf, name: Option<String>) -> Result<()> {
    let content = fs::read_to_string(&file)
        .with_context(|| format!("读取文件失败: {:?}", file))?;
    let record = GameRecord::from_json(&content).context("解析棋谱文件失败")?;

    let name = name
        .or_else(|| file.file_stem().and_then(|s| s.to_str()).map(String::from))
        .unwrap_or_else(|| record.metadata.name.clone());

    let mut tree = record.into_tree().context("棋谱结构无效")?;
    let report = TreeFormatter::new(storage.load_config())
        .format(&mut tree)
        .context("格式化棋谱失败")?;

    print_defects(&report);

    let session_id = storage.save_tree(&name, &tree)?;
    info!("导入 {:?}: {} 个节点", file, report.nodes_visited);
    println!("已导入: {}", session_id);
    Ok(())
}
