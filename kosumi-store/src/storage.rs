//! 棋谱存储系统
//!
//! 提供跨平台的棋谱保存、加载和格式化规则配置的持久化

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use kosumi_core::{
    FormatReport, FormatterConfig, GameRecord, GameTree, StoneWalker, TreeFormatter, WalkerConfig,
};
use tracing::{info, warn};

/// 同一秒内同名棋谱的最大序号
const MAX_FILENAME_ATTEMPTS: usize = 100;

/// 存储管理器
pub struct StorageManager {
    sessions_dir: PathBuf,
    config_path: PathBuf,
}

impl StorageManager {
    /// 创建存储管理器（使用系统数据目录）
    pub fn new() -> Result<Self> {
        let sessions_dir = get_sessions_directory()?;
        let config_path = get_config_path()?;
        Self::with_paths(sessions_dir, config_path)
    }

    /// 使用指定目录创建存储管理器
    pub fn with_paths(sessions_dir: PathBuf, config_path: PathBuf) -> Result<Self> {
        // 确保目录存在
        if !sessions_dir.exists() {
            fs::create_dir_all(&sessions_dir)
                .with_context(|| format!("无法创建存储目录: {:?}", sessions_dir))?;
        }

        Ok(Self {
            sessions_dir,
            config_path,
        })
    }

    /// 保存棋谱记录
    pub fn save_session(&self, record: &mut GameRecord) -> Result<String> {
        let timestamp = Utc::now();
        record.metadata.saved_at = Some(timestamp);

        // 序列化并保存
        let json_content = record.to_json().context("序列化棋谱失败")?;

        let (filename, mut file) = self.create_session_file(&timestamp, &record.metadata.name)?;
        let filepath = self.sessions_dir.join(&filename);
        file.write_all(json_content.as_bytes())
            .with_context(|| format!("写入文件失败: {:?}", filepath))?;

        info!("棋谱已保存: {:?}", filepath);
        Ok(filename)
    }

    /// 创建新的棋谱文件，同名文件已存在时追加序号，不覆盖
    fn create_session_file(&self, timestamp: &DateTime<Utc>, name: &str) -> Result<(String, File)> {
        let base = generate_filename(timestamp, name);
        let stem = base.trim_end_matches(".json");

        for attempt in 0..MAX_FILENAME_ATTEMPTS {
            let filename = match attempt {
                0 => base.clone(),
                n => format!("{}_{}.json", stem, n),
            };
            let filepath = self.sessions_dir.join(&filename);

            match OpenOptions::new().write(true).create_new(true).open(&filepath) {
                Ok(file) => return Ok((filename, file)),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    return Err(e).with_context(|| format!("创建文件失败: {:?}", filepath));
                }
            }
        }

        anyhow::bail!("无法为棋谱 {} 生成不重复的文件名", name)
    }

    /// 保存棋谱树
    pub fn save_tree(&self, name: &str, tree: &GameTree) -> Result<String> {
        let mut record = GameRecord::from_tree(name, tree);
        self.save_session(&mut record)
    }

    /// 加载棋谱记录
    pub fn load_session(&self, session_id: &str) -> Result<GameRecord> {
        let filepath = self.sessions_dir.join(session_id);

        if !filepath.exists() {
            anyhow::bail!("棋谱文件不存在: {}", session_id);
        }

        let content = fs::read_to_string(&filepath)
            .with_context(|| format!("读取文件失败: {:?}", filepath))?;

        GameRecord::from_json(&content).context("解析棋谱文件失败")
    }

    /// 打开棋谱：加载、重建棋谱树、格式化，然后创建浏览器
    pub fn open_session(
        &self,
        session_id: &str,
        formatter: &FormatterConfig,
        walker: WalkerConfig,
    ) -> Result<(StoneWalker, FormatReport)> {
        let record = self.load_session(session_id)?;
        Self::open_record(record, formatter, walker)
            .with_context(|| format!("打开棋谱失败: {}", session_id))
    }

    /// 从已加载的记录重建棋谱树、格式化，然后创建浏览器
    pub fn open_record(
        record: GameRecord,
        formatter: &FormatterConfig,
        walker: WalkerConfig,
    ) -> Result<(StoneWalker, FormatReport)> {
        let name = record.metadata.name.clone();
        let mut tree = record.into_tree().context("棋谱结构无效")?;

        let report = TreeFormatter::new(formatter.clone())
            .format(&mut tree)
            .context("格式化棋谱失败")?;

        if !report.defects.is_empty() {
            warn!("棋谱 {} 含有 {} 个根属性错误", name, report.defects.len());
        }
        info!(
            "已打开棋谱 {}: {} 个节点, 展开 {} 个压缩值",
            name, report.nodes_visited, report.expanded
        );

        Ok((StoneWalker::with_config(tree, walker), report))
    }

    /// 列出所有保存的棋谱
    pub fn list_sessions(&self) -> Result<Vec<SessionInfo>> {
        let mut sessions = Vec::new();

        if !self.sessions_dir.exists() {
            return Ok(sessions);
        }

        let entries = fs::read_dir(&self.sessions_dir)
            .with_context(|| format!("读取存储目录失败: {:?}", self.sessions_dir))?;

        for entry in entries {
            let entry = entry.context("读取目录项失败")?;
            let path = entry.path();

            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            let Some(filename) = path.file_name().and_then(|s| s.to_str()) else {
                continue;
            };

            match self.load_session(filename) {
                Ok(record) => {
                    sessions.push(SessionInfo {
                        session_id: filename.to_string(),
                        name: record.metadata.name,
                        saved_at: record.metadata.saved_at.unwrap_or_else(|| {
                            // 使用文件修改时间作为后备
                            entry
                                .metadata()
                                .and_then(|m| m.modified())
                                .map(DateTime::from)
                                .unwrap_or_else(|_| Utc::now())
                        }),
                        node_count: record.nodes.len(),
                    });
                }
                Err(e) => {
                    // 跳过损坏的文件
                    warn!("跳过无法解析的棋谱 {}: {:#}", filename, e);
                }
            }
        }

        // 按保存时间倒序排列
        sessions.sort_by(|a, b| b.saved_at.cmp(&a.saved_at));
        Ok(sessions)
    }

    /// 删除保存的棋谱
    pub fn delete_session(&self, session_id: &str) -> Result<()> {
        let filepath = self.sessions_dir.join(session_id);

        if filepath.exists() {
            fs::remove_file(&filepath)
                .with_context(|| format!("删除文件失败: {:?}", filepath))?;
            info!("棋谱已删除: {:?}", filepath);
        }

        Ok(())
    }

    /// 加载格式化规则，文件不存在或无效时使用默认规则
    pub fn load_config(&self) -> FormatterConfig {
        if !self.config_path.exists() {
            info!("规则文件不存在，使用默认规则");
            return FormatterConfig::default();
        }

        match fs::read_to_string(&self.config_path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(config) => {
                    info!("已加载规则: {:?}", self.config_path);
                    config
                }
                Err(e) => {
                    warn!("规则文件格式无效: {}，使用默认规则", e);
                    FormatterConfig::default()
                }
            },
            Err(e) => {
                warn!("无法读取规则文件: {}，使用默认规则", e);
                FormatterConfig::default()
            }
        }
    }

    /// 保存格式化规则
    pub fn save_config(&self, config: &FormatterConfig) -> Result<()> {
        // 确保目录存在
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("无法创建配置目录: {:?}", parent))?;
        }

        let content = serde_json::to_string_pretty(config).context("序列化规则失败")?;
        fs::write(&self.config_path, content)
            .with_context(|| format!("写入规则文件失败: {:?}", self.config_path))?;

        info!("规则已保存: {:?}", self.config_path);
        Ok(())
    }

    /// 获取存储目录路径
    pub fn sessions_directory(&self) -> &Path {
        &self.sessions_dir
    }
}

/// 保存的棋谱信息
#[derive(Debug, Clone)]
pub struct SessionInfo {
    /// 棋谱 ID（文件名）
    pub session_id: String,
    /// 棋谱名称
    pub name: String,
    /// 保存时间
    pub saved_at: DateTime<Utc>,
    /// 节点数量
    pub node_count: usize,
}

/// 获取跨平台存储目录
fn get_sessions_directory() -> Result<PathBuf> {
    let app_data_dir = dirs::data_dir().context("无法获取应用数据目录")?;

    Ok(app_data_dir.join("kosumi").join("sessions"))
}

/// 获取规则文件路径
fn get_config_path() -> Result<PathBuf> {
    let config_dir = dirs::config_dir().context("无法获取配置目录")?;

    Ok(config_dir.join("kosumi").join("rules.json"))
}

/// 生成文件名
fn generate_filename(timestamp: &DateTime<Utc>, name: &str) -> String {
    let timestamp_str = timestamp.format("%Y%m%d_%H%M%S").to_string();
    format!("{}_{}.json", timestamp_str, sanitize_filename(name))
}

/// 清理文件名中的特殊字符
fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use kosumi_core::{Color, Goban, Point, Properties, PropertyRules, Stone};
    use tempfile::TempDir;

    fn create_test_storage() -> (StorageManager, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let storage = StorageManager {
            sessions_dir: temp_dir.path().join("sessions"),
            config_path: temp_dir.path().join("config").join("rules.json"),
        };
        fs::create_dir_all(&storage.sessions_dir).unwrap();
        (storage, temp_dir)
    }

    fn sample_tree() -> GameTree {
        let mut root_props = Properties::new();
        root_props.insert("AB".to_string(), vec!["aa:bb".to_string()]);
        root_props.insert("SZ".to_string(), vec!["5".to_string()]);
        let mut tree = GameTree::new(
            root_props,
            Goban::from_rows(&["BB...", "BB...", ".....", ".....", "....."]).unwrap(),
        );

        let mut props = Properties::new();
        props.insert("W".to_string(), vec!["dd".to_string()]);
        props.insert("FF".to_string(), vec!["4".to_string()]);
        let n1 = tree
            .add_child(
                tree.root(),
                1,
                props,
                Goban::from_rows(&["BB...", "BB...", ".....", "...w.", "....."]).unwrap(),
            )
            .unwrap();

        let mut props = Properties::new();
        props.insert("B".to_string(), vec!["cc".to_string()]);
        tree.add_child(
            n1,
            2,
            props,
            Goban::from_rows(&["BB...", "BB...", "..b..", "...W.", "....."]).unwrap(),
        )
        .unwrap();
        tree
    }

    #[test]
    fn test_save_and_load_session() {
        let (storage, _temp_dir) = create_test_storage();

        let session_id = storage.save_tree("让子棋", &sample_tree()).unwrap();
        assert!(session_id.ends_with("_让子棋.json"));

        let loaded = storage.load_session(&session_id).unwrap();
        assert_eq!(loaded.metadata.name, "让子棋");
        assert_eq!(loaded.nodes.len(), 3);
        assert!(loaded.metadata.saved_at.is_some());
    }

    #[test]
    fn test_open_session() {
        let (storage, _temp_dir) = create_test_storage();
        let session_id = storage.save_tree("对局", &sample_tree()).unwrap();

        let (mut walker, report) = storage
            .open_session(&session_id, &FormatterConfig::default(), WalkerConfig::default())
            .unwrap();

        assert_eq!(report.nodes_visited, 3);
        assert_eq!(report.expanded, 1);
        assert_eq!(report.defects.len(), 1);
        assert_eq!(report.defects[0].key, "FF");

        let root = walker.current_node();
        assert_eq!(root.property("AB").unwrap().len(), 4);
        assert_eq!(root.property("AP").unwrap(), &["Kosumi:0.1.0".to_string()][..]);

        let terminal = walker.terminal_node().unwrap();
        assert_eq!(walker.current(), terminal);
        assert_eq!(walker.current_node().move_number(), 2);
        assert_eq!(
            walker.value_at_intersection(Point::new(2, 2)).unwrap(),
            Some(Stone::latest(Color::Black))
        );
    }

    #[test]
    fn test_open_record() {
        let (storage, _temp_dir) = create_test_storage();
        let session_id = storage.save_tree("对局", &sample_tree()).unwrap();

        let record = storage.load_session(&session_id).unwrap();
        let summary = record.to_text();
        let (walker, report) =
            StorageManager::open_record(record, &FormatterConfig::default(), WalkerConfig::default())
                .unwrap();

        assert!(summary.contains("1. W[dd]  2. B[cc]"));
        assert_eq!(report.nodes_visited, 3);
        assert_eq!(walker.tree().len(), 3);
    }

    #[test]
    fn test_same_name_saves_do_not_overwrite() {
        let (storage, _temp_dir) = create_test_storage();

        let first = storage.save_tree("同名", &sample_tree()).unwrap();
        let second = storage.save_tree("同名", &sample_tree()).unwrap();
        assert_ne!(first, second);
        assert_eq!(storage.list_sessions().unwrap().len(), 2);

        // 同一时间戳下依次追加序号
        let timestamp = DateTime::parse_from_rfc3339("2026-01-09T15:30:22Z")
            .unwrap()
            .with_timezone(&Utc);
        let names: Vec<String> = (0..3)
            .map(|_| storage.create_session_file(&timestamp, "名人战").unwrap().0)
            .collect();
        assert_eq!(
            names,
            vec![
                "20260109_153022_名人战.json",
                "20260109_153022_名人战_1.json",
                "20260109_153022_名人战_2.json",
            ]
        );
    }

    #[test]
    fn test_open_missing_session() {
        let (storage, _temp_dir) = create_test_storage();
        let result = storage.open_session(
            "不存在.json",
            &FormatterConfig::default(),
            WalkerConfig::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_open_malformed_range_fails() {
        let (storage, _temp_dir) = create_test_storage();

        let mut tree = sample_tree();
        tree.node_mut(tree.root())
            .unwrap()
            .set_property("AW", vec!["aa:".to_string()]);
        let session_id = storage.save_tree("坏棋谱", &tree).unwrap();

        let err = storage
            .open_session(&session_id, &FormatterConfig::default(), WalkerConfig::default())
            .err()
            .unwrap();
        assert!(format!("{:#}", err).contains("格式化棋谱失败"));
    }

    #[test]
    fn test_list_sessions() {
        let (storage, _temp_dir) = create_test_storage();

        for i in 1..=3 {
            storage.save_tree(&format!("棋谱{}", i), &sample_tree()).unwrap();
        }
        // 损坏的文件被跳过
        fs::write(storage.sessions_directory().join("broken.json"), "{").unwrap();

        let sessions = storage.list_sessions().unwrap();
        assert_eq!(sessions.len(), 3);
        assert!(sessions.iter().all(|s| s.node_count == 3));

        // 验证排序（最新的在前）
        for i in 0..sessions.len() - 1 {
            assert!(sessions[i].saved_at >= sessions[i + 1].saved_at);
        }
    }

    #[test]
    fn test_delete_session() {
        let (storage, _temp_dir) = create_test_storage();
        let session_id = storage.save_tree("待删除", &sample_tree()).unwrap();

        storage.delete_session(&session_id).unwrap();
        assert!(storage.list_sessions().unwrap().is_empty());
        assert!(storage.load_session(&session_id).is_err());

        // 删除不存在的文件不报错
        storage.delete_session(&session_id).unwrap();
    }

    #[test]
    fn test_config_roundtrip() {
        let (storage, _temp_dir) = create_test_storage();

        // 没有规则文件时使用默认规则
        assert_eq!(storage.load_config(), FormatterConfig::default());

        let config = FormatterConfig {
            app_identity: "Kosumi:test".to_string(),
            rules: PropertyRules::default().with_compressible(["XL"]),
            ..FormatterConfig::default()
        };
        storage.save_config(&config).unwrap();
        assert_eq!(storage.load_config(), config);

        fs::write(&storage.config_path, "not json").unwrap();
        assert_eq!(storage.load_config(), FormatterConfig::default());
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("正常名称"), "正常名称");
        assert_eq!(sanitize_filename("包含/特殊\\字符"), "包含_特殊_字符");
        assert_eq!(sanitize_filename("名人战:第1局?"), "名人战_第1局_");
    }

    #[test]
    fn test_generate_filename() {
        let timestamp = DateTime::parse_from_rfc3339("2026-01-09T15:30:22Z")
            .unwrap()
            .with_timezone(&Utc);

        let filename = generate_filename(&timestamp, "名人战");
        assert_eq!(filename, "20260109_153022_名人战.json");
    }
}
