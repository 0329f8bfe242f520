/// 宿主抽象层模块
///
/// 引擎只通过 `DocumentHost` 读取文档、等待页面/字体加载、修改文本内容，
/// 不直接依赖具体的宿主环境（插件运行时、快照文件等）。
///
/// # 架构设计
///
/// - **traits**: 定义宿主接口与宿主错误
/// - **memory**: 基于内存文档的默认实现（命令行与测试使用）
///
/// # 使用示例
///
/// ```rust,ignore
/// use layer_text_sync::host::{DocumentHost, MemoryHost};
///
/// let mut host = MemoryHost::new(Document::load(path)?);
/// futures::executor::block_on(host.load_all_pages())?;
/// ```
pub mod traits;
pub mod memory;

// === 导出 trait 定义 ===
pub use traits::{DocumentHost, HostError};

// === 导出默认实现 ===
pub use memory::MemoryHost;
