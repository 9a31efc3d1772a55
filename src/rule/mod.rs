//! 规则模块：负责规则的定义、编译与分类
pub mod loader;
pub mod model;

// 导出核心接口
pub use self::loader::{ClassifiedRules, RuleLoader};
pub use self::model::{CompileWarning, CompiledRule, RuleDefinition};
