//! rsfingerprint - 基于布尔表达式 DSL 的 HTTP 服务指纹识别引擎

// 导出全局错误类型
pub use self::error::{FingerprintError, FpResult};

// 导出配置模块
pub use self::config::{ConfigManager, CustomConfigBuilder, GlobalConfig};

// 导出响应数据模型
pub use self::response::ResponseData;

// 导出表达式引擎核心接口
pub use self::expr::{CompareOp, ExprNode, Field, Lexer, LogicOp, Parser, Token, TokenKind};

// 导出规则模块核心接口
pub use self::rule::{ClassifiedRules, CompileWarning, CompiledRule, RuleDefinition, RuleLoader};

// 导出匹配模块核心接口
pub use self::matcher::{Banner, Matcher, ServiceMatch};

// 声明所有子模块
pub mod config;
pub mod error;
pub mod expr;
pub mod matcher;
pub mod response;
pub mod rule;
