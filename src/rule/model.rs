//! 规则数据模型定义
//! 仅存储规则数据与编译产物，加载逻辑见 loader

use std::fmt;
use serde::{Deserialize, Serialize};

use crate::expr::ExprNode;
use crate::response::ResponseData;

/// 单条指纹规则的原始定义（从 YAML/JSON 规则文件解析）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleDefinition {
    pub name: String,
    /// 探测路径，空串或 "/" 表示复用默认路径的响应
    #[serde(default)]
    pub path: String,
    /// 规则表达式文本，语法见 expr 模块
    pub expression: String,
    #[serde(default)]
    pub rank: i32,
    #[serde(default)]
    pub tag: String,
    /// 是否以 POST 发送探测请求，仅供外部传输方消费
    #[serde(rename = "isPost", default)]
    pub is_post: bool,
}

/// 编译后的指纹规则：原始定义 + 解析后的 AST
/// 构建后不可变，可被多个工作线程只读共享
#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub definition: RuleDefinition,
    pub ast: ExprNode,
}

impl CompiledRule {
    /// 对一份响应数据求值
    pub fn matches(&self, data: &ResponseData) -> bool {
        self.ast.evaluate(data)
    }

    /// 是否为通用规则：path 为空或 "/"，可复用默认路径的响应
    pub fn is_common(&self) -> bool {
        self.definition.path.is_empty() || self.definition.path == "/"
    }
}

/// 单条规则编译失败的告警，不中断整批编译
#[derive(Debug, Clone)]
pub struct CompileWarning {
    pub rule_name: String,
    pub expression: String,
    pub detail: String,
}

impl fmt::Display for CompileWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "⚠️ 跳过规则 '{}'：表达式编译失败\n  表达式: {}\n  错误: {}",
            self.rule_name, self.expression, self.detail
        )
    }
}

// 单元测试
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_definition_yaml_defaults() {
        // path/rank/tag/isPost 均可省略
        let yaml = r#"
name: test-nginx
expression: header == "nginx"
"#;
        let definition: RuleDefinition = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(definition.name, "test-nginx");
        assert_eq!(definition.path, "");
        assert_eq!(definition.rank, 0);
        assert_eq!(definition.tag, "");
        assert!(!definition.is_post);
    }

    #[test]
    fn test_rule_definition_is_post_alias() {
        let yaml = r#"
name: admin-login
path: /admin
expression: body == "login"
rank: 2
tag: admin
isPost: true
"#;
        let definition: RuleDefinition = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(definition.path, "/admin");
        assert!(definition.is_post);
    }

    #[test]
    fn test_is_common() {
        let make = |path: &str| CompiledRule {
            definition: RuleDefinition {
                name: "r".to_string(),
                path: path.to_string(),
                expression: r#"body == "x""#.to_string(),
                rank: 0,
                tag: String::new(),
                is_post: false,
            },
            ast: crate::expr::compile(r#"body == "x""#).unwrap(),
        };
        assert!(make("").is_common());
        assert!(make("/").is_common());
        assert!(!make("/admin").is_common());
    }
}
