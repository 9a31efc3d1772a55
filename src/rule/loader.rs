//! 规则加载管理器
//! 负责从规则文件读取、逐条编译并分类指纹规则

use std::path::Path;
use tracing::{debug, info, warn};

use super::model::{CompileWarning, CompiledRule, RuleDefinition};
use crate::config::GlobalConfig;
use crate::error::{FingerprintError, FpResult};
use crate::expr;

/// 加载并分类后的规则集
#[derive(Debug, Clone, Default)]
pub struct ClassifiedRules {
    /// 通用规则：共享一次默认路径响应
    pub common: Vec<CompiledRule>,
    /// 特殊规则：各自需要按 path 单独请求
    pub special: Vec<CompiledRule>,
    /// 编译阶段被跳过的规则告警
    pub warnings: Vec<CompileWarning>,
}

impl ClassifiedRules {
    /// 本次加载请求的规则总数（成功 + 跳过）
    pub fn requested(&self) -> usize {
        self.common.len() + self.special.len() + self.warnings.len()
    }
}

/// 规则加载管理器
pub struct RuleLoader;

impl RuleLoader {
    /// 按全局配置加载规则文件并编译
    pub fn load(config: &GlobalConfig) -> FpResult<(Vec<CompiledRule>, Vec<CompileWarning>)> {
        Self::load_from_file(&config.rule_path)
    }

    /// 按全局配置加载并完成通用/特殊分类
    pub fn load_classified(config: &GlobalConfig) -> FpResult<ClassifiedRules> {
        let (compiled, warnings) = Self::load(config)?;
        let (common, special) = Self::classify(compiled);
        debug!(
            "规则分类完成：通用 {} 条，特殊 {} 条",
            common.len(),
            special.len()
        );
        Ok(ClassifiedRules {
            common,
            special,
            warnings,
        })
    }

    /// 从规则文件加载：按扩展名识别 JSON/YAML
    /// 整文件反序列化失败为致命错误；单条表达式失败只跳过该条
    pub fn load_from_file(path: &Path) -> FpResult<(Vec<CompiledRule>, Vec<CompileWarning>)> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            FingerprintError::RuleLoadError(format!("读取规则文件 {} 失败: {}", path.display(), e))
        })?;
        let definitions = Self::parse_definitions(&raw, Self::is_json_path(path))?;
        debug!(
            "从 {} 读取到 {} 条规则定义",
            path.display(),
            definitions.len()
        );
        Ok(Self::compile_rules(definitions))
    }

    /// 反序列化规则定义列表
    pub fn parse_definitions(raw: &str, json: bool) -> FpResult<Vec<RuleDefinition>> {
        let definitions = if json {
            serde_json::from_str::<Vec<RuleDefinition>>(raw)?
        } else {
            serde_yaml::from_str::<Vec<RuleDefinition>>(raw)?
        };
        Ok(definitions)
    }

    fn is_json_path(path: &Path) -> bool {
        path.extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
    }

    /// 编译一批规则定义
    /// 单条表达式编译失败仅记录告警并跳过，整批编译永不失败
    pub fn compile_rules(
        definitions: Vec<RuleDefinition>,
    ) -> (Vec<CompiledRule>, Vec<CompileWarning>) {
        let requested = definitions.len();
        let mut compiled = Vec::with_capacity(requested);
        let mut warnings = Vec::new();

        for definition in definitions {
            match expr::compile(&definition.expression) {
                Ok(ast) => compiled.push(CompiledRule { definition, ast }),
                Err(e) => {
                    let warning = CompileWarning {
                        rule_name: definition.name.clone(),
                        expression: definition.expression.clone(),
                        detail: e.to_string(),
                    };
                    warn!("{}", warning);
                    warnings.push(warning);
                }
            }
        }

        info!(
            "✅ 规则编译完成：请求 {} 条，成功 {} 条，跳过 {} 条",
            requested,
            compiled.len(),
            warnings.len()
        );
        (compiled, warnings)
    }

    /// 将编译后的规则分为通用/特殊两组
    /// 通用规则可共享一次默认路径响应，特殊规则需各自按 path 请求
    pub fn classify(compiled: Vec<CompiledRule>) -> (Vec<CompiledRule>, Vec<CompiledRule>) {
        compiled.into_iter().partition(CompiledRule::is_common)
    }
}

// 单元测试
#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FingerprintError;

    fn definition(name: &str, path: &str, expression: &str) -> RuleDefinition {
        RuleDefinition {
            name: name.to_string(),
            path: path.to_string(),
            expression: expression.to_string(),
            rank: 0,
            tag: String::new(),
            is_post: false,
        }
    }

    #[test]
    fn test_compile_rules_batch_resilience() {
        // 三条规则其中一条表达式非法：成功两条，告警一条，整批不失败
        let definitions = vec![
            definition("nginx", "", r#"header == "nginx""#),
            definition("broken", "", r#"foo == "x""#),
            definition("tomcat", "", r#"body == "Apache Tomcat""#),
        ];
        let (compiled, warnings) = RuleLoader::compile_rules(definitions);
        assert_eq!(compiled.len(), 2);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].rule_name, "broken");
        assert_eq!(warnings[0].expression, r#"foo == "x""#);
        assert!(warnings[0].detail.contains("foo"));
    }

    #[test]
    fn test_classify_by_path() {
        let definitions = vec![
            definition("a", "", r#"body == "a""#),
            definition("b", "/", r#"body == "b""#),
            definition("c", "/admin", r#"body == "c""#),
        ];
        let (compiled, _) = RuleLoader::compile_rules(definitions);
        let (common, special) = RuleLoader::classify(compiled);
        assert_eq!(common.len(), 2);
        assert_eq!(special.len(), 1);
        assert_eq!(special[0].definition.name, "c");
    }

    #[test]
    fn test_load_from_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fingerprints.yaml");
        std::fs::write(
            &path,
            r#"
- name: test-nginx
  path: ""
  expression: header == "nginx"
  rank: 1
  tag: web-server
  isPost: false
- name: test-admin
  path: /admin
  expression: body == "login" && body != "404"
  rank: 2
  tag: admin
  isPost: true
"#,
        )
        .unwrap();

        let (compiled, warnings) = RuleLoader::load_from_file(&path).unwrap();
        assert_eq!(compiled.len(), 2);
        assert!(warnings.is_empty());
        assert_eq!(compiled[0].definition.name, "test-nginx");
        assert_eq!(compiled[1].definition.tag, "admin");
        assert!(compiled[1].definition.is_post);
    }

    #[test]
    fn test_load_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fingerprints.json");
        std::fs::write(
            &path,
            r#"[
  {"name": "test-nginx", "expression": "header == \"nginx\"", "tag": "web-server"}
]"#,
        )
        .unwrap();

        let (compiled, warnings) = RuleLoader::load_from_file(&path).unwrap();
        assert_eq!(compiled.len(), 1);
        assert!(warnings.is_empty());
        assert!(compiled[0].is_common());
    }

    #[test]
    fn test_malformed_source_is_fatal() {
        // 整文件反序列化失败必须返回错误，而非降级为空规则集
        let err = RuleLoader::parse_definitions("not: [valid", false).unwrap_err();
        assert!(matches!(err, FingerprintError::YamlError(_)));
    }

    #[test]
    fn test_load_classified() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.yaml");
        std::fs::write(
            &path,
            r#"
- name: common-rule
  expression: body == "a"
- name: special-rule
  path: /console
  expression: body == "b"
- name: broken-rule
  expression: body == "c
"#,
        )
        .unwrap();

        let config = crate::ConfigManager::custom().rule_path(path).build();
        let loaded = RuleLoader::load_classified(&config).unwrap();
        assert_eq!(loaded.common.len(), 1);
        assert_eq!(loaded.special.len(), 1);
        assert_eq!(loaded.warnings.len(), 1);
        assert_eq!(loaded.requested(), 3);
    }
}
