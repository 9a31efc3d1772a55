//! 匹配模块：把编译后的规则集应用到采集的响应数据上，产出命中报告

use std::fmt;
use serde::Serialize;
use tracing::debug;

use crate::response::ResponseData;
use crate::rule::{CompiledRule, RuleLoader};

/// 命中报告：规则匹配成功后交给展示/日志消费方的数据
#[derive(Debug, Clone, Serialize)]
pub struct ServiceMatch {
    pub name: String,
    pub tag: String,
    pub expression: String,
    pub host: String,
    pub title: String,
    pub body_length: usize,
    pub hash: String,
}

impl fmt::Display for ServiceMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "命中: {}\n标签: {}\n命中规则: {}",
            self.name, self.tag, self.expression
        )?;
        writeln!(f, "详细信息: ")?;
        writeln!(f, "主机信息: {}", self.host)?;
        writeln!(f, "标题信息: {}", self.title)?;
        writeln!(f, "数据包长度: {}", self.body_length)?;
        write!(f, "Icon Hash: {}", self.hash)
    }
}

/// Banner：一份响应数据与一条待测规则的配对
#[derive(Debug, Clone, Copy)]
pub struct Banner<'a> {
    pub data: &'a ResponseData,
    pub rule: &'a CompiledRule,
}

impl<'a> Banner<'a> {
    pub fn new(data: &'a ResponseData, rule: &'a CompiledRule) -> Self {
        Self { data, rule }
    }

    /// 规则是否命中该响应
    pub fn is_match(&self) -> bool {
        self.rule.matches(self.data)
    }

    /// 命中时生成报告，未命中返回 None
    pub fn report(&self) -> Option<ServiceMatch> {
        if !self.is_match() {
            return None;
        }
        Some(ServiceMatch {
            name: self.rule.definition.name.clone(),
            tag: self.rule.definition.tag.clone(),
            expression: self.rule.definition.expression.clone(),
            host: self.data.host.clone(),
            title: self.data.title.clone(),
            body_length: self.data.body_length,
            hash: self.data.hash.clone(),
        })
    }
}

/// 匹配器：持有分类后的规则集，对响应数据做批量求值
/// 规则集构建后只读，可跨线程共享
#[derive(Debug, Clone)]
pub struct Matcher {
    common: Vec<CompiledRule>,
    special: Vec<CompiledRule>,
}

impl Matcher {
    /// 从一批编译后的规则构建，内部完成通用/特殊分类
    pub fn new(compiled: Vec<CompiledRule>) -> Self {
        let (common, special) = RuleLoader::classify(compiled);
        debug!(
            "匹配器初始化：通用规则 {} 条，特殊规则 {} 条",
            common.len(),
            special.len()
        );
        Self { common, special }
    }

    pub fn common_rules(&self) -> &[CompiledRule] {
        &self.common
    }

    /// 特殊规则留给外部编排方按各自 path 采集响应后求值
    pub fn special_rules(&self) -> &[CompiledRule] {
        &self.special
    }

    /// 用一份默认路径响应遍历全部通用规则
    pub fn match_common(&self, data: &ResponseData) -> Vec<ServiceMatch> {
        self.common
            .iter()
            .filter_map(|rule| Banner::new(data, rule).report())
            .collect()
    }

    /// 对指定下标的特殊规则应用其专属路径的响应
    pub fn match_special(&self, index: usize, data: &ResponseData) -> Option<ServiceMatch> {
        self.special
            .get(index)
            .and_then(|rule| Banner::new(data, rule).report())
    }
}
