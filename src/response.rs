//! HTTP 响应数据模型
//! 由外部采集方填充，求值器只读；采集失败时各字段为空串/零值

use serde::{Deserialize, Serialize};

/// 从一次 HTTP 响应中提取的关键信息
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponseData {
    /// 序列化后的响应头，按 "Key: Value\r\n" 逐对拼接
    pub headers: String,
    /// 响应正文文本
    pub body: String,
    /// Icon Hash，由采集方计算
    pub hash: String,
    // 以下字段用于 Banner 展示
    pub body_length: usize,
    pub cert: String,
    pub title: String,
    /// ICP 备案信息
    pub icp: String,
    /// 请求的主机名或 IP 地址，采集方必须填充
    pub host: String,
}
