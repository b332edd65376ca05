// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 协议参数与常量模块
//!
//! 该模块定义了 `webtree` 分发核心遵循的 HTTP 协议相关常量和数据结构，包括：
//! - 常见的 HTTP 状态码及其原因短语（Reason Phrase）。
//! - 组件可实现的渲染器（Renderer）及其内容类型声明表。
//! - 分发层能够处理的 HTTP 动词的强类型枚举。

use std::collections::HashMap;
use std::fmt;

use lazy_static::lazy_static;

/// 服务器名称标识，用于 HTTP 响应头的 `Server` 字段
pub const SERVER_NAME: &str = "webtree";

/// HTTP 协议规定的换行符（Carriage Return Line Feed）
pub const CRLF: &str = "\r\n";

/// 响应默认使用的字符集
pub const DEFAULT_CHARSET: &str = "utf-8";

/// 响应默认的内容类型
pub const DEFAULT_CONTENT_TYPE: &str = "text/html";

lazy_static! {
    /// HTTP 状态码与其对应的标准原因短语映射表。
    ///
    /// 参考标准：[RFC 9110: HTTP Semantics](https://www.rfc-editor.org/rfc/rfc9110.html)。
    pub static ref STATUS_CODES: HashMap<u16, &'static str> = {
        let mut map = HashMap::new();
        // 1xx: 信息响应 (Informational)
        map.insert(100, "Continue");
        map.insert(101, "Switching Protocols");

        // 2xx: 成功响应 (Successful)
        map.insert(200, "OK");
        map.insert(201, "Created");
        map.insert(202, "Accepted");
        map.insert(204, "No Content");

        // 3xx: 重定向 (Redirection)
        map.insert(300, "Multiple Choices");
        map.insert(301, "Moved Permanently");
        map.insert(302, "Found");
        map.insert(303, "See Other");
        map.insert(304, "Not Modified");
        map.insert(307, "Temporary Redirect");
        map.insert(308, "Permanent Redirect");

        // 4xx: 客户端错误 (Client Error)
        map.insert(400, "Bad Request");
        map.insert(401, "Unauthorized");
        map.insert(403, "Forbidden");
        map.insert(404, "Not Found");
        map.insert(405, "Method Not Allowed");
        map.insert(406, "Not Acceptable");
        map.insert(409, "Conflict");
        map.insert(410, "Gone");
        map.insert(412, "Precondition Failed");
        map.insert(415, "Unsupported Media Type");

        // 5xx: 服务端错误 (Server Error)
        map.insert(500, "Internal Server Error");
        map.insert(501, "Not Implemented");
        map.insert(502, "Bad Gateway");
        map.insert(503, "Service Unavailable");
        map.insert(504, "Gateway Timeout");
        map
    };
}

lazy_static! {
    /// GET 渲染器声明表：(内容类型集合, 渲染器)。
    ///
    /// 顺序即优先级。每个渲染器既登记完整的 MIME 类型，也登记一个短别名，
    /// 以便 URL 中的 `;json` 之类的后缀可以直接指定表示形式。
    pub static ref RENDERERS: Vec<(&'static [&'static str], Renderer)> = vec![
        (&["text/html", "html"] as &[&str], Renderer::Html),
        (&["text/html+edit", "edit"] as &[&str], Renderer::Edit),
        (&["text/xml", "xml"] as &[&str], Renderer::Xml),
        (&["text/plain", "text"] as &[&str], Renderer::Text),
        (&["text/csv", "csv"] as &[&str], Renderer::Csv),
        (&["text/x-vcard", "vcard"] as &[&str], Renderer::Vcard),
        (&["application/atom+xml", "atom"] as &[&str], Renderer::Atom),
        (&["application/calendar+xml", "xcal"] as &[&str], Renderer::XCal),
        (&["application/rdf+xml", "rdf"] as &[&str], Renderer::Rdf),
        (&["application/json", "json"] as &[&str], Renderer::Json),
        (&["application/pdf", "pdf"] as &[&str], Renderer::Pdf),
        (&["image/svg+xml", "svg"] as &[&str], Renderer::Svg),
    ];
}

/// 组件可以实现的 GET 表示形式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Renderer {
    Html,
    Edit,
    Xml,
    Text,
    Csv,
    Vcard,
    Atom,
    XCal,
    Rdf,
    Json,
    Pdf,
    Svg,
}

impl Renderer {
    /// 该渲染器在声明表中登记的全部类型（完整 MIME 类型在前，短别名在后）
    pub fn content_types(&self) -> &'static [&'static str] {
        RENDERERS
            .iter()
            .find(|(_, renderer)| renderer == self)
            .map(|(types, _)| *types)
            .unwrap_or(&[])
    }

    /// 写入响应 `Content-Type` 的 MIME 类型
    pub fn mime(&self) -> &'static str {
        self.content_types()
            .first()
            .copied()
            .unwrap_or(DEFAULT_CONTENT_TYPE)
    }
}

/// 分发层能够执行的 HTTP 动词。
///
/// 未出现在该枚举中的方法（例如 TRACE、OPTIONS）会触发 `405 Method Not Allowed`。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    /// 获取资源的元数据（不包含响应体）
    Head,
    /// 获取资源
    Get,
    /// 提交数据或执行操作
    Post,
    /// 替换资源
    Put,
    /// 删除资源
    Delete,
}

impl Verb {
    /// 从（任意大小写的）方法名解析动词，不支持的方法返回 `None`
    pub fn parse(method: &str) -> Option<Self> {
        match method.to_lowercase().as_str() {
            "head" => Some(Verb::Head),
            "get" => Some(Verb::Get),
            "post" => Some(Verb::Post),
            "put" => Some(Verb::Put),
            "delete" => Some(Verb::Delete),
            _ => None,
        }
    }
}

impl fmt::Display for Verb {
    /// 将枚举格式化为 HTTP 标准大写方法名
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Verb::Head => write!(f, "HEAD"),
            Verb::Get => write!(f, "GET"),
            Verb::Post => write!(f, "POST"),
            Verb::Put => write!(f, "PUT"),
            Verb::Delete => write!(f, "DELETE"),
        }
    }
}

/// 查询状态码对应的原因短语，未知状态码返回空串
pub fn reason_phrase(code: u16) -> &'static str {
    STATUS_CODES.get(&code).copied().unwrap_or("")
}
