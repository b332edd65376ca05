// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # Exception 模块
//!
//! 该模块定义了分发过程中可能出现的各类中断与错误。
//!
//! ## 设计意图
//! - **控制流信号**：`Exception` 作为每个分发 `Result` 的 `Err` 部分，沿调用链原样向上传播，
//!   直到在引导层（Bootstrap）被模式匹配。`MetaResponse` 会让引导层换一个根组件重试，
//!   `Response` 则直接成为最终响应。
//! - **致命错误**：`ConfigError` 只在构造请求上下文或加载配置时出现，不参与重试。
//! - **用户友好**：所有类型都实现了 `std::fmt::Display`，便于写入日志或调试输出。

use std::{error, fmt, io};

use crate::response::HttpResponse;

/// 内部路由/错误信号，由引导层映射到一个兜底组件。
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MetaResponse {
    /// 用户无权访问所请求的资源
    Forbidden,
    /// 所请求的资源不存在
    PageNotFound,
    /// 处理组件不支持当前的 HTTP 方法
    MethodNotAllowed,
    /// 服务器尚未实现满足请求所需的功能
    NotImplemented,
}

impl MetaResponse {
    /// 负责处理该信号的兜底组件在注册表中的名字
    pub fn component_name(&self) -> &'static str {
        match self {
            MetaResponse::Forbidden => "forbidden",
            MetaResponse::PageNotFound => "page_not_found",
            MetaResponse::MethodNotAllowed => "method_not_allowed",
            MetaResponse::NotImplemented => "not_implemented",
        }
    }

    /// 兜底组件最终返回的状态码
    pub fn status(&self) -> u16 {
        match self {
            MetaResponse::Forbidden => 403,
            MetaResponse::PageNotFound => 404,
            MetaResponse::MethodNotAllowed => 405,
            MetaResponse::NotImplemented => 501,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            MetaResponse::Forbidden => "The requested page is forbidden",
            MetaResponse::PageNotFound => "The requested page was not found",
            MetaResponse::MethodNotAllowed => {
                "The request HTTP method is not supported by the handling component"
            }
            MetaResponse::NotImplemented => {
                "The server does not support the functionality required to fulfill the request"
            }
        }
    }
}

impl fmt::Display for MetaResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

/// 分发过程中的中断。
///
/// 该枚举通常作为 `Result` 的 `Err` 部分返回，组件之间用 `?` 原样传播。
#[derive(Debug, Clone)]
pub enum Exception {
    /// 可恢复的路由信号，引导层会切换到对应的兜底组件。
    Meta(MetaResponse),
    /// 终止信号：该响应就是最终结果（例如重定向或显式的错误状态）。
    Response(Box<HttpResponse>),
    /// 注册表中不存在该名字的组件。对应 `500 Internal Server Error`。
    UnknownComponent(String),
    /// 组件内部的其他错误。对应 `500 Internal Server Error`。
    Fault(String),
}

impl Exception {
    pub fn fault(message: impl Into<String>) -> Self {
        Exception::Fault(message.into())
    }
}

impl From<MetaResponse> for Exception {
    fn from(meta: MetaResponse) -> Self {
        Exception::Meta(meta)
    }
}

impl From<HttpResponse> for Exception {
    fn from(response: HttpResponse) -> Self {
        Exception::Response(Box::new(response))
    }
}

impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Exception::Meta(meta) => write!(f, "{}", meta),
            Exception::Response(response) => write!(f, "Response raised ({})", response.status()),
            Exception::UnknownComponent(name) => write!(f, "No component registered as '{}'", name),
            Exception::Fault(message) => write!(f, "{}", message),
        }
    }
}

impl error::Error for Exception {}

/// 致命的配置错误，在启动或构造请求上下文时立即抛出，不会被重试。
#[derive(Debug)]
pub enum ConfigError {
    /// `href_base` 以斜杠结尾
    TrailingSlash(String),
    /// `href_base` 中包含主机名
    EmbeddedHostname(String),
    /// 无法读取配置文件
    Io(io::Error),
    /// 配置文件不是合法的 TOML
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::TrailingSlash(base) => {
                write!(f, "href_base may not have trailing slash: '{}'", base)
            }
            ConfigError::EmbeddedHostname(base) => {
                write!(f, "href_base may not include hostname: '{}'", base)
            }
            ConfigError::Io(e) => write!(f, "Couldn't read config file: {}", e),
            ConfigError::Parse(e) => write!(f, "Couldn't parse config file: {}", e),
        }
    }
}

impl error::Error for ConfigError {}

impl From<io::Error> for ConfigError {
    fn from(e: io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

/// 传输适配层解析原始请求时的错误。
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// 客户端发送的请求字节流无法解析为合法的 UTF-8 字符串。
    RequestIsNotUtf8,
    /// 请求行不符合 `METHOD URI VERSION` 的格式。
    MalformedRequestLine,
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::RequestIsNotUtf8 => write!(f, "Request bytes can't be parsed in UTF-8"),
            RequestError::MalformedRequestLine => write!(f, "Malformed request line"),
        }
    }
}

impl error::Error for RequestError {}
