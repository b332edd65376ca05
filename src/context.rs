// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 上下文模块
//!
//! `Context` 是对请求数据的只读视图，顶层的 [`Request`](crate::request::Request)
//! 和每一个 [`Component`](crate::component::Component) 都实现了它。
//! 组件把大部分读取委托给父上下文，只替换自己的 `url()` 与 `subspace()`。

use std::collections::BTreeMap;
use std::rc::Rc;

use crate::{adapter::UploadedFile, identity::Identity};

/// 生成 URL 时使用的查询参数。值为 `None` 的条目不会被渲染。
pub type UrlParams = BTreeMap<String, Option<String>>;

pub trait Context {
    fn query(&self, key: &str) -> Option<String>;
    fn body(&self, key: &str) -> Option<String>;
    fn header(&self, key: &str) -> Option<String>;
    fn cookie(&self, key: &str) -> Option<String>;
    fn session(&self, key: &str) -> Option<String>;
    fn file(&self, key: &str) -> Option<UploadedFile>;

    /// 小写的 HTTP 方法名
    fn method(&self) -> String;

    fn identity(&self) -> Rc<dyn Identity>;

    /// 生成相对于当前上下文的 URL
    fn url(&self, path: &str, params: &UrlParams) -> String;

    /// 尚未被消费的剩余路径
    fn subspace(&self) -> String;

    fn negotiate_content_type(&self, candidates: &[&str], user_override: Option<&str>)
        -> Option<String>;

    fn query_or(&self, key: &str, default: &str) -> String {
        self.query(key).unwrap_or_else(|| default.to_string())
    }

    /// 数组形式的路径：逐段百分号编码（保留 `;`）后以 `/` 连接
    fn url_segments(&self, segments: &[&str], params: &UrlParams) -> String {
        self.url(&encode_path(segments), params)
    }
}

/// 由键值对构造 `UrlParams`
pub fn params(pairs: &[(&str, &str)]) -> UrlParams {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), Some(v.to_string())))
        .collect()
}

/// 把参数渲染为查询字符串，跳过值为 `None` 的条目
pub fn build_query(params: &UrlParams) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in params {
        if let Some(value) = value {
            serializer.append_pair(key, value);
        }
    }
    serializer.finish()
}

/// 路径段编码：空格编码为 `%20`，分号作为子类型分隔符原样保留
pub fn encode_path(segments: &[&str]) -> String {
    segments
        .iter()
        .map(|segment| {
            form_urlencoded::byte_serialize(segment.as_bytes())
                .collect::<String>()
                .replace('+', "%20")
                .replace("%3B", ";")
        })
        .collect::<Vec<_>>()
        .join("/")
}
