// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # HTTP 响应模块
//!
//! `HttpResponse` 既是分发的最终产物，也可以作为终止信号（见 [`Exception::Response`]）
//! 从任意组件中抛出，用来跳过剩余的分发流程，例如重定向或显式的错误状态。

use std::collections::BTreeMap;

use bytes::Bytes;
use chrono::prelude::*;
use log::warn;

use crate::{
    exception::Exception,
    param::{reason_phrase, CRLF, DEFAULT_CHARSET, DEFAULT_CONTENT_TYPE, SERVER_NAME},
    util::HtmlBuilder,
};

#[derive(Debug, Clone)]
pub struct HttpResponse {
    status_code: u16,
    information: String,
    content: Bytes,
    content_type: Option<String>,
    charset: String,
    headers: BTreeMap<String, String>,
    date: DateTime<Utc>,
    server_name: String,
}

impl HttpResponse {
    pub fn new(status: u16, content: impl Into<Bytes>) -> Self {
        let mut response = Self {
            status_code: 200,
            information: "OK".to_string(),
            content: content.into(),
            content_type: Some(DEFAULT_CONTENT_TYPE.to_string()),
            charset: DEFAULT_CHARSET.to_string(),
            headers: BTreeMap::new(),
            date: Utc::now(),
            server_name: SERVER_NAME.to_string(),
        };
        response.set_code(status);
        response
    }

    /// 带有 HTML 错误页面的状态响应
    pub fn from_status_code(code: u16, note: Option<&str>) -> Self {
        let content = HtmlBuilder::from_status_code(code, note).build();
        Self::new(code, content)
    }

    /// 301：资源已永久迁移（例如页面改名）
    pub fn moved_permanently(url: &str) -> Self {
        Self::redirect(301, url)
    }

    /// 303：POST 之后的重定向
    pub fn see_other(url: &str) -> Self {
        Self::redirect(303, url)
    }

    /// 307：临时重定向，客户端应保留原请求方法，今后仍使用原 URI
    pub fn temporary_redirect(url: &str) -> Self {
        Self::redirect(307, url)
    }

    fn redirect(code: u16, url: &str) -> Self {
        let mut response = Self::new(code, Bytes::new());
        response.headers.insert("location".to_string(), url.to_string());
        response
    }

    fn set_code(&mut self, code: u16) -> &mut Self {
        self.status_code = code;
        self.information = reason_phrase(code).to_string();
        if self.information.is_empty() {
            warn!("非标准的状态码：{}", code);
        }
        self
    }

    /// 设置一个响应头。键会被转换为小写；`Content-Type` 只能通过 `set_content_type` 设置。
    pub fn set_header(&mut self, key: &str, value: &str) -> Result<&mut Self, Exception> {
        let key = key.to_lowercase();
        if key == "content-type" {
            return Err(Exception::fault(
                "Can't set Content-Type header directly. Use set_content_type() and set_charset().",
            ));
        }
        self.headers.insert(key, value.to_string());
        Ok(self)
    }

    pub fn remove_header(&mut self, key: &str) -> Option<String> {
        self.headers.remove(&key.to_lowercase())
    }

    pub fn set_content(&mut self, content: impl Into<Bytes>) -> &mut Self {
        self.content = content.into();
        self
    }

    pub fn set_content_type(&mut self, content_type: &str) -> &mut Self {
        self.content_type = Some(content_type.to_string());
        self
    }

    pub fn set_charset(&mut self, charset: &str) -> &mut Self {
        self.charset = charset.to_string();
        self
    }

    /// 序列化为 HTTP/1.1 报文
    pub fn as_bytes(&self) -> Vec<u8> {
        let mut head = format!("HTTP/1.1 {}", self.status_code);
        if !self.information.is_empty() {
            head.push(' ');
            head.push_str(&self.information);
        }
        head.push_str(CRLF);
        if let Some(t) = &self.content_type {
            head.push_str(&format!("Content-Type: {}; charset={}{}", t, self.charset, CRLF));
        }
        for (key, value) in &self.headers {
            head.push_str(&format!("{}: {}{}", normalize_header(key), value, CRLF));
        }
        head.push_str(&format!("Content-Length: {}{}", self.content.len(), CRLF));
        head.push_str(&format!("Date: {}{}", format_date(&self.date), CRLF));
        head.push_str(&format!("Server: {}{}", self.server_name, CRLF));
        head.push_str(CRLF);
        [head.as_bytes(), &self.content[..]].concat()
    }
}

impl HttpResponse {
    pub fn status(&self) -> u16 {
        self.status_code
    }

    pub fn information(&self) -> &str {
        &self.information
    }

    pub fn content(&self) -> &Bytes {
        &self.content
    }

    /// 以 UTF-8 文本形式读取响应体
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.content).into_owned()
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn charset(&self) -> &str {
        &self.charset
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(&key.to_lowercase()).map(String::as_str)
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }
}

fn format_date(date: &DateTime<Utc>) -> String {
    date.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// `x-request-id` -> `X-Request-Id`
fn normalize_header(key: &str) -> String {
    key.split('-')
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join("-")
}
