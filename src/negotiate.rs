// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 内容协商模块
//!
//! 解析 `Accept` 请求头，并按质量值（q）把客户端偏好与组件支持的类型进行匹配。
//!
//! 匹配规则：按偏好优先级遍历，对每一个偏好再按调用方给出的顺序扫描候选类型，
//! 返回第一个可比较为真的候选。这样组件可以按自己的优先级声明渲染器，
//! 同时仍然尊重客户端的质量权重。

use std::cmp::Ordering;

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref MEDIA_RANGE: Regex =
        Regex::new(r"^(.*)/([^; ]*)(\s*;\s*q\s*=\s*([0-9.]+))?$").unwrap();
}

/// 一条解析后的媒体范围：(完整类型, 主类型, 子类型, 质量值)
#[derive(Debug, Clone, PartialEq)]
pub struct MediaRange {
    pub full: String,
    pub major: String,
    pub minor: String,
    pub quality: f32,
}

#[derive(Debug, Clone, Default)]
pub struct ContentTypeNegotiator {
    types: Vec<MediaRange>,
}

impl ContentTypeNegotiator {
    /// 从原始 `Accept` 头构造协商器
    pub fn new(accept: &str) -> Self {
        Self {
            types: Self::parse(accept),
        }
    }

    /// 已按质量值降序排列的客户端偏好
    pub fn types(&self) -> &[MediaRange] {
        &self.types
    }

    /// 按逗号切分偏好列表，并按质量值稳定降序排序（质量相同者保持原有相对顺序）
    pub fn parse(input: &str) -> Vec<MediaRange> {
        let mut types: Vec<MediaRange> = input
            .split(',')
            .map(str::trim)
            .filter(|tuple| !tuple.is_empty())
            .map(Self::parse_type)
            .collect();
        types.sort_by(|a, b| b.quality.partial_cmp(&a.quality).unwrap_or(Ordering::Equal));
        types
    }

    /// 解析单个类型。不含 `/` 的写法（例如 `json`）视为子类型为通配符的主类型。
    pub fn parse_type(tuple: &str) -> MediaRange {
        match MEDIA_RANGE.captures(tuple) {
            Some(caps) => {
                let major = caps.get(1).map_or("", |m| m.as_str());
                let minor = caps.get(2).map_or("", |m| m.as_str());
                let quality = caps
                    .get(4)
                    .and_then(|q| q.as_str().parse::<f32>().ok())
                    .unwrap_or(1.0);
                MediaRange {
                    full: format!("{}/{}", major, minor),
                    major: major.to_string(),
                    minor: minor.to_string(),
                    quality,
                }
            }
            None => MediaRange {
                full: tuple.to_string(),
                major: tuple.to_string(),
                minor: "*".to_string(),
                quality: 1.0,
            },
        }
    }

    /// 主类型与子类型分别相等或任一方为 `*` 时视为匹配
    pub fn compare(a: &MediaRange, b: &MediaRange) -> bool {
        let axis = |x: &str, y: &str| x == y || x == "*" || y == "*";
        axis(&a.major, &b.major) && axis(&a.minor, &b.minor)
    }

    /// 在候选类型中挑选最符合客户端偏好的一个。
    ///
    /// `user_override` 非空时会被重新解析并取代 `Accept` 列表（例如 URL 中的 `;json`）。
    /// 偏好列表为空而候选非空时，直接返回第一个候选。
    pub fn best_match(&self, candidates: &[&str], user_override: Option<&str>) -> Option<String> {
        let overridden;
        let types = match user_override {
            Some(o) if !o.is_empty() => {
                overridden = Self::parse(o);
                &overridden
            }
            _ => &self.types,
        };
        if types.is_empty() {
            return candidates.first().map(|c| c.to_string());
        }
        for preference in types {
            for candidate in candidates {
                let candidate_type = Self::parse_type(candidate);
                if Self::compare(&candidate_type, preference) {
                    return Some(candidate_type.full);
                }
            }
        }
        None
    }
}
