// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # URL 状态模块
//!
//! 在查询字符串之上维护一份带命名空间、带默认值的键值状态，
//! 用于在生成后代 URL 时保留参数，并避免兄弟组件之间的参数冲突。

use std::collections::{BTreeMap, HashMap};

use crate::context::{Context, UrlParams};

pub struct UrlState<'a> {
    context: &'a dyn Context,
    namespace: String,
    state: BTreeMap<String, String>,
    default_values: HashMap<String, String>,
}

impl<'a> UrlState<'a> {
    /// `context` 是所属组件的父上下文
    pub fn new(context: &'a dyn Context, namespace: &str) -> Self {
        Self {
            context,
            namespace: namespace.to_string(),
            state: BTreeMap::new(),
            default_values: HashMap::new(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    fn key(&self, key: &str) -> String {
        format!("{}{}", self.namespace, key)
    }

    /// 从父上下文的查询字符串读取初值，并登记默认值。对同一个键重复调用时以最后一次为准。
    pub fn init(&mut self, key: &str, default: impl ToString) {
        let ns_key = self.key(key);
        let default = default.to_string();
        let value = self.context.query_or(&ns_key, &default);
        self.state.insert(ns_key.clone(), value);
        self.default_values.insert(ns_key, default);
    }

    pub fn has(&self, key: &str) -> bool {
        self.state.contains_key(&self.key(key))
    }

    /// 优先返回本地跟踪的值，否则回退到父上下文查询字符串中的同名（带命名空间）参数
    pub fn get(&self, key: &str) -> Option<String> {
        let ns_key = self.key(key);
        match self.state.get(&ns_key) {
            Some(value) => Some(value.clone()),
            None => self.context.query(&ns_key),
        }
    }

    pub fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    pub fn set(&mut self, key: &str, value: impl ToString) {
        let ns_key = self.key(key);
        self.state.insert(ns_key, value.to_string());
    }

    /// 合并跟踪状态与调用方参数；等于默认值的条目被置为 `None`，生成的 URL 中不再出现
    pub fn merge(&self, params: &UrlParams) -> UrlParams {
        let mut result: UrlParams = self
            .state
            .iter()
            .map(|(k, v)| (k.clone(), Some(v.clone())))
            .collect();
        for (key, value) in params {
            result.insert(self.key(key), value.clone());
        }
        for (ns_key, value) in result.iter_mut() {
            if let Some(default) = self.default_values.get(ns_key) {
                if value.as_deref().map_or(true, |v| v == default) {
                    *value = None;
                }
            }
        }
        result
    }
}
