// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 缓存模块
///
/// 提供MX结果缓存及其后端实现
/// 包括Redis客户端与进程内缓存
pub mod backend;
pub mod memory_backend;
pub mod mx_cache;
pub mod redis_client;

pub use backend::{CacheBackend, CacheError};
pub use mx_cache::MxCache;
