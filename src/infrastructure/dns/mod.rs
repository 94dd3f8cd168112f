// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// DNS模块
///
/// 提供MX记录查询接口及基于hickory-resolver的实现
pub mod hickory;
pub mod resolver;

pub use hickory::HickoryMxResolver;
pub use resolver::{DnsError, MxResolver};
