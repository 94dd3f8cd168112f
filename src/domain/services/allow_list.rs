// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::collections::HashSet;

use once_cell::sync::Lazy;

/// 已知公共、免费与一次性邮箱服务商
const PUBLIC_PROVIDERS: &[&str] = &[
    // Major providers
    "gmail.com",
    "yahoo.com",
    "hotmail.com",
    "outlook.com",
    "aol.com",
    "icloud.com",
    "mail.com",
    "protonmail.com",
    "proton.me",
    "yandex.com",
    "zoho.com",
    "gmx.com",
    "live.com",
    "msn.com",
    "me.com",
    "mac.com",
    "inbox.com",
    "fastmail.com",
    "tutanota.com",
    "mail.ru",
    "qq.com",
    "163.com",
    "sina.com",
    "rediffmail.com",
    // ISP mailboxes
    "cox.net",
    "sbcglobal.net",
    "att.net",
    "bellsouth.net",
    "charter.net",
    "comcast.net",
    "earthlink.net",
    "juno.com",
    "netzero.net",
    "rocketmail.com",
    "ymail.com",
    "aim.com",
    // Regional
    "bigpond.com",
    "optusnet.com.au",
    "tpg.com.au",
    "iinet.net.au",
    "orange.fr",
    "laposte.net",
    "web.de",
    "gmx.de",
    "t-online.de",
    "libero.it",
    "alice.it",
    "virgilio.it",
    "tiscali.it",
    "uol.com.br",
    "bol.com.br",
    "terra.com.br",
    "ig.com.br",
    "naver.com",
    "daum.net",
    "hanmail.net",
    // Disposable
    "mailinator.com",
    "guerrillamail.com",
    "10minutemail.com",
    "tempmail.com",
    "throwaway.email",
    "disposable.email",
    "temp-mail.org",
    "getnada.com",
    "mohmal.com",
    "fakeinbox.com",
    "mintemail.com",
    "spamgourmet.com",
    "sharklasers.com",
    "grr.la",
    "guerrillamailblock.com",
    "pokemail.net",
    "spam4.me",
    "bccto.me",
    "chitthi.in",
    "meltmail.com",
    "emailondeck.com",
    "spamhole.com",
    "spamevader.com",
    "spamfree24.org",
    "tempinbox.co.uk",
    "mytrashmail.com",
    "trashmail.com",
    "trashmail.net",
    "jetable.org",
    "emailias.com",
    "mox.do",
    "yopmail.com",
    "emaildrop.io",
    "maildrop.cc",
    "getairmail.com",
    "mailcatch.com",
    "inboxkitten.com",
    "mailnesia.com",
    "tempr.email",
    "tmpmail.org",
    "mail7.io",
    "fakemailgenerator.com",
    "throwawaymail.com",
    "tempmailo.com",
    "mail-temp.com",
    "temp-mail.io",
    "tempmailaddress.com",
    "tempail.com",
];

static PUBLIC_PROVIDER_SET: Lazy<HashSet<&'static str>> =
    Lazy::new(|| PUBLIC_PROVIDERS.iter().copied().collect());

/// 判断域名是否为公共邮箱服务商
///
/// 大小写不敏感的精确匹配
pub fn is_public_provider(domain: &str) -> bool {
    PUBLIC_PROVIDER_SET.contains(domain.trim().to_ascii_lowercase().as_str())
}

/// 判断邮箱域名是否可接受
///
/// # 参数
///
/// * `email_domain` - 邮箱的域名部分
/// * `target_domain` - 抓取目标的根域名
///
/// # 返回值
///
/// 与目标域名相同（大小写不敏感）或属于公共服务商时返回true
pub fn is_acceptable(email_domain: &str, target_domain: &str) -> bool {
    email_domain.trim().eq_ignore_ascii_case(target_domain.trim())
        || is_public_provider(email_domain)
}

/// 取邮箱的域名部分
pub fn email_domain(email: &str) -> Option<&str> {
    email.rsplit_once('@').map(|(_, d)| d).filter(|d| !d.is_empty())
}
