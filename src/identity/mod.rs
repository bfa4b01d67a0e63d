use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\w\-\.]+@([\w\-]+\.)+[\w\-]{2,4}$").expect("valid email pattern")
});

static DOMAIN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(.*)\\(.*)$").expect("valid domain pattern"));

/// 用户输入的登录名分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginIdentity<'a> {
    /// 邮箱形式的主体名，可直接绑定
    Email(&'a str),
    /// `DOMAIN\name`
    Qualified { domain: &'a str, name: &'a str },
    /// 仅有账户名，绑定时使用默认域
    Bare(&'a str),
}

/// 查询用户信息时使用的策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<'a> {
    UserPrincipalName(&'a str),
    SamAccountName(&'a str),
}

impl<'a> LoginIdentity<'a> {
    pub fn classify(raw: &'a str) -> Self {
        if EMAIL.is_match(raw) {
            return LoginIdentity::Email(raw);
        }

        match DOMAIN.captures(raw) {
            Some(caps) => {
                let (_, [domain, name]) = caps.extract();
                LoginIdentity::Qualified { domain, name }
            }
            None => LoginIdentity::Bare(raw),
        }
    }

    /// 目录绑定使用的登录名
    pub fn bind_name(&self, default_domain: &str) -> String {
        match *self {
            LoginIdentity::Email(raw) => raw.to_string(),
            LoginIdentity::Qualified { domain, name } => format!("{domain}\\{name}"),
            LoginIdentity::Bare(name) => format!("{default_domain}\\{name}"),
        }
    }

    pub fn lookup(&self) -> Lookup<'a> {
        match *self {
            LoginIdentity::Email(raw) => Lookup::UserPrincipalName(raw),
            LoginIdentity::Qualified { name, .. } | LoginIdentity::Bare(name) => {
                Lookup::SamAccountName(name)
            }
        }
    }
}

/// 把用户输入映射为目录的规范登录名和查询名
///
/// 绑定名和查询名走同一个分类，保证同一输入解析到同一目录身份。
#[derive(Debug, Clone)]
pub struct IdentityNormalizer {
    default_domain: String,
}

impl IdentityNormalizer {
    pub fn new(default_domain: impl Into<String>) -> Self {
        Self {
            default_domain: default_domain.into(),
        }
    }

    pub fn default_domain(&self) -> &str {
        &self.default_domain
    }

    pub fn login_user_name(&self, raw: &str) -> String {
        LoginIdentity::classify(raw).bind_name(&self.default_domain)
    }

    pub fn lookup<'a>(&self, raw: &'a str) -> Lookup<'a> {
        LoginIdentity::classify(raw).lookup()
    }
}
