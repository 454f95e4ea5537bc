//! 도메인 타입 -- 시스템 전역에서 사용되는 공통 타입

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// 로그 소스 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// 커널 감사 로그
    Auditd,
    /// systemd 저널
    Journald,
    /// 라인 기반 syslog 파일
    Syslog,
}

impl SourceKind {
    /// 소스 이름 (`auditd`, `journald`, `syslog`)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auditd => "auditd",
            Self::Journald => "journald",
            Self::Syslog => "syslog",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auditd" => Ok(Self::Auditd),
            "journald" => Ok(Self::Journald),
            "syslog" => Ok(Self::Syslog),
            other => Err(format!(
                "invalid source '{other}' (expected: auditd, journald, syslog)"
            )),
        }
    }
}
