//! 이벤트 모델 -- 룰 매처가 의존하는 이벤트 capability
//!
//! 각 로그 소스(auditd, journald, syslog)는 자기만의 이벤트 타입을 가지며,
//! 룰 매처는 구체 타입이 아닌 [`Event`] trait에만 의존합니다.
//!
//! # 공통 필드 이름
//! 리포트 행을 구성할 때 사용하는 필드 이름은 [`fields`] 모듈에 정의되어 있습니다.

/// 룰 매칭 대상 이벤트 capability
///
/// 두 연산 모두 생성 이후 변경되지 않는 필드에 대한 읽기 전용 뷰입니다.
pub trait Event {
    /// 키워드 규칙이 매칭할 자유 텍스트 토큰 목록을 반환합니다.
    fn keywords(&self) -> Vec<&str>;

    /// 필드 이름으로 값을 조회합니다. 필드가 없으면 `None`을 반환합니다.
    fn select(&self, name: &str) -> Option<&str>;
}

/// 소스 간 공통으로 사용하는 필드 이름
pub mod fields {
    /// 정규화된 RFC 3339 UTC 타임스탬프
    pub const TIMESTAMP: &str = "timestamp";
    /// 메시지 본문
    pub const MESSAGE: &str = "message";
    /// 실행 파일 경로
    pub const EXE: &str = "exe";
    /// 터미널
    pub const TERMINAL: &str = "terminal";
    /// 프로세스 ID
    pub const PID: &str = "pid";
    /// 호스트명
    pub const HOSTNAME: &str = "hostname";
    /// 사용자 식별자 후보 (앞에서부터 우선)
    pub const USER_CANDIDATES: [&str; 2] = ["AUID", "auid"];
}

/// 사용자 식별자를 후보 필드 순서대로 조회합니다.
pub fn select_user(event: &dyn Event) -> Option<&str> {
    fields::USER_CANDIDATES
        .iter()
        .find_map(|name| event.select(name))
}
