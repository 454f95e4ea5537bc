//! 메트릭 상수 및 설명 등록
//!
//! logchop이 기록하는 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 레코더는 설치하지 않으며, 라이브러리 사용자가 원하는 `metrics` 레코더를
//! 설치하면 값이 수집됩니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `logchop_`
//! - 접미어: `_total` (counter), `_seconds` (histogram), 없음 (gauge)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(logchop_core::metrics::EVENTS_PROCESSED_TOTAL, "source" => "syslog").increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 로그 소스 레이블 키 (auditd, journald, syslog)
pub const LABEL_SOURCE: &str = "source";

// ─── 스캔 메트릭 ────────────────────────────────────────────────────

/// 처리된 이벤트 수 (counter, label: source)
pub const EVENTS_PROCESSED_TOTAL: &str = "logchop_events_processed_total";

/// 규칙에 매칭된 이벤트 수 (counter, label: source)
pub const EVENTS_MATCHED_TOTAL: &str = "logchop_events_matched_total";

/// 이벤트로 변환되지 않고 건너뛴 라인 수 (counter, label: source)
pub const LINES_SKIPPED_TOTAL: &str = "logchop_lines_skipped_total";

/// 로드된 규칙 수 (gauge)
pub const RULES_LOADED: &str = "logchop_rules_loaded";

/// 스캔 소요 시간 (histogram, 초, label: source)
pub const SCAN_DURATION_SECONDS: &str = "logchop_scan_duration_seconds";

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// 레코더가 설치되지 않은 상태에서 호출해도 아무 동작도 하지 않습니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_gauge, describe_histogram};

    describe_counter!(
        EVENTS_PROCESSED_TOTAL,
        "Total number of events read from a log source"
    );
    describe_counter!(
        EVENTS_MATCHED_TOTAL,
        "Total number of events matched by at least one rule"
    );
    describe_counter!(
        LINES_SKIPPED_TOTAL,
        "Total number of log lines that did not produce an event"
    );
    describe_gauge!(RULES_LOADED, "Number of detection rules in the active ruleset");
    describe_histogram!(SCAN_DURATION_SECONDS, "Wall time of a single scan in seconds");
}
