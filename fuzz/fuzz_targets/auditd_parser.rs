#![no_main]

use libfuzzer_sys::fuzz_target;
use logchop_core::event::Event;
use logchop_log_pipeline::adapter::AuditdParser;

fuzz_target!(|data: &[u8]| {
    let Ok(parser) = AuditdParser::new() else {
        return;
    };

    let line = String::from_utf8_lossy(data);
    if let Some(event) = parser.parse_line(&line) {
        // 파싱된 이벤트는 항상 type 필드를 가진다
        assert!(event.select("type").is_some());
        let _ = event.keywords();
    }
});
