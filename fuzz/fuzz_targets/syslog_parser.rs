#![no_main]

use libfuzzer_sys::fuzz_target;
use logchop_log_pipeline::adapter::SyslogParser;

fuzz_target!(|data: &[u8]| {
    let Ok(parser) = SyslogParser::new() else {
        return;
    };

    // 어떤 라인이든 Event, Skipped, NoTimestamp 중 하나로 끝나야 한다
    let line = String::from_utf8_lossy(data);
    let _ = parser.parse_line(&line);
});
