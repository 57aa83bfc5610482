/// One dispatched server-sent event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SseEvent {
    pub event: Option<String>,
    pub data: String,
}

/// Incremental decoder for a `text/event-stream` body.
///
/// Chunks may split lines anywhere, including inside a UTF-8 sequence; only
/// complete lines are decoded. An event is emitted on the blank line that
/// terminates it.
#[derive(Debug, Default)]
pub(crate) struct SseDecoder {
    buffer: Vec<u8>,
    event: Option<String>,
    data: Vec<String>,
}

impl SseDecoder {
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&raw[..pos]);
            let line = line.trim_end_matches('\r');

            if line.is_empty() {
                if !self.data.is_empty() {
                    events.push(SseEvent {
                        event: self.event.take(),
                        data: self.data.join("\n"),
                    });
                    self.data.clear();
                }
                self.event = None;
                continue;
            }

            // comment / keep-alive
            if line.starts_with(':') {
                continue;
            }

            let (field, value) = match line.split_once(':') {
                Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
                None => (line, ""),
            };
            match field {
                "event" => self.event = Some(value.to_string()),
                "data" => self.data.push(value.to_string()),
                _ => {}
            }
        }

        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_split_across_chunks() {
        let mut decoder = SseDecoder::default();
        assert!(decoder.push(b"event: next\ndata: {\"a\"").is_empty());
        let events = decoder.push(b":1}\n\n");
        assert_eq!(
            events,
            vec![SseEvent { event: Some("next".into()), data: "{\"a\":1}".into() }]
        );
    }

    #[test]
    fn keep_alives_and_crlf_are_ignored() {
        let mut decoder = SseDecoder::default();
        let events = decoder.push(b":\r\n\r\nevent: complete\r\ndata:\r\n\r\n");
        assert_eq!(events, vec![SseEvent { event: Some("complete".into()), data: String::new() }]);
    }

    #[test]
    fn multiline_data_is_joined() {
        let mut decoder = SseDecoder::default();
        let events = decoder.push(b"data: one\ndata: two\n\n");
        assert_eq!(events[0].data, "one\ntwo");
        assert_eq!(events[0].event, None);
    }

    #[test]
    fn character_split_between_chunks_survives() {
        let body = "data: h\u{e9}llo\n\n".as_bytes();
        let cut = body.iter().position(|&b| b == 0xc3).unwrap() + 1;

        let mut decoder = SseDecoder::default();
        assert!(decoder.push(&body[..cut]).is_empty());
        let events = decoder.push(&body[cut..]);
        assert_eq!(events, vec![SseEvent { event: None, data: "h\u{e9}llo".into() }]);
    }
}
