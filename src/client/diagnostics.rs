//! Diagnostic output
//!
//! Tiered debug lines and pretty-printed responses, written to a caller
//! supplied sink (stderr by default). This is user-facing output and does not
//! go through `tracing`.
//!
//! | level | output                                  |
//! |-------|-----------------------------------------|
//! | 1     | label, latency                          |
//! | 2     | + description                           |
//! | 3     | + rendered request                      |
//! | 4     | + raw response body                     |

use serde::de::IgnoredAny;
use std::io::{self, Write};

use crate::query::Query;

/// Per-request output options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Debug tier, 1 through 4. Anything else prints nothing.
    pub debug: u8,
    /// Print response bodies, re-indenting JSON
    pub pretty_print_responses: bool,
}

impl RequestOptions {
    pub fn new(debug: u8, pretty_print_responses: bool) -> Self {
        Self {
            debug,
            pretty_print_responses,
        }
    }
}

/// Write the debug lines for `level`
pub fn write_debug<W: Write + ?Sized>(
    out: &mut W,
    level: u8,
    q: &Query,
    lag_ms: f64,
    response: &[u8],
) -> io::Result<()> {
    match level {
        1 => writeln!(out, "debug: {} in {:7.2}ms", q.human_label, lag_ms),
        2..=4 => {
            writeln!(
                out,
                "debug: {} in {:7.2}ms -- {}",
                q.human_label, lag_ms, q.human_description
            )?;
            if level >= 3 {
                writeln!(out, "debug:   request: {}", q)?;
            }
            if level >= 4 {
                writeln!(out, "debug:   response: {}", String::from_utf8_lossy(response))?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Write `response` prefixed with `ID <id>: `.
///
/// JSON bodies (InfluxQL) are re-indented with the prefix on every line.
/// Tokens are copied as written; only whitespace changes. Anything else
/// (Flux CSV) is written as-is.
pub fn write_pretty<W: Write + ?Sized>(out: &mut W, id: u64, response: &[u8]) -> io::Result<()> {
    let prefix = format!("ID {}: ", id);
    out.write_all(prefix.as_bytes())?;

    if serde_json::from_slice::<IgnoredAny>(response).is_ok() {
        out.write_all(&indent_json(response, &prefix, "  "))?;
    } else {
        out.write_all(response)?;
    }
    out.write_all(b"\n")
}

/// Re-indent valid JSON without re-encoding any string or number.
///
/// Every line after the first starts with `prefix`, followed by one `indent`
/// per nesting level. Empty objects and arrays stay on one line.
fn indent_json(src: &[u8], prefix: &str, indent: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(src.len() * 2);
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    let mut opened = false;

    for &b in src {
        if in_string {
            out.push(b);
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }

        if matches!(b, b' ' | b'\t' | b'\n' | b'\r') {
            continue;
        }

        if opened {
            opened = false;
            if b == b'}' || b == b']' {
                depth -= 1;
                out.push(b);
                continue;
            }
            newline(&mut out, prefix, indent, depth);
        }

        match b {
            b'"' => {
                in_string = true;
                out.push(b);
            }
            b'{' | b'[' => {
                out.push(b);
                depth += 1;
                opened = true;
            }
            b'}' | b']' => {
                depth = depth.saturating_sub(1);
                newline(&mut out, prefix, indent, depth);
                out.push(b);
            }
            b',' => {
                out.push(b);
                newline(&mut out, prefix, indent, depth);
            }
            b':' => out.extend_from_slice(b": "),
            _ => out.push(b),
        }
    }

    out
}

fn newline(out: &mut Vec<u8>, prefix: &str, indent: &str, depth: usize) {
    out.push(b'\n');
    out.extend_from_slice(prefix.as_bytes());
    for _ in 0..depth {
        out.extend_from_slice(indent.as_bytes());
    }
}

/// Write everything `opts` asks for
pub fn write_diagnostics<W: Write + ?Sized>(
    out: &mut W,
    opts: &RequestOptions,
    q: &Query,
    lag_ms: f64,
    response: &[u8],
) -> io::Result<()> {
    write_debug(out, opts.debug, q, lag_ms, response)?;
    if opts.pretty_print_responses {
        write_pretty(out, q.id, response)?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query() -> Query {
        let mut q = Query::new();
        q.fill("GET", "/query?db=bench", b"", "InfluxDB (InfluxQL) field keys", "n/a");
        q.id = 3;
        q
    }

    fn debug_output(level: u8) -> String {
        let mut out = Vec::new();
        write_debug(&mut out, level, &query(), 1.5, b"{\"results\":[]}").unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_debug_level_1() {
        assert_eq!(
            debug_output(1),
            "debug: InfluxDB (InfluxQL) field keys in    1.50ms\n"
        );
    }

    #[test]
    fn test_debug_level_2_adds_description() {
        assert_eq!(
            debug_output(2),
            "debug: InfluxDB (InfluxQL) field keys in    1.50ms -- n/a\n"
        );
    }

    #[test]
    fn test_debug_level_3_adds_request() {
        let out = debug_output(3);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("debug:   request: HumanLabel: "));
        assert!(lines[1].contains("Path: \"/query?db=bench\""));
    }

    #[test]
    fn test_debug_level_4_adds_response() {
        let out = debug_output(4);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[2], "debug:   response: {\"results\":[]}");
    }

    #[test]
    fn test_debug_other_levels_are_silent() {
        assert!(debug_output(0).is_empty());
        assert!(debug_output(5).is_empty());
    }

    #[test]
    fn test_pretty_json_is_reindented_with_prefix() {
        let mut out = Vec::new();
        write_pretty(&mut out, 3, br#"{"results":[{"statement_id":0}]}"#).unwrap();

        let expected = "ID 3: {\n\
                        ID 3:   \"results\": [\n\
                        ID 3:     {\n\
                        ID 3:       \"statement_id\": 0\n\
                        ID 3:     }\n\
                        ID 3:   ]\n\
                        ID 3: }\n";
        assert_eq!(String::from_utf8(out).unwrap(), expected);
    }

    #[test]
    fn test_pretty_keeps_tokens_verbatim() {
        let body = br#"{"v":1e3, "big":123456789012345678901234567890,"s":"a\u00e9\"b","d":1,"d":2}"#;
        let mut out = Vec::new();
        write_pretty(&mut out, 1, body).unwrap();
        let out = String::from_utf8(out).unwrap();

        let stripped: String = out
            .lines()
            .map(|line| line.strip_prefix("ID 1: ").unwrap().trim())
            .collect::<Vec<_>>()
            .join("")
            .replace(": ", ":");
        assert_eq!(
            stripped,
            r#"{"v":1e3,"big":123456789012345678901234567890,"s":"a\u00e9\"b","d":1,"d":2}"#
        );
    }

    #[test]
    fn test_pretty_keeps_whitespace_inside_strings() {
        let mut out = Vec::new();
        write_pretty(&mut out, 2, br#"{"msg": "a, b: {c}"}"#).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "ID 2: {\nID 2:   \"msg\": \"a, b: {c}\"\nID 2: }\n"
        );
    }

    #[test]
    fn test_pretty_empty_containers_stay_inline() {
        let mut out = Vec::new();
        write_pretty(&mut out, 5, br#"{"results":[],"tags":{}}"#).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "ID 5: {\nID 5:   \"results\": [],\nID 5:   \"tags\": {}\nID 5: }\n"
        );
    }

    #[test]
    fn test_pretty_preserves_key_order() {
        let mut out = Vec::new();
        write_pretty(&mut out, 1, br#"{"zeta":1,"alpha":2}"#).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.find("zeta").unwrap() < out.find("alpha").unwrap());
    }

    #[test]
    fn test_pretty_passes_csv_through() {
        let csv = b",result,table,_value\n,_result,0,cpu\n";
        let mut out = Vec::new();
        write_pretty(&mut out, 9, csv).unwrap();

        let mut expected = b"ID 9: ".to_vec();
        expected.extend_from_slice(csv);
        expected.push(b'\n');
        assert_eq!(out, expected);
    }

    #[test]
    fn test_write_diagnostics_combines_outputs() {
        let mut out = Vec::new();
        let opts = RequestOptions::new(1, true);
        write_diagnostics(&mut out, &opts, &query(), 2.0, b"ok").unwrap();

        let out = String::from_utf8(out).unwrap();
        assert!(out.starts_with("debug: InfluxDB (InfluxQL) field keys in"));
        assert!(out.ends_with("ID 3: ok\n"));
    }
}
