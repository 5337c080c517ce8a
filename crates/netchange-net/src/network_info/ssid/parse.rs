//! Output parsers for the SSID utilities.
//!
//! Each parser returns `None` when the output carries no usable network name.

use std::sync::OnceLock;

use regex::Regex;

/// `nmcli -t -f active,ssid dev wifi`: the SSID of the row marked `yes`.
///
/// Terse mode separates fields with `:` and escapes literal `:` and `\` in
/// values with a backslash.
pub fn nmcli_active_ssid(output: &str) -> Option<String> {
    output.lines().find_map(|line| {
        let (active, ssid) = line.trim_end_matches('\r').split_once(':')?;
        if active != "yes" {
            return None;
        }
        non_empty(unescape_terse(ssid))
    })
}

/// `wpa_cli status`: the value of the `ssid=` line.
pub fn wpa_cli_ssid(output: &str) -> Option<String> {
    output
        .lines()
        .find_map(|line| line.trim_end_matches('\r').strip_prefix("ssid="))
        .and_then(|ssid| non_empty(ssid.to_string()))
}

/// `iwgetid -r`: the raw SSID on its own.
pub fn iwgetid_ssid(output: &str) -> Option<String> {
    non_empty(output.trim_end_matches(['\r', '\n']).to_string())
}

/// `netsh wlan show interfaces`: the value of the `SSID : <value>` line.
pub fn netsh_ssid(output: &str) -> Option<String> {
    static SSID_LINE: OnceLock<Regex> = OnceLock::new();
    let pattern = SSID_LINE.get_or_init(|| {
        Regex::new(r"(?m)^[ \t]*SSID[ \t]*:[ \t]*(.*)$").expect("SSID pattern is valid")
    });

    pattern
        .captures_iter(output)
        .filter_map(|caps| caps.get(1))
        .find_map(|value| non_empty(value.as_str().trim().to_string()))
}

fn unescape_terse(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            out.push(c);
        }
    }
    out
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
