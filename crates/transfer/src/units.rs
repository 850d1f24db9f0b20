//! Byte counts to and from human-readable strings.
//!
//! Both decimal (`KB`) and binary (`KiB`) suffixes are accepted on input and
//! both map to binary multiples. Output always uses binary prefixes.

use crate::TransferError;

const ONE_KIB: f64 = 1024.0;

const HUMANIZE_SUFFIXES: [&str; 6] = ["KiB", "MiB", "GiB", "TiB", "PiB", "EiB"];

fn suffix_multiplier(suffix: &str) -> Option<u64> {
    let power = match suffix {
        "kb" | "kib" => 1,
        "mb" | "mib" => 2,
        "gb" | "gib" => 3,
        "tb" | "tib" => 4,
        "pb" | "pib" => 5,
        "eb" | "eib" => 6,
        _ => return None,
    };
    Some(1024u64.pow(power))
}

/// Formats a byte count, e.g. `1 Byte`, `10 Bytes`, `1.0 KiB`.
///
/// Values just below a unit boundary round up into it, so
/// `1024 * 1024 - 1` formats as `1.0 MiB`.
pub fn human_readable_size(value: u64) -> String {
    if value == 1 {
        return "1 Byte".into();
    }
    if value < 1024 {
        return format!("{value} Bytes");
    }

    let bytes = value as f64;
    for (i, suffix) in HUMANIZE_SUFFIXES.iter().enumerate() {
        let unit = ONE_KIB.powi(i as i32 + 2);
        if (bytes / unit * ONE_KIB).round() < ONE_KIB {
            return format!("{:.1} {suffix}", ONE_KIB * bytes / unit);
        }
    }
    format!("{:.1} EiB", bytes / ONE_KIB.powi(6))
}

/// Parses `"1024"`, `"1KB"`, `"1kib"`, `"8MiB"` and friends into bytes.
pub fn parse_human_readable_size(value: &str) -> Result<u64, TransferError> {
    let lowered = value.trim().to_ascii_lowercase();
    let suffix_len = if lowered.ends_with("ib") { 3 } else { 2 };

    let split = lowered
        .len()
        .checked_sub(suffix_len)
        .filter(|&at| lowered.is_char_boundary(at));
    let suffixed = split.and_then(|at| {
        let (number, suffix) = lowered.split_at(at);
        suffix_multiplier(suffix).map(|multiplier| (number, multiplier))
    });

    let invalid = || TransferError::InvalidSizeValue(value.to_string());
    match suffixed {
        Some((number, multiplier)) => number
            .trim()
            .parse::<u64>()
            .ok()
            .and_then(|n| n.checked_mul(multiplier))
            .ok_or_else(invalid),
        None => lowered.parse::<u64>().map_err(|_| invalid()),
    }
}
