use once_cell::sync::Lazy;
use regex::Regex;

static DATE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{4}-\d{2}-\d{2}").unwrap());
static CURRENCY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Z]{3}").unwrap());

/// CJK unified ideograph, the range the statement vocabulary lives in.
pub fn is_cjk(c: char) -> bool {
    ('\u{4e00}'..='\u{9fa5}').contains(&c)
}

pub fn has_cjk(s: &str) -> bool {
    s.chars().any(is_cjk)
}

pub fn has_digit(s: &str) -> bool {
    s.chars().any(|c| c.is_ascii_digit())
}

/// First `yyyy-mm-dd`-shaped substring of `s`.
pub fn find_date(s: &str) -> Option<&str> {
    DATE_RE.find(s).map(|m| m.as_str())
}

/// First run of three uppercase ASCII letters (an ISO-style currency code).
pub fn find_currency(s: &str) -> Option<&str> {
    CURRENCY_RE.find(s).map(|m| m.as_str())
}

#[derive(PartialEq)]
enum Run {
    Alpha,
    Digits,
    Date,
    Other,
}

/// Split `text` into maximal runs of ASCII letters, digit runs, embedded
/// `yyyy-mm-dd` dates, and everything else, then append `insert` after every
/// "everything else" run that contains a CJK character. Non-CJK runs pass
/// through unchanged, punctuation included.
///
/// This is how a wrapped continuation line is spliced back into the Chinese
/// text of its parent cell without landing inside a date or reference number.
pub fn insert_after_cjk(text: &str, insert: &str) -> String {
    let mut out = String::with_capacity(text.len() + insert.len());
    let mut run = String::new();
    let mut kind = Run::Other;

    let flush = |out: &mut String, run: &mut String, kind: &Run| {
        if run.is_empty() {
            return;
        }
        out.push_str(run);
        if *kind == Run::Other && has_cjk(run) {
            out.push_str(insert);
        }
        run.clear();
    };

    let chars: Vec<char> = text.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        // A full date is one run; checked first so its digits and dashes
        // are not carved up by the digit/other rules.
        if let Some(date) = date_at(&chars, i) {
            flush(&mut out, &mut run, &kind);
            out.push_str(&date);
            kind = Run::Date;
            i += 10;
            continue;
        }
        let c = chars[i];
        let next = if c.is_ascii_alphabetic() {
            Run::Alpha
        } else if c.is_ascii_digit() {
            Run::Digits
        } else {
            Run::Other
        };
        if next != kind {
            flush(&mut out, &mut run, &kind);
            kind = next;
        }
        run.push(c);
        i += 1;
    }
    flush(&mut out, &mut run, &kind);
    out
}

fn date_at(chars: &[char], i: usize) -> Option<String> {
    if i + 10 > chars.len() {
        return None;
    }
    let s: String = chars[i..i + 10].iter().collect();
    if DATE_RE.find(&s).map(|m| m.start()) == Some(0) {
        Some(s)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cjk_detection() {
        assert!(has_cjk("备注:"));
        assert!(has_cjk("abc银行123"));
        assert!(!has_cjk("ABC 123 -"));
    }

    #[test]
    fn finds_first_date_and_currency() {
        assert_eq!(find_date("x2023-05-15y2024-01-01"), Some("2023-05-15"));
        assert_eq!(find_date("2023/05/15"), None);
        assert_eq!(find_currency("工资CNY余额"), Some("CNY"));
        assert_eq!(find_currency("usd"), None);
        // a longer uppercase run still yields its first three letters
        assert_eq!(find_currency("ABCD"), Some("ABC"));
    }

    #[test]
    fn splice_keeps_punctuation() {
        assert_eq!(insert_after_cjk("备注:", "ABC123"), "备注:ABC123");
    }

    #[test]
    fn splice_after_every_cjk_run() {
        assert_eq!(insert_after_cjk("招商ABC银行", "分行"), "招商分行ABC银行分行");
    }

    #[test]
    fn splice_leaves_dates_and_numbers_alone() {
        assert_eq!(
            insert_after_cjk("转账2023-05-15单号123", "备注"),
            "转账备注2023-05-15单号备注123"
        );
    }

    #[test]
    fn splice_without_cjk_is_identity() {
        assert_eq!(insert_after_cjk("ABC 123", "x"), "ABC 123");
    }
}
