//! Rule-based entity recogniser used when no NER model is configured.
//!
//! Labels follow the OntoNotes names where they overlap: `TIME`, `DATE`,
//! `PERCENT`, `MONEY`, `ORDINAL`, `CARDINAL`, `ORG`, plus `MISC` for other
//! capitalised spans.

use super::Entity;

const MONTHS: &[&str] = &[
    "january", "february", "march", "april", "may", "june", "july", "august", "september",
    "october", "november", "december", "jan", "feb", "mar", "apr", "jun", "jul", "aug", "sep",
    "sept", "oct", "nov", "dec",
];

const WEEKDAYS: &[&str] = &[
    "monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday",
];

const MERIDIEMS: &[&str] = &["am", "pm", "a.m", "p.m"];

const TIME_ZONES: &[&str] = &[
    "est", "edt", "cst", "cdt", "mst", "mdt", "pst", "pdt", "utc", "gmt", "cet", "ist",
];

const TIME_WORDS: &[&str] = &["midnight", "noon", "midday"];

const ORG_SUFFIXES: &[&str] = &[
    "inc", "corp", "corporation", "ltd", "llc", "plc", "gmbh", "company", "university",
    "college", "institute", "department", "ministry", "agency", "association", "bank",
];

/// Capitalised words that never start a name.
const FUNCTION_WORDS: &[&str] = &[
    "the", "a", "an", "this", "that", "these", "those", "all", "any", "each", "every", "no",
    "some", "i", "we", "you", "he", "she", "it", "they", "if", "in", "on", "at", "for", "by",
    "to", "of", "and", "or", "but", "when", "where", "what", "there", "please", "may", "can",
    "will", "must", "should", "do", "does", "is", "are",
];

const MONEY_WORDS: &[&str] = &["dollars", "euros", "pounds", "usd", "eur", "gbp"];

#[derive(Debug, Clone, Copy)]
struct Token<'a> {
    text: &'a str,
    start: usize,
    end: usize,
    sentence_start: bool,
    /// Punctuation directly followed the token.
    punctuated: bool,
}

impl Token<'_> {
    fn lower(&self) -> String {
        self.text.to_lowercase()
    }
}

fn tokenize(text: &str) -> Vec<Token<'_>> {
    const LEADING: &[char] = &['(', '[', '{', '"', '\'', '\u{201C}', '\u{2018}'];
    const TRAILING: &[char] = &[
        ',', ';', ':', '!', '?', '.', ')', ']', '}', '"', '\'', '\u{201D}', '\u{2019}',
    ];

    let mut tokens = Vec::new();
    let mut sentence_start = true;

    for (start, end) in whitespace_spans(text) {
        let raw = &text[start..end];
        let lead = raw.len() - raw.trim_start_matches(LEADING).len();
        // "a.m." keeps its inner dots, only the final one is trimmed.
        let body = raw[lead..].trim_end_matches(TRAILING);

        if !body.is_empty() {
            let token_start = start + lead;
            tokens.push(Token {
                text: body,
                start: token_start,
                end: token_start + body.len(),
                sentence_start,
                punctuated: lead + body.len() < raw.len(),
            });
        }

        let closing = raw.trim_end_matches(['"', '\'', ')', '\u{201D}', '\u{2019}']);
        sentence_start = closing.ends_with(['.', '!', '?']);
    }

    tokens
}

fn whitespace_spans(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut start = None;

    for (i, c) in text.char_indices() {
        if c.is_whitespace() {
            if let Some(s) = start.take() {
                spans.push((s, i));
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        spans.push((s, text.len()));
    }

    spans
}

fn is_number(t: &str) -> bool {
    let digits = t.strip_prefix('-').unwrap_or(t);
    digits.starts_with(|c: char| c.is_ascii_digit())
        && digits
            .chars()
            .all(|c| c.is_ascii_digit() || c == ',' || c == '.')
}

fn is_clock(t: &str) -> bool {
    let Some((hours, minutes)) = t.split_once(':') else {
        return false;
    };
    (1..=2).contains(&hours.len())
        && minutes.len() == 2
        && hours.chars().all(|c| c.is_ascii_digit())
        && minutes.chars().all(|c| c.is_ascii_digit())
}

/// Strips an attached `am`/`pm` suffix ("10pm", "10:30AM").
fn strip_meridiem(lower: &str) -> Option<&str> {
    ["am", "pm"]
        .iter()
        .find_map(|suffix| lower.strip_suffix(suffix))
        .filter(|rest| !rest.is_empty())
}

fn is_time_token(lower: &str) -> bool {
    if is_clock(lower) || TIME_WORDS.contains(&lower) {
        return true;
    }
    strip_meridiem(lower).is_some_and(|rest| {
        is_clock(rest) || (rest.len() <= 2 && rest.chars().all(|c| c.is_ascii_digit()))
    })
}

fn is_ordinal(lower: &str) -> bool {
    ["st", "nd", "rd", "th"].iter().any(|suffix| {
        lower
            .strip_suffix(suffix)
            .is_some_and(|digits| !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()))
    })
}

fn is_day_of_month(lower: &str) -> bool {
    let digits = ["st", "nd", "rd", "th"]
        .iter()
        .find_map(|suffix| lower.strip_suffix(suffix))
        .unwrap_or(lower);
    digits.len() <= 2
        && digits.chars().all(|c| c.is_ascii_digit())
        && digits.parse::<u8>().is_ok_and(|d| (1..=31).contains(&d))
}

fn is_year(t: &str) -> bool {
    t.len() == 4
        && t.chars().all(|c| c.is_ascii_digit())
        && t.parse::<u16>().is_ok_and(|y| (1900..=2099).contains(&y))
}

/// `2025-09-21`, `21/09/2025`, `9/21/25`.
fn is_numeric_date(t: &str) -> bool {
    for separator in ['-', '/'] {
        let parts: Vec<&str> = t.split(separator).collect();
        if parts.len() == 3
            && parts
                .iter()
                .all(|p| !p.is_empty() && p.len() <= 4 && p.chars().all(|c| c.is_ascii_digit()))
            && parts.iter().any(|p| p.len() == 4 || p.len() == 2)
        {
            return true;
        }
    }
    false
}

fn is_month(token: &Token<'_>) -> bool {
    let lower = token.lower();
    let word = lower.trim_end_matches('.');
    // "may" is a month only when capitalised mid-sentence.
    if word == "may" {
        return token.text.starts_with('M') && !token.sentence_start;
    }
    token.text.starts_with(char::is_uppercase) && MONTHS.contains(&word)
}

fn is_capitalized(t: &str) -> bool {
    t.starts_with(char::is_uppercase) && t.chars().any(char::is_alphabetic)
}

/// Extracts entities from `text` in order of appearance.
pub fn extract(text: &str) -> Vec<Entity> {
    let tokens = tokenize(text);
    let mut entities = Vec::new();
    let mut i = 0;

    while i < tokens.len() {
        let (label, len) = match_at(&tokens, i);
        match label {
            Some(label) => {
                let start = tokens[i].start;
                let end = tokens[i + len - 1].end;
                entities.push(Entity::new(&text[start..end], label));
                i += len;
            }
            None => i += 1,
        }
    }

    entities
}

/// Returns the label and token length of the entity starting at `i`, if any.
fn match_at(tokens: &[Token<'_>], i: usize) -> (Option<&'static str>, usize) {
    let token = &tokens[i];
    let lower = token.lower();
    let next_lower = |offset: usize| tokens.get(i + offset).map(Token::lower);

    if is_time_token(&lower) || (is_number(&lower) && next_is_meridiem(tokens, i)) {
        let mut len = 1;
        if next_is_meridiem(tokens, i + len - 1) {
            len += 1;
        }
        if next_lower(len).is_some_and(|t| TIME_ZONES.contains(&t.as_str())) {
            len += 1;
        }
        return (Some("TIME"), len);
    }

    if is_month(token) {
        let mut len = 1;
        if next_lower(len).is_some_and(|t| is_day_of_month(&t)) {
            len += 1;
        }
        if next_lower(len).is_some_and(|t| is_year(&t)) {
            len += 1;
        }
        return (Some("DATE"), len);
    }

    if is_day_of_month(&lower) && tokens.get(i + 1).is_some_and(is_month) {
        let mut len = 2;
        if next_lower(len).is_some_and(|t| is_year(&t)) {
            len += 1;
        }
        return (Some("DATE"), len);
    }

    if WEEKDAYS.contains(&lower.as_str()) || is_numeric_date(&lower) || is_year(&lower) {
        return (Some("DATE"), 1);
    }

    if let Some(number) = lower.strip_suffix('%')
        && is_number(number)
    {
        return (Some("PERCENT"), 1);
    }

    let mut chars = lower.chars();
    if let Some('$' | '€' | '£') = chars.next()
        && is_number(chars.as_str())
    {
        return (Some("MONEY"), 1);
    }

    if is_number(&lower) {
        return match next_lower(1).as_deref() {
            Some("percent") => (Some("PERCENT"), 2),
            Some(word) if MONEY_WORDS.contains(&word) => (Some("MONEY"), 2),
            _ => (Some("CARDINAL"), 1),
        };
    }

    if is_ordinal(&lower) {
        return (Some("ORDINAL"), 1);
    }

    capitalized_run(tokens, i)
}

fn next_is_meridiem(tokens: &[Token<'_>], i: usize) -> bool {
    tokens
        .get(i + 1)
        .is_some_and(|t| MERIDIEMS.contains(&t.lower().as_str()))
}

fn capitalized_run(tokens: &[Token<'_>], i: usize) -> (Option<&'static str>, usize) {
    let first = &tokens[i];
    if !is_capitalized(first.text) {
        return (None, 1);
    }

    if FUNCTION_WORDS.contains(&first.lower().as_str()) {
        return (None, 1);
    }

    let mut len = 1;
    while let Some(next) = tokens.get(i + len) {
        let continues = is_capitalized(next.text)
            && !next.sentence_start
            && !is_month(next)
            && !WEEKDAYS.contains(&next.lower().as_str())
            && !TIME_ZONES.contains(&next.lower().as_str())
            && !FUNCTION_WORDS.contains(&next.lower().as_str())
            && !tokens[i + len - 1].punctuated;
        if !continues {
            break;
        }
        len += 1;
    }

    // A lone capitalised word opening a sentence is usually just a sentence.
    let acronym = first.text.len() > 1 && first.text.chars().all(|c| c.is_ascii_uppercase());
    if len == 1 && first.sentence_start && !acronym {
        return (None, 1);
    }

    let is_org = tokens[i..i + len]
        .iter()
        .any(|t| ORG_SUFFIXES.contains(&t.lower().trim_end_matches('.')));

    (Some(if is_org { "ORG" } else { "MISC" }), len)
}
