//! Sentence segmentation for sentence-level contradiction search.

const TERMINATORS: [char; 6] = ['.', '!', '?', '。', '！', '？'];

/// Splits `text` into trimmed, non-empty sentences in textual order.
///
/// A sentence ends at a line break, or at a terminator followed by
/// whitespace or the end of the text. A period closing a dotted abbreviation
/// (`p.m.`, `e.g.`) or a single-letter initial does not end a sentence.
/// CJK full-width terminators end a sentence even without trailing space.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        let end = idx + c.len_utf8();
        let boundary = match c {
            '\n' | '\r' => true,
            '。' | '！' | '？' => true,
            '.' => {
                followed_by_break(chars.peek().map(|&(_, next)| next))
                    && !is_abbreviation(&text[start..idx])
            }
            '!' | '?' => followed_by_break(chars.peek().map(|&(_, next)| next)),
            _ => false,
        };

        if boundary {
            // Keep runs like "?!" or "..." with the sentence they close.
            let mut end = end;
            while let Some(&(next_idx, next)) = chars.peek() {
                if !TERMINATORS.contains(&next) {
                    break;
                }
                end = next_idx + next.len_utf8();
                chars.next();
            }
            push_trimmed(&mut sentences, &text[start..end]);
            start = end;
        }
    }

    push_trimmed(&mut sentences, &text[start..]);
    sentences
}

fn followed_by_break(next: Option<char>) -> bool {
    next.is_none_or(|c| c.is_whitespace() || TERMINATORS.contains(&c) || c == '"' || c == ')')
}

/// True when the word before a period is `p.m`-style or a lone capital.
fn is_abbreviation(before_period: &str) -> bool {
    let word = before_period
        .rsplit(char::is_whitespace)
        .next()
        .unwrap_or_default();

    if word.contains('.') {
        return word.chars().all(|c| c == '.' || c.is_alphabetic());
    }

    let mut letters = word.chars();
    matches!((letters.next(), letters.next()), (Some(c), None) if c.is_uppercase())
}

fn push_trimmed<'a>(sentences: &mut Vec<&'a str>, candidate: &'a str) {
    let trimmed = candidate.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_on_terminators() {
        let text = "Assignments are due Friday. Late work loses 5% per day! Is attendance required?";

        assert_eq!(
            split_sentences(text),
            vec![
                "Assignments are due Friday.",
                "Late work loses 5% per day!",
                "Is attendance required?",
            ]
        );
    }

    #[test]
    fn test_split_on_line_breaks() {
        let text = "Syllabus\r\n\r\n- Midterm in week 7\n- Final in week 14\n";

        assert_eq!(
            split_sentences(text),
            vec!["Syllabus", "- Midterm in week 7", "- Final in week 14"]
        );
    }

    #[test]
    fn test_decimals_and_abbreviations_stay_whole() {
        let text = "The fee is $10.50 per day. Submit by 10 p.m. tonight. J. Smith grades it.";

        assert_eq!(
            split_sentences(text),
            vec![
                "The fee is $10.50 per day.",
                "Submit by 10 p.m. tonight.",
                "J. Smith grades it.",
            ]
        );
    }

    #[test]
    fn test_terminator_runs_close_one_sentence() {
        assert_eq!(
            split_sentences("Really?! Yes... Fine."),
            vec!["Really?!", "Yes...", "Fine."]
        );
    }

    #[test]
    fn test_full_width_terminators() {
        assert_eq!(
            split_sentences("授業は必須です。欠席は二回まで可能です。"),
            vec!["授業は必須です。", "欠席は二回まで可能です。"]
        );
    }

    #[test]
    fn test_blank_text_has_no_sentences() {
        assert!(split_sentences("").is_empty());
        assert!(split_sentences(" \n\t\r\n ").is_empty());
        assert_eq!(split_sentences("no terminator"), vec!["no terminator"]);
    }
}
