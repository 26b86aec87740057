//! Lexical extractors for chat message text.
//!
//! Three independent extractors pull emoticon tokens, @mentions, and
//! hyperlinks out of a raw message. Extraction never fails: text without
//! matches yields an empty iterator, and every extractor is a pure function
//! of its input.

use std::str::Chars;
use std::sync::LazyLock;

use regex::Regex;

/// Fixed emoticon grammar: open paren, 1-15 word characters, close paren.
static EMOTICON_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((\w{1,15})\)").expect("valid emoticon regex"));

/// An `@handle` counts as a mention only when the `@` sits on a boundary:
/// whitespace, a non-word character, or the start of a line. The boundary
/// rule is what keeps email local parts (`devtools@ourcorp.com`) from
/// matching; no separate email detection is needed.
static MENTION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)(?:^|[\s\W])@(\w+)").expect("valid mention regex"));

/// URL grammar by JOHN GRUBER, released as public domain via his blog at
/// http://daringfireball.net/2010/07/improved_regex_for_matching_urls.
///
/// Treated as a fixed grammar, not re-derived; the TLD token set is
/// reproduced verbatim. The one adaptation: the regex crate has no
/// look-around, so the `@`-adjacency guards on the naked-domain branch
/// (avoid matching the pieces of `foo@example.com`) are applied after
/// matching in [`hrefs`]. The branch carries a named group so the guard
/// only runs where the grammar called for it.
static HREF_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?xim)
\b
(                           # Capture 1: entire matched URL
  (?:
    https?:             # URL protocol and colon
    (?:
      /{1,3}                        # 1-3 slashes
      |                             #   or
      [a-z0-9%]                     # Single letter or digit or '%'
                                    # (Trying not to match e.g. "URI::Escape")
    )
    |                           #   or
                                # looks like domain name followed by a slash:
    [a-z0-9.\-]+[.]
    (?:com|net|org|edu|gov|mil|aero|asia|biz|cat|coop|info|int|jobs|mobi|
        museum|name|post|pro|tel|travel|xxx|ac|ad|ae|af|ag|ai|al|am|an|ao|aq
        |ar|as|at|au|aw|ax|az|ba|bb|bd|be|bf|bg|bh|bi|bj|bm|bn|bo|br|bs|bt|bv
        |bw|by|bz|ca|cc|cd|cf|cg|ch|ci|ck|cl|cm|cn|co|cr|cs|cu|cv|cx|cy|cz|dd
        |de|dj|dk|dm|do|dz|ec|ee|eg|eh|er|es|et|eu|fi|fj|fk|fm|fo|fr|ga|gb|gd
        |ge|gf|gg|gh|gi|gl|gm|gn|gp|gq|gr|gs|gt|gu|gw|gy|hk|hm|hn|hr|ht|hu|id
        |ie|il|im|in|io|iq|ir|is|it|je|jm|jo|jp|ke|kg|kh|ki|km|kn|kp|kr|kw|ky
        |kz|la|lb|lc|li|lk|lr|ls|lt|lu|lv|ly|ma|mc|md|me|mg|mh|mk|ml|mm|mn
        |mo|mp|mq|mr|ms|mt|mu|mv|mw|mx|my|mz|na|nc|ne|nf|ng|ni|nl|no|np|nr|nu
        |nz|om|pa|pe|pf|pg|ph|pk|pl|pm|pn|pr|ps|pt|pw|py|qa|re|ro|rs|ru|rw|sa
        |sb|sc|sd|se|sg|sh|si|sj| Ja|sk|sl|sm|sn|so|sr|ss|st|su|sv|sx|sy|sz|tc
        |td|tf|tg|th|tj|tk|tl|tm|tn|to|tp|tr|tt|tv|tw|tz|ua|ug|uk|us|uy|uz|va
        |vc|ve|vg|vi|vn|vu|wf|ws|ye|yt|yu|za|zm|zw)
    /
  )
  (?:                           # One or more:
    [^\s()<>{}\[\]]+                        # Run of non-space, non-()<>{}[]
    |                               #   or
    # balanced parens, one level deep: (...(...)...)
    \([^\s()]*?\([^\s()]+\)[^\s()]*?\)
    |
    \([^\s]+?\)                         # balanced parens, non-recursive: (...)
  )+
  (?:                           # End with:
     # balanced parens, one level deep: (...(...)...)
    \([^\s()]*?\([^\s()]+\)[^\s()]*?\)
    |
    \([^\s]+?\)                       # balanced parens, non-recursive: (...)
    |                                 #   or
    [^\s`!()\[\]{};:'".,<>?«»“”‘’]    # not a space or one of these punct chars
  )
  |                 # OR, the following to match naked domains:
  (?P<naked>        # @-adjacency guards applied post-match; see hrefs()
    [a-z0-9]+
    (?:[.\-][a-z0-9]+)*
    [.]
    (?:com|net|org|edu|gov|mil|aero|asia|biz|cat|coop|info|int|jobs|mobi|museum
        |name|post|pro|tel|travel|xxx|ac|ad|ae|af|ag|ai|al|am|an|ao|aq|ar|as|at
        |au|aw|ax|az|ba|bb|bd|be|bf|bg|bh|bi|bj|bm|bn|bo|br|bs|bt|bv|bw|by|bz
        |ca|cc|cd|cf|cg|ch|ci|ck|cl|cm|cn|co|cr|cs|cu|cv|cx|cy|cz|dd|de|dj|dk
        |dm|do|dz|ec|ee|eg|eh|er|es|et|eu|fi|fj|fk|fm|fo|fr|ga|gb|gd|ge|gf|gg
        |gh|gi|gl|gm|gn|gp|gq|gr|gs|gt|gu|gw|gy|hk|hm|hn|hr|ht|hu|id|ie|il|im
        |in|io|iq|ir|is|it|je|jm|jo|jp|ke|kg|kh|ki|km|kn|kp|kr|kw|ky|kz|la|lb
        |lc|li|lk|lr|ls|lt|lu|lv|ly|ma|mc|md|me|mg|mh|mk|ml|mm|mn|mo|mp|mq|mr
        |ms|mt|mu|mv|mw|mx|my|mz|na|nc|ne|nf|ng|ni|nl|no|np|nr|nu|nz|om|pa|pe
        |pf|pg|ph|pk|pl|pm|pn|pr|ps|pt|pw|py|qa|re|ro|rs|ru|rw|sa|sb|sc|sd|se
        |sg|sh|si|sj| Ja|sk|sl|sm|sn|so|sr|ss|st|su|sv|sx|sy|sz|tc|td|tf|tg|th
        |tj|tk|tl|tm|tn|to|tp|tr|tt|tv|tw|tz|ua|ug|uk|us|uy|uz|va|vc|ve|vg|vi
        |vn|vu|wf|ws|ye|yt|yu|za|zm|zw)
    \b
    /?
  )
)"#,
    )
    .expect("valid href regex")
});

/// Capability interface for message extractors, so the aggregator can swap
/// any stage for a stub or an alternate implementation. Plain closures
/// qualify through the blanket impl.
pub trait Extractor {
    fn extract(&self, text: &str) -> Vec<String>;
}

impl<F> Extractor for F
where
    F: Fn(&str) -> Vec<String>,
{
    fn extract(&self, text: &str) -> Vec<String> {
        self(text)
    }
}

/// Depth-tracking emoticon scan over a message body.
///
/// Reads a top-level parenthetical to its closing paren and discards the
/// capture if it contains nested parens, so `(emoti(con))` yields nothing
/// where the regex form would yield `con`. Unlike [`emoticons_regex`] the
/// scan enforces no length bound on the token.
pub fn emoticons(text: &str) -> Emoticons<'_> {
    Emoticons {
        chars: text.chars(),
        depth: 0,
        buf: String::new(),
    }
}

/// Lazy iterator behind [`emoticons`]. Finite and restartable per call.
#[derive(Debug, Clone)]
pub struct Emoticons<'a> {
    chars: Chars<'a>,
    depth: i32,
    buf: String,
}

impl Iterator for Emoticons<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        for letter in self.chars.by_ref() {
            if letter == '(' {
                self.depth += 1;
            }
            if letter == ')' {
                self.depth -= 1;
            }
            // Inside at least one open paren: accumulate, including the
            // opening paren itself but not the char that closes the run.
            if self.depth > 0 {
                self.buf.push(letter);
            }
            if self.depth < 1 && !self.buf.is_empty() {
                // Drop the recorded opening paren from the capture.
                let token: String = self.buf.drain(..).skip(1).collect();
                if token.is_empty() || token.contains(['(', ')']) {
                    continue;
                }
                return Some(token);
            }
        }
        // A run whose depth never returns to zero is silently dropped.
        None
    }
}

/// Regex-based emoticon extraction: open paren, 1-15 word characters,
/// close paren. Faster and bounded, but it cannot reject nested parens:
/// `(emoti(con))` yields `con` here. Kept as a deliberate fast path; the
/// divergence from [`emoticons`] is a tested contract.
pub fn emoticons_regex(text: &str) -> impl Iterator<Item = String> + '_ {
    EMOTICON_REGEX
        .captures_iter(text)
        .map(|caps| caps[1].to_string())
}

/// Extract `@mention` handles from a message body, in scan order,
/// duplicates retained.
pub fn mentions(text: &str) -> impl Iterator<Item = String> + '_ {
    MENTION_REGEX
        .captures_iter(text)
        .map(|caps| caps[1].to_string())
}

/// Extract hyperlinks (schemed URLs and naked domains) from a message
/// body, verbatim, in scan order.
pub fn hrefs(text: &str) -> impl Iterator<Item = String> + '_ {
    HREF_REGEX.captures_iter(text).filter_map(move |caps| {
        let m = caps.get(0)?;
        // Naked domains next to an @ are email fragments, not links.
        if caps.name("naked").is_some() && at_adjacent(text, m.start(), m.end()) {
            return None;
        }
        Some(m.as_str().to_string())
    })
}

fn at_adjacent(text: &str, start: usize, end: usize) -> bool {
    text[..start].ends_with('@') || text[end..].starts_with('@')
}
