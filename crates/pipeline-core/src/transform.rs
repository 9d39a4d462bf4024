use once_cell::sync::OnceCell;
use regex::Regex;

use crate::models::Article;

/// Call-to-action block appended to every draft.
pub const DEFAULT_FOOTER: &str = r#"

---

この記事の詳細版や最新の健康情報を配信しています。

<div style="text-align: center; margin: 20px 0;">
<img src="https://tanizawaseitai.com/wp-content/uploads/2024/11/qr-code.png" alt="たにざわ整体通信プレミアム QRコード" width="200" height="200" />
</div>

**無料メルマガ登録はこちら**
📧 https://tanizawaseitai.substack.com

整体院の19年の経験をもとにした健康情報をお届けします。
"#;

/// One way of cutting promotional text out of a post body.
///
/// `Section` and `Line` work on blocks: a block ends at a newline or at the
/// closing tag of a block element (`</p>`, `</h3>`, `</div>`, `<hr>`, ...),
/// so single-line scraped HTML is handled one paragraph at a time.
#[derive(Debug, Clone)]
pub enum RemovalRule {
    /// The block holding `marker` and the blocks after it, up to the next
    /// blank block, divider or heading, or to the end of the text.
    Section { marker: String },
    /// Every block containing `marker`.
    Line { marker: String },
    /// Every match of the expression.
    Pattern { regex: Regex },
}

impl RemovalRule {
    pub fn section(marker: impl Into<String>) -> Self {
        Self::Section {
            marker: marker.into(),
        }
    }

    pub fn line(marker: impl Into<String>) -> Self {
        Self::Line {
            marker: marker.into(),
        }
    }

    pub fn pattern(expr: &str) -> Result<Self, regex::Error> {
        Ok(Self::Pattern {
            regex: Regex::new(expr)?,
        })
    }

    pub fn apply(&self, text: &str) -> String {
        match self {
            Self::Section { marker } => remove_sections(text, marker),
            Self::Line { marker } if marker.is_empty() => text.to_string(),
            Self::Line { marker } => split_blocks(text)
                .into_iter()
                .filter(|block| !block.contains(marker.as_str()))
                .collect(),
            Self::Pattern { regex } => regex.replace_all(text, "").into_owned(),
        }
    }
}

fn split_blocks(text: &str) -> Vec<&str> {
    static RE_BLOCK_END: OnceCell<Regex> = OnceCell::new();
    let re = RE_BLOCK_END.get_or_init(|| {
        Regex::new(r"(?i)</(?:p|h[1-6]|div|li|ul|ol|blockquote|figure|section)\s*>|<hr[^>]*>|\n")
            .unwrap()
    });

    let mut blocks = Vec::new();
    let mut start = 0;
    for m in re.find_iter(text) {
        blocks.push(&text[start..m.end()]);
        start = m.end();
    }
    if start < text.len() {
        blocks.push(&text[start..]);
    }
    blocks
}

/// Blank blocks, dividers and headings close a promotional section.
fn ends_section(block: &str) -> bool {
    static RE_TAG: OnceCell<Regex> = OnceCell::new();
    static RE_HEADING: OnceCell<Regex> = OnceCell::new();
    let re_tag = RE_TAG.get_or_init(|| Regex::new(r"(?s)<[^>]*>").unwrap());
    let re_heading = RE_HEADING.get_or_init(|| Regex::new(r"(?i)^\s*<h[1-6][\s>]").unwrap());

    if re_heading.is_match(block) {
        return true;
    }
    let has_image = block.to_ascii_lowercase().contains("<img");
    let text = re_tag.replace_all(block, "").replace("&nbsp;", "");
    text.trim().is_empty() && !has_image
}

fn remove_sections(text: &str, marker: &str) -> String {
    if marker.is_empty() {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut skipping = false;

    for block in split_blocks(text) {
        if block.contains(marker) {
            skipping = true;
            continue;
        }
        if skipping {
            if !ends_section(block) {
                continue;
            }
            // keep the boundary so the surrounding paragraphs stay apart
            skipping = false;
        }
        out.push_str(block);
    }

    out
}

/// Body and title ready to be sent to the CMS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishableArticle {
    pub title: String,
    pub body: String,
    /// False when nothing of the source body survived stripping.
    pub has_content: bool,
}

#[derive(Debug, Clone)]
pub struct ContentTransformer {
    rules: Vec<RemovalRule>,
    footer: String,
}

impl ContentTransformer {
    pub fn new(rules: Vec<RemovalRule>, footer: impl Into<String>) -> Self {
        Self {
            rules,
            footer: footer.into(),
        }
    }

    pub fn default_rules() -> Vec<RemovalRule> {
        vec![
            RemovalRule::section("【アプリのご案内】"),
            RemovalRule::line("この投稿をシェア"),
            RemovalRule::line("購読はこちら"),
        ]
    }

    pub fn footer(&self) -> &str {
        &self.footer
    }

    pub fn strip_promotion(&self, html: &str) -> String {
        let stripped = self
            .rules
            .iter()
            .fold(html.to_string(), |text, rule| rule.apply(&text));
        stripped.trim().to_string()
    }

    pub fn apply_footer(&self, html: &str) -> String {
        let mut out = String::with_capacity(html.len() + self.footer.len());
        out.push_str(html);
        out.push_str(&self.footer);
        out
    }

    pub fn prepare_for_publish(&self, article: &Article) -> PublishableArticle {
        self.prepare(&article.title, &article.content)
    }

    /// Same as [`prepare_for_publish`](Self::prepare_for_publish) but with a
    /// title and body produced by the summarizer.
    pub fn prepare_summary(&self, title: &str, body: &str) -> PublishableArticle {
        self.prepare(title, body)
    }

    fn prepare(&self, title: &str, body: &str) -> PublishableArticle {
        let cleaned = self.strip_promotion(body);
        PublishableArticle {
            title: title.to_string(),
            has_content: !cleaned.is_empty(),
            body: self.apply_footer(&cleaned),
        }
    }
}

impl Default for ContentTransformer {
    fn default() -> Self {
        Self::new(Self::default_rules(), DEFAULT_FOOTER)
    }
}
