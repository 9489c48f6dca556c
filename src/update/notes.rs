use anyhow::Result;
use colored::Colorize;
use regex::Regex;

/// Render release-note markdown for a terminal.
///
/// Covers what GitHub release bodies actually use: ATX headings, bullet
/// lists, `**bold**`, `` `code` `` and `[text](url)` links. Anything else
/// passes through unchanged.
pub fn render(markdown: &str) -> Result<String> {
    let bold = Regex::new(r"\*\*([^*]+)\*\*")?;
    let code = Regex::new(r"`([^`]+)`")?;
    let link = Regex::new(r"\[([^\]]+)\]\(([^)\s]+)\)")?;
    let bullet = Regex::new(r"^(\s*)[-*+]\s+(.*)$")?;

    let inline = |s: &str| -> String {
        let s = link.replace_all(s, |c: &regex::Captures| {
            format!("{} ({})", &c[1], c[2].underline())
        });
        let s = bold.replace_all(&s, |c: &regex::Captures| c[1].bold().to_string());
        code.replace_all(&s, |c: &regex::Captures| c[1].cyan().to_string())
            .into_owned()
    };

    let mut out = Vec::new();
    for line in markdown.lines() {
        let line = line.trim_end();
        let hashes = line.chars().take_while(|&c| c == '#').count();
        if (1..=6).contains(&hashes) && line[hashes..].starts_with(' ') {
            let text = inline(line[hashes..].trim());
            out.push(if hashes == 1 {
                text.bold().underline().to_string()
            } else {
                text.bold().to_string()
            });
        } else if let Some(c) = bullet.captures(line) {
            out.push(format!("{}  • {}", &c[1], inline(&c[2])));
        } else {
            out.push(inline(line));
        }
    }
    Ok(out.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(md: &str) -> String {
        colored::control::set_override(false);
        render(md).unwrap()
    }

    #[test]
    fn headings_and_bullets() {
        let got = plain("# Release\n\n## Changes\n- fixed **crash**\n  * nested `api`");
        assert_eq!(got, "Release\n\nChanges\n  • fixed crash\n    • nested api");
    }

    #[test]
    fn links_keep_url() {
        let got = plain("see [docs](https://example.com/docs)");
        assert_eq!(got, "see docs (https://example.com/docs)");
    }

    #[test]
    fn hash_without_space_is_text() {
        assert_eq!(plain("#hashtag"), "#hashtag");
    }

    #[test]
    fn empty_body_renders_empty() {
        assert_eq!(plain(""), "");
    }
}
