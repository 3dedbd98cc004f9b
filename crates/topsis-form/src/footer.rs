use chrono::{Datelike, Local};
use std::fmt::Write as _;

use crate::config::FooterConfig;

pub const FOOTER_TITLE: &str = "TOPSIS";

/// Static page footer; only the copyright year moves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Footer {
    pub attribution: String,
    pub year: i32,
}

impl Footer {
    pub fn new(config: &FooterConfig, year: i32) -> Self {
        Self {
            attribution: config.attribution.clone(),
            year,
        }
    }

    /// Footer stamped with the local clock's year at render time.
    pub fn current(config: &FooterConfig) -> Self {
        Self::new(config, Local::now().year())
    }

    pub fn copyright(&self) -> String {
        format!("© {} All rights reserved", self.year)
    }

    pub fn render_html(&self) -> String {
        let mut html = String::new();
        html.push_str("<footer class=\"footer mt-5\"><div class=\"container text-center\">");
        write!(
            html,
            "<p class=\"mb-1 footer-title\">{}</p><p class=\"mb-1 footer-subtitle\">{}</p><small class=\"footer-copy\">{}</small>",
            FOOTER_TITLE,
            escape_html(&self.attribution),
            escape_html(&self.copyright())
        )
        .expect("write footer");
        html.push_str("</div></footer>");
        html
    }

    pub fn render_text(&self) -> String {
        format!("{FOOTER_TITLE}\n{}\n{}", self.attribution, self.copyright())
    }
}

pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copyright_uses_given_year() {
        let footer = Footer::new(&FooterConfig::default(), 2026);
        assert_eq!(footer.copyright(), "© 2026 All rights reserved");
        assert!(footer.render_html().contains("© 2026 All rights reserved"));
        assert!(footer.render_text().starts_with("TOPSIS\n"));
    }

    #[test]
    fn current_footer_tracks_the_clock() {
        let footer = Footer::current(&FooterConfig::default());
        assert_eq!(footer.year, Local::now().year());
    }

    #[test]
    fn attribution_is_escaped() {
        let config = FooterConfig {
            attribution: "R&D <team>".to_string(),
        };
        let html = Footer::new(&config, 2025).render_html();
        assert!(html.contains("R&amp;D &lt;team&gt;"));
    }
}
