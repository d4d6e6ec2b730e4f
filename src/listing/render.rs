//! Notification body rendering
//!
//! Messages use Telegram's HTML parse mode, so only `<b>`, `<i>` and `<a>`
//! tags appear in the output.

use crate::listing::Listing;
use std::borrow::Cow;
use std::fmt;

/// Longest description, in characters, that is rendered untruncated
pub const MAX_DESCRIPTION_LENGTH: usize = 600;

const ELLIPSIS: &str = "...";

/// Width the title is centered in
const TITLE_WIDTH: usize = 45;

/// Shortens `text` to at most `max_length` characters
///
/// Text longer than `max_length` is cut after `max_length - 3` characters
/// and `...` is appended. Lengths are counted in characters, so multi-byte
/// text is never split inside a code point.
///
/// ```
/// use ad_watcher::listing::truncate_description;
///
/// assert_eq!(truncate_description("abcdef", 5), "ab...");
/// assert_eq!(truncate_description("abcde", 5), "abcde");
/// ```
pub fn truncate_description(text: &str, max_length: usize) -> Cow<'_, str> {
    if text.chars().count() <= max_length {
        return Cow::Borrowed(text);
    }

    let keep = max_length.saturating_sub(ELLIPSIS.len());
    let mut truncated: String = text.chars().take(keep).collect();
    truncated.push_str(ELLIPSIS);
    Cow::Owned(truncated)
}

/// Escapes text for Telegram's HTML parse mode
///
/// Only `&`, `<` and `>` need escaping there; quotes are escaped too so the
/// result is also safe inside an attribute value.
///
/// ```
/// use ad_watcher::listing::escape_html;
///
/// assert_eq!(escape_html("Rent < 500 & utilities"), "Rent &lt; 500 &amp; utilities");
/// assert_eq!(escape_html("plain"), "plain");
/// ```
pub fn escape_html(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"']) {
        return Cow::Borrowed(text);
    }

    let mut escaped = String::with_capacity(text.len() + 16);
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

fn or_dash(value: Option<&str>) -> Cow<'_, str> {
    escape_html(value.unwrap_or("-"))
}

impl Listing {
    /// Renders the notification body for this listing
    pub fn to_display_string(&self) -> String {
        let mut out = String::new();

        let title = format!("{:^width$}", self.title, width = TITLE_WIDTH);
        out.push_str(&format!("<b>{}</b>\n\n", escape_html(&title)));

        out.push_str(&format!(
            "Location: <i>{} - {}</i>",
            escape_html(&self.municipality),
            escape_html(&self.district)
        ));
        if !self.postal_code.is_empty() {
            out.push_str(&format!(" <b>{}</b>", escape_html(&self.postal_code)));
        }
        out.push('\n');

        if let Some(phone) = &self.phone {
            out.push_str(&format!("Phone: <b>{}</b>\n", escape_html(phone)));
        }

        if self.rooms.as_deref().is_some_and(|rooms| !rooms.is_empty()) {
            out.push_str(&self.property_block());
        }

        out.push_str(&self.price_line());

        // Line breaks arrive as literal <br> tags; the limit applies to the
        // raw text, before escaping.
        let description = self.description.replace("<br>", "");
        let description = truncate_description(&description, MAX_DESCRIPTION_LENGTH);
        out.push_str(&format!("Description:\n- {}\n\n", escape_html(&description)));

        out.push_str(&format!(
            r#"<a href="{}">Link</a>"#,
            escape_html(&self.detail_url)
        ));
        out
    }

    fn price_line(&self) -> String {
        let mut line = match (&self.full_price_label, &self.full_price_value) {
            (Some(label), Some(value)) => format!(
                "{}: <b>R$ {}</b>",
                escape_html(label),
                escape_html(value)
            ),
            _ => format!("Price: <b>R$ {}</b>", or_dash(self.price.as_deref())),
        };

        if let Some(old_price) = self.old_price.as_deref().filter(|p| !p.is_empty()) {
            line.push_str(&format!(" (was {})", escape_html(old_price)));
        }

        line.push('\n');
        line
    }

    fn property_block(&self) -> String {
        let mut block = String::from("<i>------- PROPERTY -------</i>\n");

        if self.condominium_fee.is_some() || self.property_tax.is_some() {
            block.push_str(&format!(
                "(Rent: <b>{}</b> Condominium: <b>{}</b> Property tax: <b>{}</b>)\n",
                or_dash(self.price.as_deref()),
                or_dash(self.condominium_fee.as_deref()),
                or_dash(self.property_tax.as_deref()),
            ));
        }

        block.push_str(&format!(
            "- Garage spaces: {}\n- Bathrooms: {}\n- Rooms: {}\n- Floor area: {}\n",
            or_dash(self.garage_spaces.as_deref()),
            or_dash(self.bathrooms.as_deref()),
            or_dash(self.rooms.as_deref()),
            or_dash(self.size.as_deref()),
        ));

        block.push_str("<i>--------------------------</i>\n");
        block
    }
}

impl fmt::Display for Listing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_display_string())
    }
}
