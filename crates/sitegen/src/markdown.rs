// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

//! Markdown rendering for `.md` pages.
//!
//! Markdown pages go through the template engine first, so `{{ page.date | date }}`
//! and friends are already expanded by the time pulldown-cmark sees the text.
//! Raw HTML passes through unchanged.

use pulldown_cmark::{CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd, html::push_html};
use std::collections::HashMap;

/// Render markdown to HTML with tables, strikethrough and task lists.
///
/// Headings get an `id` derived from their text; repeated ids gain a `-1`,
/// `-2`, ... suffix. Headings below h1 also end with a `#` self link.
#[must_use]
pub fn render_markdown(content: &str) -> String {
    let options =
        Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS | Options::ENABLE_TABLES;

    let mut ids = HeadingIds::default();
    let mut events = Vec::new();
    let mut heading: Option<Vec<Event<'_>>> = None;

    for event in Parser::new_ext(content, options) {
        if let Some(open) = heading.as_mut() {
            let closes = matches!(event, Event::End(TagEnd::Heading(_)));
            open.push(event);
            if closes {
                if let Some(done) = heading.take() {
                    events.extend(ids.label(done));
                }
            }
            continue;
        }
        match event {
            Event::Start(Tag::Heading { id: None, .. }) => heading = Some(vec![event]),
            other => events.push(other),
        }
    }

    let mut html = String::with_capacity(content.len() * 2);
    push_html(&mut html, events.into_iter());
    html
}

/// Lowercased alphanumeric words of `text` joined by single hyphens.
#[must_use]
pub fn slugify(text: &str) -> String {
    text.split(|ch: char| !ch.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

/// Heading ids handed out so far in one document.
#[derive(Default)]
struct HeadingIds {
    seen: HashMap<String, usize>,
}

impl HeadingIds {
    fn claim(&mut self, text: &str) -> Option<String> {
        let base = slugify(text);
        if base.is_empty() {
            return None;
        }
        let uses = self.seen.entry(base.clone()).or_insert(0);
        let id = match *uses {
            0 => base,
            n => format!("{base}-{n}"),
        };
        *uses += 1;
        Some(id)
    }

    /// Set the id on a buffered heading, from its `Start` through its `End`.
    fn label<'a>(&mut self, mut heading: Vec<Event<'a>>) -> Vec<Event<'a>> {
        let text: String = heading
            .iter()
            .filter_map(|event| match event {
                Event::Text(text) | Event::Code(text) => Some(text.as_ref()),
                _ => None,
            })
            .collect();
        let Some(id) = self.claim(&text) else {
            return heading;
        };

        let mut self_link = false;
        if let Some(Event::Start(Tag::Heading { level, id: slot, .. })) = heading.first_mut() {
            self_link = *level != HeadingLevel::H1;
            *slot = Some(CowStr::from(id.clone()));
        }
        if self_link {
            let end = heading.len() - 1;
            heading.insert(
                end,
                Event::InlineHtml(
                    format!(" <a class=\"anchor\" href=\"#{id}\" aria-hidden=\"true\">#</a>").into(),
                ),
            );
        }
        heading
    }
}
