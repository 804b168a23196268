use log::debug;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};

/// Elements whose text never reaches the output
const SKIPPED: &[&str] = &[
    "script", "style", "noscript", "template", "head", "svg", "iframe",
];

/// Elements that start a new line when they open and close
const BLOCKS: &[&str] = &[
    "p", "div", "section", "article", "header", "footer", "main", "aside", "nav", "ul", "ol",
    "table", "tr", "blockquote", "pre", "h1", "h2", "h3", "h4", "h5", "h6", "dl", "dt", "dd",
    "figure", "figcaption", "form",
];

/// Containers that usually wrap the recipe itself, most specific first
const RECIPE_REGIONS: &[&str] = &[
    "[itemtype*='Recipe']",
    "article[class*='recipe']",
    "section[class*='recipe']",
    "div[class*='recipe']",
];

/// Converts a fetched page into plain text for classification.
///
/// When the page has an obvious recipe container, only that container is
/// converted. Otherwise the whole document is.
pub fn page_to_text(html: &str) -> String {
    let document = Html::parse_document(html);

    for region in RECIPE_REGIONS {
        let Ok(selector) = Selector::parse(region) else {
            continue;
        };
        let largest = document
            .select(&selector)
            .max_by_key(|element| element.html().len());
        if let Some(element) = largest {
            debug!("Using recipe container '{}' for page text", region);
            return render(element);
        }
    }

    render(document.root_element())
}

/// Converts an HTML fragment or document to plain text
pub fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    render(document.root_element())
}

fn render(element: ElementRef) -> String {
    let mut raw = String::new();
    walk(element, &mut raw);
    tidy(&raw)
}

fn walk(element: ElementRef, out: &mut String) {
    let name = element.value().name();
    if SKIPPED.contains(&name) {
        return;
    }

    let block = BLOCKS.contains(&name);
    match name {
        "br" => out.push('\n'),
        "li" => out.push_str("\n• "),
        _ if block => out.push('\n'),
        _ => {}
    }

    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            walk(child_element, out);
        } else if let Node::Text(text) = child.value() {
            out.push_str(text);
        }
    }

    if block || name == "li" {
        out.push('\n');
    }
}

/// Collapses runs of spaces inside lines and runs of blank lines
fn tidy(raw: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut blank = false;

    for line in raw.lines() {
        let line = line
            .split(|c: char| c.is_whitespace())
            .filter(|word| !word.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        if line.is_empty() || line == "•" {
            blank = !lines.is_empty();
            continue;
        }
        if blank {
            lines.push(String::new());
            blank = false;
        }
        lines.push(line);
    }

    lines.join("\n")
}
