//! Compound CSS selectors: `tag`, `#id`, `.class`, `[attr]`, `[attr="v"]`,
//! in any combination without whitespace. Combinators are not supported.

use std::fmt;
use std::str::FromStr;

use super::{DomError, Element};

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrMatch {
    name: String,
    value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selector {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrMatch>,
}

impl Selector {
    pub fn class(class: &str) -> Self {
        Self {
            classes: vec![class.to_string()],
            ..Default::default()
        }
    }

    pub fn id(id: &str) -> Self {
        Self {
            id: Some(id.to_string()),
            ..Default::default()
        }
    }

    pub fn tag(tag: &str) -> Self {
        Self {
            tag: Some(tag.to_ascii_lowercase()),
            ..Default::default()
        }
    }

    /// Adds an `[name="value"]` constraint.
    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.push(AttrMatch {
            name: name.to_string(),
            value: Some(value.to_string()),
        });
        self
    }

    /// Adds an `[name]` presence constraint.
    pub fn with_attr_present(mut self, name: &str) -> Self {
        self.attrs.push(AttrMatch {
            name: name.to_string(),
            value: None,
        });
        self
    }

    pub fn matches(&self, el: &Element) -> bool {
        if let Some(tag) = &self.tag
            && *tag != el.tag
        {
            return false;
        }
        if let Some(id) = &self.id
            && el.id() != Some(id.as_str())
        {
            return false;
        }
        if !self.classes.iter().all(|c| el.has_class(c)) {
            return false;
        }
        self.attrs.iter().all(|a| match (&a.value, el.attributes.get(&a.name)) {
            (_, None) => false,
            (None, Some(_)) => true,
            (Some(want), Some(have)) => want == have,
        })
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(tag) = &self.tag {
            write!(f, "{tag}")?;
        }
        if let Some(id) = &self.id {
            write!(f, "#{id}")?;
        }
        for class in &self.classes {
            write!(f, ".{class}")?;
        }
        for attr in &self.attrs {
            match &attr.value {
                Some(v) => write!(f, "[{}=\"{}\"]", attr.name, v)?,
                None => write!(f, "[{}]", attr.name)?,
            }
        }
        Ok(())
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

fn take_ident(chars: &[char], pos: &mut usize) -> String {
    let start = *pos;
    while *pos < chars.len() && is_ident_char(chars[*pos]) {
        *pos += 1;
    }
    chars[start..*pos].iter().collect()
}

impl FromStr for Selector {
    type Err = DomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let chars: Vec<char> = s.trim().chars().collect();
        if chars.is_empty() {
            return Err(DomError::Selector("empty selector".to_string()));
        }
        let mut sel = Selector::default();
        let mut pos = 0;

        if is_ident_char(chars[0]) {
            sel.tag = Some(take_ident(&chars, &mut pos).to_ascii_lowercase());
        }

        while pos < chars.len() {
            let marker = chars[pos];
            pos += 1;
            match marker {
                '#' | '.' => {
                    let ident = take_ident(&chars, &mut pos);
                    if ident.is_empty() {
                        return Err(DomError::Selector(format!("expected name after '{marker}' in {s}")));
                    }
                    if marker == '#' {
                        sel.id = Some(ident);
                    } else {
                        sel.classes.push(ident);
                    }
                }
                '[' => {
                    let name = take_ident(&chars, &mut pos);
                    if name.is_empty() {
                        return Err(DomError::Selector(format!("expected attribute name in {s}")));
                    }
                    let value = match chars.get(pos) {
                        Some(']') => None,
                        Some('=') => {
                            pos += 1;
                            Some(parse_attr_value(&chars, &mut pos, s)?)
                        }
                        _ => return Err(DomError::Selector(format!("malformed attribute in {s}"))),
                    };
                    if chars.get(pos) != Some(&']') {
                        return Err(DomError::Selector(format!("unterminated attribute in {s}")));
                    }
                    pos += 1;
                    sel.attrs.push(AttrMatch { name, value });
                }
                other => {
                    return Err(DomError::Selector(format!("unexpected '{other}' in {s}")));
                }
            }
        }
        Ok(sel)
    }
}

fn parse_attr_value(chars: &[char], pos: &mut usize, source: &str) -> Result<String, DomError> {
    match chars.get(*pos) {
        Some(q @ ('"' | '\'')) => {
            let quote = *q;
            *pos += 1;
            let start = *pos;
            while *pos < chars.len() && chars[*pos] != quote {
                *pos += 1;
            }
            if *pos >= chars.len() {
                return Err(DomError::Selector(format!("unterminated string in {source}")));
            }
            let value = chars[start..*pos].iter().collect();
            *pos += 1;
            Ok(value)
        }
        _ => Ok(take_ident(chars, pos)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn el(tag: &str, attrs: &[(&str, &str)]) -> Element {
        let mut el = Element::new(tag);
        for (k, v) in attrs {
            el.attributes.insert(k.to_string(), v.to_string());
        }
        el
    }

    #[test]
    fn test_parse_compound() {
        let sel: Selector = r#"button.like-btn[data-post-id="42"]"#.parse().unwrap();
        assert!(sel.matches(&el("button", &[("class", "like-btn liked"), ("data-post-id", "42")])));
        assert!(!sel.matches(&el("button", &[("class", "like-btn"), ("data-post-id", "7")])));
        assert!(!sel.matches(&el("a", &[("class", "like-btn"), ("data-post-id", "42")])));
    }

    #[test]
    fn test_parse_id_and_unquoted_attr() {
        let sel: Selector = "#comments-7".parse().unwrap();
        assert!(sel.matches(&el("div", &[("id", "comments-7")])));
        let sel: Selector = "input[name=text]".parse().unwrap();
        assert!(sel.matches(&el("input", &[("name", "text")])));
    }

    #[test]
    fn test_attr_presence() {
        let sel: Selector = ".post-menu[data-post-id]".parse().unwrap();
        assert!(sel.matches(&el("div", &[("class", "post-menu"), ("data-post-id", "1")])));
        assert!(!sel.matches(&el("div", &[("class", "post-menu")])));
    }

    #[test]
    fn test_rejects_combinators_and_garbage() {
        assert!(".a .b".parse::<Selector>().is_err());
        assert!("".parse::<Selector>().is_err());
        assert!("[name=\"x]".parse::<Selector>().is_err());
        assert!(".".parse::<Selector>().is_err());
    }

    #[test]
    fn test_display_round_trips_builder() {
        let sel = Selector::class("comment-toggle").with_attr("data-post-id", "7");
        assert_eq!(sel.to_string(), r#".comment-toggle[data-post-id="7"]"#);
    }
}
