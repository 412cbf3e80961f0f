use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// Attribute condition of a [`Selector`]: presence, or exact value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttrMatch {
    pub name: Cow<'static, str>,
    pub value: Option<Cow<'static, str>>,
}

/// A compound selector: optional tag name plus optional attribute condition.
///
/// This covers `main`, `[data-x="y"]` and `div[role="main"]`, which is all a
/// site adapter needs. Tag names compare ASCII-case-insensitively, attribute
/// values compare exactly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selector {
    tag: Option<Cow<'static, str>>,
    attr: Option<AttrMatch>,
}

impl Selector {
    pub const fn tag(name: &'static str) -> Self {
        Self {
            tag: Some(Cow::Borrowed(name)),
            attr: None,
        }
    }

    pub const fn attr_eq(name: &'static str, value: &'static str) -> Self {
        Self {
            tag: None,
            attr: Some(AttrMatch {
                name: Cow::Borrowed(name),
                value: Some(Cow::Borrowed(value)),
            }),
        }
    }

    pub const fn tag_attr_eq(tag: &'static str, name: &'static str, value: &'static str) -> Self {
        Self {
            tag: Some(Cow::Borrowed(tag)),
            attr: Some(AttrMatch {
                name: Cow::Borrowed(name),
                value: Some(Cow::Borrowed(value)),
            }),
        }
    }

    pub fn has_attr(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            tag: None,
            attr: Some(AttrMatch {
                name: name.into(),
                value: None,
            }),
        }
    }

    pub fn matches(&self, name: &str, attributes: &[(Arc<str>, Option<String>)]) -> bool {
        if let Some(tag) = &self.tag
            && !tag.eq_ignore_ascii_case(name)
        {
            return false;
        }
        let Some(attr) = &self.attr else {
            return true;
        };
        attributes.iter().any(|(k, v)| {
            k.eq_ignore_ascii_case(&attr.name)
                && match &attr.value {
                    None => true,
                    Some(expected) => v.as_deref() == Some(expected.as_ref()),
                }
        })
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(tag) = &self.tag {
            f.write_str(tag)?;
        }
        if let Some(attr) = &self.attr {
            match &attr.value {
                Some(value) => write!(f, "[{}=\"{}\"]", attr.name, value)?,
                None => write!(f, "[{}]", attr.name)?,
            }
        }
        Ok(())
    }
}
